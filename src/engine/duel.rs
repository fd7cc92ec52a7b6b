//! Two-peer negotiation runner on a virtual clock.
//!
//! Both seats run a full [`PhaseController`]; confirmed decisions cross an
//! in-memory transport that can add latency jitter, duplicate messages and
//! loop a sender's own message back to it. A duel converges when both seats
//! signal both-ready with mirrored picks and identical ban sets.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::engine::bot_strategy::{AdversarialStrategy, BotStrategy};
use crate::engine::config::SelectionConfig;
use crate::engine::controller::PhaseController;
use crate::engine::models::*;
use crate::engine::session::MatchSetup;
use crate::roster::CharacterCatalog;

/// How a seat behaves during its decision windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatBehavior {
    /// Selects and confirms before the deadline.
    Active,
    /// Never acts; every decision comes from the deadline.
    Idle,
}

impl SeatBehavior {
    pub fn parse(s: &str) -> Option<SeatBehavior> {
        match s {
            "active" => Some(SeatBehavior::Active),
            "idle" => Some(SeatBehavior::Idle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DuelOptions {
    pub player1: SeatBehavior,
    pub player2: SeatBehavior,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    /// Probability that a message is delivered twice.
    pub duplicate_rate: f64,
    /// Probability that a message is also delivered back to its sender.
    pub echo_rate: f64,
    /// Give up after this much virtual time.
    pub max_virtual_ms: u64,
}

impl Default for DuelOptions {
    fn default() -> Self {
        Self {
            player1: SeatBehavior::Active,
            player2: SeatBehavior::Active,
            min_latency_ms: 20,
            max_latency_ms: 250,
            duplicate_rate: 0.0,
            echo_rate: 0.0,
            max_virtual_ms: 600_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DuelOutcome {
    pub seed: u64,
    pub converged: bool,
    /// `(local, remote)` as signalled by each seat's both-ready.
    pub both_ready: [Option<(CharacterId, CharacterId)>; 2],
    pub banned: [BTreeSet<CharacterId>; 2],
    /// Phase-changed events per seat, in order.
    pub phases: [Vec<SelectionPhase>; 2],
    pub auto_selections: usize,
    pub virtual_ms: u64,
}

enum DuelEvent {
    Cosmetic(CosmeticCue),
    Deadline(SelectionPhase, u64),
    Deliver(RemoteDecision),
    Act(SelectionPhase),
}

struct Seat {
    controller: PhaseController,
    behavior: SeatBehavior,
    deadline_generation: u64,
    both_ready: Option<(CharacterId, CharacterId)>,
    phases: Vec<SelectionPhase>,
    auto_selections: usize,
}

struct Duel<'a> {
    options: &'a DuelOptions,
    config: &'a SelectionConfig,
    seats: Vec<Seat>,
    queue: BinaryHeap<Reverse<(u64, usize)>>,
    pending: Vec<Option<(usize, DuelEvent)>>,
    rng: StdRng,
    now: u64,
    strategy: AdversarialStrategy,
}

impl<'a> Duel<'a> {
    fn push(&mut self, at: u64, seat: usize, event: DuelEvent) {
        let seq = self.pending.len();
        self.pending.push(Some((seat, event)));
        self.queue.push(Reverse((at, seq)));
    }

    fn pop(&mut self) -> Option<(u64, usize, DuelEvent)> {
        while let Some(Reverse((at, seq))) = self.queue.pop() {
            if let Some((seat, event)) = self.pending[seq].take() {
                return Some((at, seat, event));
            }
        }
        None
    }

    fn latency(&mut self) -> u64 {
        let (lo, hi) = (self.options.min_latency_ms, self.options.max_latency_ms.max(self.options.min_latency_ms));
        self.rng.gen_range(lo..=hi)
    }

    fn send(&mut self, from: usize, decision: RemoteDecision) {
        let to = 1 - from;
        let at = self.now + self.latency();
        self.push(at, to, DuelEvent::Deliver(decision.clone()));
        if self.rng.gen_bool(self.options.duplicate_rate.clamp(0.0, 1.0)) {
            let at = self.now + self.latency();
            self.push(at, to, DuelEvent::Deliver(decision.clone()));
        }
        if self.rng.gen_bool(self.options.echo_rate.clamp(0.0, 1.0)) {
            let at = self.now + self.latency();
            self.push(at, from, DuelEvent::Deliver(decision));
        }
    }

    fn apply(&mut self, seat: usize, t: Transition) {
        for schedule in t.schedules {
            match schedule {
                Schedule::Cosmetic { cue, after } => {
                    self.push(self.now + millis(after), seat, DuelEvent::Cosmetic(cue));
                }
                Schedule::Deadline { phase, after } => {
                    self.seats[seat].deadline_generation += 1;
                    let generation = self.seats[seat].deadline_generation;
                    self.push(self.now + millis(after), seat, DuelEvent::Deadline(phase, generation));
                }
                Schedule::CancelDeadline | Schedule::CancelAll => {
                    self.seats[seat].deadline_generation += 1;
                }
            }
        }

        let role = self.seats[seat].controller.session().local_role();
        for event in t.events {
            match event {
                Outbound::PhaseChanged { phase } => {
                    self.seats[seat].phases.push(phase);
                    if self.seats[seat].behavior == SeatBehavior::Active && phase.accepts_decisions() {
                        let window = match phase {
                            SelectionPhase::Banning => self.config.timing.ban_timeout_ms,
                            _ => self.config.timing.pick_timeout_ms,
                        };
                        let think = self.rng.gen_range(0..=window * 3 / 4);
                        self.push(self.now + think, seat, DuelEvent::Act(phase));
                    }
                }
                Outbound::BanConfirmed { character_id } => {
                    self.send(seat, RemoteDecision::ban(character_id, role));
                }
                Outbound::PickConfirmed { character_id } => {
                    self.send(seat, RemoteDecision::pick(character_id, Some(role)));
                }
                Outbound::BothReady {
                    local_pick_id,
                    remote_pick_id,
                } => {
                    self.seats[seat].both_ready = Some((local_pick_id, remote_pick_id));
                }
                Outbound::AutoSelected { .. } => {
                    self.seats[seat].auto_selections += 1;
                }
                _ => {}
            }
        }
    }

    fn act(&mut self, seat: usize, phase: SelectionPhase) {
        let controller = &self.seats[seat].controller;
        if controller.phase() != phase || controller.session().is_local_confirmed() {
            return;
        }
        let choice = match phase {
            SelectionPhase::Banning => {
                let banned = controller.session().banned_character_ids();
                let open: Vec<CharacterId> = controller
                    .all_ids()
                    .iter()
                    .filter(|id| !banned.contains(*id))
                    .cloned()
                    .collect();
                self.strategy.decide_ban(&BTreeSet::new(), &open, &mut self.rng)
            }
            _ => {
                let pool = controller.pickable_ids();
                self.strategy.decide_pick(&pool, &mut self.rng)
            }
        };
        let Some(id) = choice else {
            return;
        };
        let t = self.seats[seat].controller.select_local(&id);
        self.apply(seat, t);
        let t = self.seats[seat].controller.submit_local_decision(&id);
        self.apply(seat, t);
    }

    fn dispatch(&mut self, seat: usize, event: DuelEvent) {
        let t = match event {
            DuelEvent::Cosmetic(cue) => self.seats[seat].controller.on_cosmetic(cue),
            DuelEvent::Deadline(phase, generation) => {
                if generation != self.seats[seat].deadline_generation {
                    return;
                }
                self.seats[seat].controller.on_deadline(phase)
            }
            DuelEvent::Deliver(decision) => self.seats[seat].controller.on_remote_decision(&decision),
            DuelEvent::Act(phase) => {
                self.act(seat, phase);
                return;
            }
        };
        self.apply(seat, t);
    }

    fn finished(&self) -> bool {
        self.seats.iter().all(|s| s.both_ready.is_some())
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

fn random_owned(catalog: &CharacterCatalog, rng: &mut StdRng) -> BTreeSet<CharacterId> {
    let mut owned = catalog.starter_ids();
    let extra = rng.gen_range(0..=4);
    let bought = catalog
        .characters()
        .iter()
        .filter(|c| !owned.contains(&c.id))
        .map(|c| c.id.clone())
        .choose_multiple(rng, extra);
    owned.extend(bought);
    owned
}

/// Run one negotiation between two seats and report whether they converged.
pub fn run_duel(config: &SelectionConfig, seed: u64, options: &DuelOptions) -> Result<DuelOutcome, String> {
    let catalog = CharacterCatalog::builtin();
    let mut rng = StdRng::seed_from_u64(seed);
    let match_id = format!("duel-{}", seed);

    let mut seats = Vec::with_capacity(2);
    let mut initial = Vec::with_capacity(2);
    for (i, (role, behavior)) in [(Role::Player1, options.player1), (Role::Player2, options.player2)]
        .into_iter()
        .enumerate()
    {
        let setup = MatchSetup::new(match_id.clone(), role).with_owned(random_owned(catalog, &mut rng));
        let (controller, t) = PhaseController::start(
            setup,
            catalog,
            config.timing.clone(),
            Some(seed.wrapping_mul(2).wrapping_add(i as u64)),
        )?;
        seats.push(Seat {
            controller,
            behavior,
            deadline_generation: 0,
            both_ready: None,
            phases: Vec::new(),
            auto_selections: 0,
        });
        initial.push(t);
    }

    let mut duel = Duel {
        options,
        config,
        seats,
        queue: BinaryHeap::new(),
        pending: Vec::new(),
        rng,
        now: 0,
        strategy: AdversarialStrategy,
    };
    for (seat, t) in initial.into_iter().enumerate() {
        duel.apply(seat, t);
    }

    while !duel.finished() {
        let Some((at, seat, event)) = duel.pop() else {
            break;
        };
        if at > options.max_virtual_ms {
            break;
        }
        duel.now = at;
        duel.dispatch(seat, event);
    }
    for seat in 0..2 {
        let t = duel.seats[seat].controller.close();
        duel.apply(seat, t);
    }

    let both_ready = [duel.seats[0].both_ready.clone(), duel.seats[1].both_ready.clone()];
    let banned = [
        duel.seats[0].controller.session().banned_character_ids().clone(),
        duel.seats[1].controller.session().banned_character_ids().clone(),
    ];
    let converged = match (&both_ready[0], &both_ready[1]) {
        (Some((l0, r0)), Some((l1, r1))) => l0 == r1 && r0 == l1 && banned[0] == banned[1],
        _ => false,
    };
    let [s0, s1] = [&duel.seats[0], &duel.seats[1]];
    Ok(DuelOutcome {
        seed,
        converged,
        both_ready,
        banned,
        phases: [s0.phases.clone(), s1.phases.clone()],
        auto_selections: s0.auto_selections + s1.auto_selections,
        virtual_ms: duel.now,
    })
}

/// Aggregated results from many duels.
#[derive(Debug, Clone, Default)]
pub struct DuelStats {
    pub duels: usize,
    pub converged: usize,
    pub auto_selections: usize,
    pub durations_ms: Vec<u64>,
    pub failed_seeds: Vec<u64>,
}

impl DuelStats {
    pub fn convergence_rate(&self) -> f64 {
        self.converged as f64 / self.duels.max(1) as f64
    }

    pub fn avg_virtual_ms(&self) -> f64 {
        if self.durations_ms.is_empty() {
            return 0.0;
        }
        self.durations_ms.iter().sum::<u64>() as f64 / self.durations_ms.len() as f64
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Duel Results ({} negotiations)", self.duels)];
        lines.push("=".repeat(60));
        lines.push(format!(
            "  {:>16}: {} ({:.1}%)",
            "Converged",
            self.converged,
            self.convergence_rate() * 100.0
        ));
        lines.push(format!("  {:>16}: {}", "Auto-selections", self.auto_selections));
        lines.push(format!("  {:>16}: {:.0}ms", "Avg virtual time", self.avg_virtual_ms()));
        if !self.failed_seeds.is_empty() {
            lines.push(format!("  {:>16}: {:?}", "Failed seeds", self.failed_seeds));
        }
        lines.join("\n")
    }
}

/// Run `count` duels with consecutive seeds in parallel.
pub fn run_duels(config: &SelectionConfig, base_seed: u64, count: usize, options: &DuelOptions) -> DuelStats {
    let outcomes: Vec<Result<DuelOutcome, String>> = (0..count as u64)
        .into_par_iter()
        .map(|i| run_duel(config, base_seed + i, options))
        .collect();

    let mut stats = DuelStats {
        duels: count,
        ..DuelStats::default()
    };
    for (i, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(o) => {
                stats.auto_selections += o.auto_selections;
                stats.durations_ms.push(o.virtual_ms);
                if o.converged {
                    stats.converged += 1;
                } else {
                    stats.failed_seeds.push(o.seed);
                }
            }
            Err(e) => {
                tracing::warn!(seed = base_seed + i as u64, error = %e, "duel failed to start");
                stats.failed_seeds.push(base_seed + i as u64);
            }
        }
    }
    stats
}
