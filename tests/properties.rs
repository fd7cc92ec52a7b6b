//! Invariants checked over seeded random input sequences.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use kaspaclash_select::engine::config::TimingConfig;
use kaspaclash_select::engine::controller::PhaseController;
use kaspaclash_select::engine::models::*;
use kaspaclash_select::engine::session::MatchSetup;
use kaspaclash_select::roster::CharacterCatalog;

const SEQUENCES: u64 = 300;
const STEPS: usize = 40;

#[derive(Debug, Clone)]
enum Input {
    Select(String),
    Submit(String),
    Remote(RemoteDecision),
    Cosmetic(CosmeticCue),
    Deadline(SelectionPhase),
    Timeout,
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    phase: SelectionPhase,
    banned: BTreeSet<CharacterId>,
    local_ban: Option<String>,
    remote_ban: Option<String>,
    local_ban_locked: bool,
    remote_ban_locked: bool,
    local_pick: Option<String>,
    opponent_locked: bool,
    confirmed: bool,
}

fn snapshot(ctl: &PhaseController) -> Snapshot {
    let s = ctl.session();
    Snapshot {
        phase: s.phase(),
        banned: s.banned_character_ids().clone(),
        local_ban: s.local_ban().map(str::to_string),
        remote_ban: s.remote_ban().map(str::to_string),
        local_ban_locked: s.local_ban_locked(),
        remote_ban_locked: s.remote_ban_locked(),
        local_pick: s.local_pick().map(str::to_string),
        opponent_locked: s.opponent_locked(),
        confirmed: s.is_local_confirmed(),
    }
}

fn random_id(ids: &[CharacterId], rng: &mut StdRng) -> String {
    // Occasionally something the catalog has never heard of.
    if rng.gen_bool(0.05) {
        return "ghost-fighter".to_string();
    }
    ids.choose(rng).cloned().unwrap_or_default()
}

fn random_role(rng: &mut StdRng) -> Role {
    if rng.gen_bool(0.5) {
        Role::Player1
    } else {
        Role::Player2
    }
}

fn random_input(ids: &[CharacterId], rng: &mut StdRng) -> Input {
    let phases = [
        SelectionPhase::Banning,
        SelectionPhase::Transition,
        SelectionPhase::Picking,
        SelectionPhase::Reveal,
    ];
    match rng.gen_range(0..10) {
        0 => Input::Select(random_id(ids, rng)),
        1 | 2 => Input::Submit(random_id(ids, rng)),
        3 | 4 => Input::Remote(RemoteDecision::ban(random_id(ids, rng), random_role(rng))),
        5 | 6 => {
            let role = if rng.gen_bool(0.2) { None } else { Some(random_role(rng)) };
            Input::Remote(RemoteDecision::pick(random_id(ids, rng), role))
        }
        7 => Input::Cosmetic(if rng.gen_bool(0.5) {
            CosmeticCue::OpenPicking
        } else {
            CosmeticCue::Reveal
        }),
        8 => {
            if rng.gen_bool(0.5) {
                Input::Timeout
            } else {
                Input::Deadline(*phases.choose(rng).unwrap_or(&SelectionPhase::Banning))
            }
        }
        _ => Input::Disconnect,
    }
}

fn apply(ctl: &mut PhaseController, input: &Input) -> Transition {
    match input {
        Input::Select(id) => ctl.select_local(id),
        Input::Submit(id) => ctl.submit_local_decision(id),
        Input::Remote(d) => ctl.on_remote_decision(d),
        Input::Cosmetic(cue) => ctl.on_cosmetic(*cue),
        Input::Deadline(phase) => ctl.on_deadline(*phase),
        Input::Timeout => ctl.on_timeout(),
        Input::Disconnect => ctl.on_remote_disconnected(),
    }
}

fn new_session(seed: u64, rng: &mut StdRng) -> PhaseController {
    let catalog = CharacterCatalog::builtin();
    let role = random_role(rng);
    let owned: Vec<CharacterId> = catalog
        .ids()
        .into_iter()
        .filter(|_| rng.gen_bool(0.3))
        .collect();
    let setup = MatchSetup::new(format!("prop-{}", seed), role).with_owned(owned);
    PhaseController::start(setup, catalog, TimingConfig::default(), Some(seed))
        .unwrap()
        .0
}

/// Run every sequence, calling `check` with the state before and after each step.
fn for_each_step<F>(mut check: F)
where
    F: FnMut(&mut PhaseController, &Input, &Snapshot, &Snapshot, &Transition),
{
    let ids = CharacterCatalog::builtin().ids();
    for seed in 0..SEQUENCES {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ctl = new_session(seed, &mut rng);
        for _ in 0..STEPS {
            let input = random_input(&ids, &mut rng);
            let before = snapshot(&ctl);
            let t = apply(&mut ctl, &input);
            let after = snapshot(&ctl);
            check(&mut ctl, &input, &before, &after, &t);
        }
    }
}

#[test]
fn test_phase_never_regresses() {
    for_each_step(|_, input, before, after, t| {
        assert!(after.phase >= before.phase, "{:?} moved {:?} -> {:?}", input, before.phase, after.phase);
        let changes: Vec<_> = t.phase_changes().collect();
        assert!(changes.windows(2).all(|w| w[0] < w[1]));
    });
}

#[test]
fn test_bans_only_grow() {
    for_each_step(|_, _, before, after, _| {
        assert!(before.banned.is_subset(&after.banned));
        assert!(after.banned.len() <= 2);
    });
}

#[test]
fn test_single_decision_per_side() {
    for_each_step(|_, input, before, after, _| {
        if before.local_ban_locked && before.local_ban.is_some() {
            assert_eq!(before.local_ban, after.local_ban, "{:?}", input);
        }
        if before.remote_ban.is_some() {
            assert_eq!(before.remote_ban, after.remote_ban, "{:?}", input);
        }
        if before.local_pick.is_some() {
            assert_eq!(before.local_pick, after.local_pick, "{:?}", input);
        }
    });
}

#[test]
fn test_self_echo_never_mutates_remote_state() {
    for_each_step(|ctl, input, before, after, _| {
        if let Input::Remote(d) = input {
            if d.role == Some(ctl.session().local_role()) {
                assert_eq!(before.remote_ban, after.remote_ban);
                assert_eq!(before.remote_ban_locked, after.remote_ban_locked);
                assert_eq!(before.opponent_locked, after.opponent_locked);
            }
        }
    });
}

#[test]
fn test_remote_pick_hidden_until_both_known() {
    for_each_step(|ctl, _, _, after, t| {
        let both_known = after.local_pick.is_some() && after.opponent_locked;
        if !both_known {
            assert_eq!(ctl.session().revealed_opponent_pick(), None);
            assert!(!t
                .events
                .iter()
                .any(|e| matches!(e, Outbound::PicksRevealed { .. } | Outbound::BothReady { .. })));
        }
    });
}

#[test]
fn test_timeout_always_resolves() {
    for_each_step(|ctl, _, _, after, _| {
        let phase = after.phase;
        if after.confirmed || !phase.accepts_decisions() {
            return;
        }
        let t = ctl.on_timeout();
        assert!(ctl.session().is_local_confirmed(), "timeout left {:?} unresolved", phase);
        assert!(t.events.iter().any(|e| matches!(e, Outbound::AutoSelected { .. })));
    });
}

#[test]
fn test_remote_ingestion_idempotent() {
    for_each_step(|ctl, input, _, after, _| {
        if let Input::Remote(d) = input {
            let again = ctl.on_remote_decision(d);
            assert!(again.is_empty(), "repeat of {:?} emitted {:?}", d, again.events);
            assert_eq!(&snapshot(ctl), after);
        }
    });
}
