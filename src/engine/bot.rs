//! Bot adapter: a scripted opponent that plays its decisions back through the
//! same remote-decision path a network peer uses.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::engine::bot_strategy::{strategy_from_name, BotStrategy};
use crate::engine::config::BotConfig;
use crate::engine::controller::SessionView;
use crate::engine::models::*;

/// A remote decision to deliver after `after` has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    pub after: Duration,
    pub decision: RemoteDecision,
}

/// Where the opponent's decisions come from. The runtime calls this on session
/// start and on every phase change and delivers the returned playbacks.
pub trait DecisionSource: Send {
    fn on_session_start(&mut self, view: &SessionView<'_>) -> Vec<Playback>;

    fn on_phase_changed(&mut self, view: &SessionView<'_>) -> Vec<Playback>;
}

/// A live opponent. Its decisions arrive from the transport on their own.
pub struct RemotePeer;

impl DecisionSource for RemotePeer {
    fn on_session_start(&mut self, _view: &SessionView<'_>) -> Vec<Playback> {
        Vec::new()
    }

    fn on_phase_changed(&mut self, _view: &SessionView<'_>) -> Vec<Playback> {
        Vec::new()
    }
}

/// Decisions made eagerly at session start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotPlan {
    pub ban: CharacterId,
    pub pick: CharacterId,
    pub ban_delay: Duration,
    pub pick_delay: Duration,
}

pub struct BotOpponent {
    strategy: Box<dyn BotStrategy>,
    settings: BotConfig,
    rng: StdRng,
    plan: Option<BotPlan>,
    ban_sent: bool,
    pick_sent: bool,
}

impl BotOpponent {
    pub fn new(strategy: Box<dyn BotStrategy>, settings: BotConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            strategy,
            settings,
            rng,
            plan: None,
            ban_sent: false,
            pick_sent: false,
        }
    }

    pub fn from_config(settings: &BotConfig, seed: Option<u64>) -> Result<Self, String> {
        let strategy = strategy_from_name(&settings.strategy)
            .ok_or_else(|| format!("unknown bot strategy: {}", settings.strategy))?;
        Ok(Self::new(strategy, settings.clone(), seed))
    }

    pub fn plan(&self) -> Option<&BotPlan> {
        self.plan.as_ref()
    }

    fn make_plan(&mut self, view: &SessionView<'_>) -> Option<BotPlan> {
        let open: Vec<CharacterId> = view
            .all_ids
            .iter()
            .filter(|id| !view.banned.contains(*id))
            .cloned()
            .collect();
        let ban = self.strategy.decide_ban(view.owned, &open, &mut self.rng)?;
        let available: Vec<CharacterId> = open.into_iter().filter(|id| *id != ban).collect();
        let pick = self.strategy.decide_pick(&available, &mut self.rng)?;
        let ban_delay = self.settings.ban_delay(&mut self.rng);
        let pick_delay = self.settings.pick_delay(&mut self.rng);
        Some(BotPlan {
            ban,
            pick,
            ban_delay,
            pick_delay,
        })
    }

    fn pick_playback(&mut self, view: &SessionView<'_>) -> Option<Playback> {
        if self.pick_sent || view.opponent_locked {
            return None;
        }
        let plan = self.plan.clone()?;
        let pick = if view.banned.contains(&plan.pick) {
            // The human banned the planned pick; choose again from what is left.
            let available: Vec<CharacterId> = view
                .all_ids
                .iter()
                .filter(|id| !view.banned.contains(*id))
                .cloned()
                .collect();
            self.strategy.decide_pick(&available, &mut self.rng)?
        } else {
            plan.pick
        };
        self.pick_sent = true;
        Some(Playback {
            after: plan.pick_delay,
            decision: RemoteDecision::pick(pick, Some(view.local_role.opponent())),
        })
    }
}

impl DecisionSource for BotOpponent {
    fn on_session_start(&mut self, view: &SessionView<'_>) -> Vec<Playback> {
        if self.plan.is_none() {
            self.plan = self.make_plan(view);
        }
        let Some(plan) = self.plan.clone() else {
            warn!("bot could not plan a ban and pick");
            return Vec::new();
        };
        debug!(strategy = self.strategy.name(), ban = %plan.ban, "bot plan ready");

        let mut out = Vec::new();
        if !self.ban_sent && !view.remote_ban_locked {
            out.push(Playback {
                after: plan.ban_delay,
                decision: RemoteDecision::ban(plan.ban, view.local_role.opponent()),
            });
        }
        self.ban_sent = true;
        if view.phase == SelectionPhase::Picking {
            out.extend(self.pick_playback(view));
        }
        out
    }

    fn on_phase_changed(&mut self, view: &SessionView<'_>) -> Vec<Playback> {
        if view.phase != SelectionPhase::Picking {
            return Vec::new();
        }
        self.pick_playback(view).into_iter().collect()
    }
}
