//! Phase controller: gates local input, ingests remote decisions and owns the
//! forward-only BANNING -> TRANSITION -> PICKING -> REVEAL table.
//!
//! The controller never sleeps. Every entry point returns a [`Transition`]
//! listing outbound events and timer requests; the hosting runtime executes
//! the timers and feeds their expiry back through [`PhaseController::on_cosmetic`]
//! and [`PhaseController::on_deadline`].

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::engine::auto_resolve::{auto_ban, auto_pick, pickable_pool};
use crate::engine::config::TimingConfig;
use crate::engine::models::*;
use crate::engine::session::{MatchSetup, SelectionSession};
use crate::roster::CharacterCatalog;

/// Two bans and one pick must always fit.
pub const MIN_CATALOG_SIZE: usize = 3;

/// Read-only snapshot handed to decision sources.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub phase: SelectionPhase,
    pub local_role: Role,
    pub all_ids: &'a [CharacterId],
    pub owned: &'a BTreeSet<CharacterId>,
    pub banned: &'a BTreeSet<CharacterId>,
    pub remote_ban_locked: bool,
    pub opponent_locked: bool,
}

pub struct PhaseController {
    session: SelectionSession,
    all_ids: Vec<CharacterId>,
    timing: TimingConfig,
    rng: StdRng,
    both_ready_sent: bool,
    closed: bool,
}

impl PhaseController {
    /// Create the session, replay any reconnection state and arm the first deadline.
    pub fn start(
        setup: MatchSetup,
        catalog: &CharacterCatalog,
        timing: TimingConfig,
        seed: Option<u64>,
    ) -> Result<(Self, Transition), String> {
        if catalog.len() < MIN_CATALOG_SIZE {
            return Err(format!(
                "character catalog has {} characters, need at least {}",
                catalog.len(),
                MIN_CATALOG_SIZE
            ));
        }
        let owned: BTreeSet<CharacterId> = setup
            .owned_character_ids
            .iter()
            .filter(|id| {
                let known = catalog.contains(id);
                if !known {
                    warn!(character_id = %id, "owned character missing from catalog");
                }
                known
            })
            .cloned()
            .collect();
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        let mut controller = Self {
            session: SelectionSession::new(setup.match_id.clone(), setup.local_role, owned),
            all_ids: catalog.ids(),
            timing,
            rng,
            both_ready_sent: false,
            closed: false,
        };

        let mut t = Transition::new();
        t.emit(Outbound::PhaseChanged {
            phase: SelectionPhase::Banning,
        });
        controller.restore(&setup, &mut t);
        controller.advance(&mut t, false);
        if controller.session.phase == SelectionPhase::Banning && !controller.session.local_confirmed {
            controller.arm_deadline(&mut t);
        }

        info!(
            match_id = %setup.match_id,
            role = %setup.local_role,
            bot = setup.is_bot,
            phase = %controller.session.phase,
            "selection session started"
        );
        Ok((controller, t))
    }

    fn restore(&mut self, setup: &MatchSetup, t: &mut Transition) {
        let remote_role = self.session.remote_role();
        if let Some(id) = self.known(setup.existing_local_ban.as_deref()) {
            self.session.bans.record_local(id);
        }
        if let Some(id) = self.known(setup.existing_remote_ban.as_deref()) {
            if self.session.bans.record_remote(id, remote_role) == RecordOutcome::Recorded {
                t.emit(Outbound::OpponentBanned {
                    character_id: id.to_string(),
                });
            }
        }
        if let Some(id) = self.known(setup.existing_player_character.as_deref()) {
            self.session.bans.lock_local_implicitly();
            let s = &mut self.session;
            if s.picks.record_local(id, s.bans.banned()) != RecordOutcome::Recorded {
                warn!(character_id = %id, "existing local pick is banned, ignoring it");
            }
        }
        if let Some(id) = self.known(setup.existing_opponent_character.as_deref()) {
            self.session.bans.lock_remote_implicitly();
            self.session.picks.record_remote(id, None);
            t.emit(Outbound::OpponentLocked);
        }
        self.session.local_confirmed = self.session.bans.local_locked();
    }

    // -----------------------------------------------------------------------
    // Local input
    // -----------------------------------------------------------------------

    /// Highlight a card without committing to it.
    pub fn select_local(&mut self, character_id: &str) -> Transition {
        let mut t = Transition::new();
        if self.closed {
            return t;
        }
        if let Err(reason) = self.check_local(character_id) {
            self.reject(reason, character_id, &mut t);
            return t;
        }
        self.session.local_selection = Some(character_id.to_string());
        let character_id = character_id.to_string();
        t.emit(match self.session.phase {
            SelectionPhase::Banning => Outbound::BanSelected { character_id },
            _ => Outbound::PickSelected { character_id },
        });
        t
    }

    /// Confirm the local decision for the current phase.
    pub fn submit_local_decision(&mut self, character_id: &str) -> Transition {
        let mut t = Transition::new();
        if self.closed {
            return t;
        }
        if let Err(reason) = self.check_local(character_id) {
            self.reject(reason, character_id, &mut t);
            return t;
        }

        match self.session.phase {
            SelectionPhase::Banning => {
                if self.session.bans.record_local(character_id) != RecordOutcome::Recorded {
                    self.reject(Rejection::AlreadyConfirmed, character_id, &mut t);
                    return t;
                }
                info!(match_id = %self.session.match_id(), character_id, "local ban confirmed");
                t.emit(Outbound::BanConfirmed {
                    character_id: character_id.to_string(),
                });
            }
            SelectionPhase::Picking => {
                let s = &mut self.session;
                match s.picks.record_local(character_id, s.bans.banned()) {
                    RecordOutcome::Recorded => {}
                    RecordOutcome::Banned => {
                        self.reject(Rejection::CharacterBanned, character_id, &mut t);
                        return t;
                    }
                    _ => {
                        self.reject(Rejection::AlreadyConfirmed, character_id, &mut t);
                        return t;
                    }
                }
                info!(match_id = %self.session.match_id(), character_id, "local pick confirmed");
                t.emit(Outbound::PickConfirmed {
                    character_id: character_id.to_string(),
                });
            }
            _ => {
                self.reject(Rejection::WrongPhase, character_id, &mut t);
                return t;
            }
        }

        self.session.local_confirmed = true;
        self.session.local_selection = None;
        t.schedule(Schedule::CancelDeadline);
        self.advance(&mut t, false);
        t
    }

    fn check_local(&self, character_id: &str) -> Result<(), Rejection> {
        let phase = self.session.phase;
        if !phase.accepts_decisions() {
            return Err(Rejection::WrongPhase);
        }
        if self.session.local_confirmed {
            return Err(Rejection::AlreadyConfirmed);
        }
        if !self.is_known(character_id) {
            return Err(Rejection::UnknownCharacter);
        }
        if phase == SelectionPhase::Picking {
            if self.session.bans.is_banned(character_id) {
                return Err(Rejection::CharacterBanned);
            }
            if !self.pickable_ids().iter().any(|id| id == character_id) {
                return Err(Rejection::NotOwned);
            }
        }
        Ok(())
    }

    fn reject(&self, reason: Rejection, character_id: &str, t: &mut Transition) {
        debug!(
            match_id = %self.session.match_id(),
            phase = %self.session.phase,
            character_id,
            ?reason,
            "local action rejected"
        );
        t.emit(Outbound::Rejected {
            reason,
            character_id: Some(character_id.to_string()),
        });
    }

    // -----------------------------------------------------------------------
    // Remote input
    // -----------------------------------------------------------------------

    /// Single ingestion path for network peers and bots alike. Duplicates, late
    /// arrivals, echoes and unknown characters are logged and dropped.
    pub fn on_remote_decision(&mut self, decision: &RemoteDecision) -> Transition {
        let mut t = Transition::new();
        if self.closed {
            return t;
        }
        let id = decision.character_id.as_str();
        let phase = self.session.phase;
        if !self.is_known(id) {
            warn!(match_id = %self.session.match_id(), character_id = %id, "remote decision for unknown character ignored");
            return t;
        }

        match decision.kind {
            DecisionKind::Ban => {
                if phase > SelectionPhase::Banning {
                    debug!(match_id = %self.session.match_id(), %phase, "late remote ban ignored");
                    return t;
                }
                let role = decision.role.unwrap_or(self.session.remote_role());
                match self.session.bans.record_remote(id, role) {
                    RecordOutcome::Recorded => {
                        info!(match_id = %self.session.match_id(), character_id = %id, "remote ban recorded");
                        t.emit(Outbound::OpponentBanned {
                            character_id: id.to_string(),
                        });
                        self.advance(&mut t, false);
                    }
                    RecordOutcome::Conflict => {
                        warn!(
                            match_id = %self.session.match_id(),
                            character_id = %id,
                            existing = ?self.session.bans.remote(),
                            "conflicting remote ban ignored"
                        );
                    }
                    outcome => {
                        debug!(match_id = %self.session.match_id(), ?outcome, "remote ban ignored");
                    }
                }
            }
            DecisionKind::Pick => {
                if phase == SelectionPhase::Reveal {
                    debug!(match_id = %self.session.match_id(), "late remote pick ignored");
                    return t;
                }
                if self.session.bans.is_banned(id) {
                    warn!(match_id = %self.session.match_id(), character_id = %id, "remote pick targets a banned character, ignored");
                    return t;
                }
                match self.session.picks.record_remote(id, decision.role) {
                    RecordOutcome::Recorded => {
                        info!(match_id = %self.session.match_id(), %phase, "opponent locked a pick");
                        t.emit(Outbound::OpponentLocked);
                        self.advance(&mut t, false);
                    }
                    RecordOutcome::Conflict => {
                        warn!(match_id = %self.session.match_id(), "conflicting remote pick ignored");
                    }
                    outcome => {
                        debug!(match_id = %self.session.match_id(), ?outcome, "remote pick ignored");
                    }
                }
            }
        }
        t
    }

    pub fn on_remote_disconnected(&mut self) -> Transition {
        let mut t = Transition::new();
        if self.closed {
            return t;
        }
        info!(match_id = %self.session.match_id(), "opponent disconnected");
        t.emit(Outbound::OpponentDisconnected);
        t
    }

    /// Terminal signal from the match-start collaborator. Backfills picks the
    /// negotiation never saw and, when both are known, reveals immediately.
    pub fn on_match_starting(
        &mut self,
        countdown: u32,
        player1_character_id: Option<&str>,
        player2_character_id: Option<&str>,
    ) -> Transition {
        let mut t = Transition::new();
        if self.closed {
            return t;
        }
        let (local, remote) = match self.session.local_role() {
            Role::Player1 => (player1_character_id, player2_character_id),
            Role::Player2 => (player2_character_id, player1_character_id),
        };
        let local = self.known(local);
        let remote = self.known(remote);
        self.session.picks.backfill(local, remote);
        if self.session.picks.local().is_some() {
            self.session.bans.lock_local_implicitly();
            if !self.session.local_confirmed {
                self.session.local_confirmed = true;
                t.schedule(Schedule::CancelDeadline);
            }
        }
        if self.session.picks.opponent_locked() {
            self.session.bans.lock_remote_implicitly();
        }

        info!(match_id = %self.session.match_id(), countdown, "match starting");
        t.emit(Outbound::MatchStarting { countdown });

        let complete = self.session.picks.is_phase_complete();
        self.advance(&mut t, complete);
        if complete {
            self.emit_both_ready(&mut t);
        }
        t
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// A cosmetic pause finished. Stale cues are ignored.
    pub fn on_cosmetic(&mut self, cue: CosmeticCue) -> Transition {
        let mut t = Transition::new();
        if self.closed {
            return t;
        }
        match cue {
            CosmeticCue::OpenPicking if self.session.phase == SelectionPhase::Transition => {
                self.enter(SelectionPhase::Picking, &mut t);
                self.advance(&mut t, false);
            }
            CosmeticCue::Reveal if self.session.phase == SelectionPhase::Reveal => {
                self.emit_both_ready(&mut t);
            }
            _ => {
                debug!(match_id = %self.session.match_id(), ?cue, phase = %self.session.phase, "stale cosmetic cue");
            }
        }
        t
    }

    /// The decision deadline armed for `phase` expired.
    pub fn on_deadline(&mut self, phase: SelectionPhase) -> Transition {
        if self.closed || phase != self.session.phase {
            debug!(match_id = %self.session.match_id(), deadline = %phase, current = %self.session.phase, "stale deadline");
            return Transition::new();
        }
        self.on_timeout()
    }

    /// Force a decision for the current phase if the local player has not made one.
    pub fn on_timeout(&mut self) -> Transition {
        let mut t = Transition::new();
        if self.closed || self.session.local_confirmed {
            return t;
        }
        let phase = self.session.phase;
        let selection = self.session.local_selection.clone();
        let (kind, choice) = match phase {
            SelectionPhase::Banning => (
                DecisionKind::Ban,
                auto_ban(&self.all_ids, self.session.bans.banned(), selection.as_deref(), &mut self.rng),
            ),
            SelectionPhase::Picking => (
                DecisionKind::Pick,
                auto_pick(
                    &self.all_ids,
                    self.session.owned_character_ids(),
                    self.session.bans.banned(),
                    selection.as_deref(),
                    &mut self.rng,
                ),
            ),
            _ => return t,
        };
        let Some(character_id) = choice else {
            warn!(match_id = %self.session.match_id(), %phase, "no character available for auto-select");
            return t;
        };

        info!(match_id = %self.session.match_id(), %phase, character_id = %character_id, "decision deadline passed, auto-selecting");
        t.emit(Outbound::AutoSelected {
            kind,
            character_id: character_id.clone(),
        });
        t.merge(self.submit_local_decision(&character_id));
        t
    }

    /// Tear the session down. Everything after this is ignored.
    pub fn close(&mut self) -> Transition {
        let mut t = Transition::new();
        if self.closed {
            return t;
        }
        self.closed = true;
        info!(match_id = %self.session.match_id(), phase = %self.session.phase, "selection session closed");
        t.schedule(Schedule::CancelAll);
        t
    }

    // -----------------------------------------------------------------------
    // Phase table
    // -----------------------------------------------------------------------

    /// Step forward while the current phase is complete. With `fast_forward`
    /// the cosmetic TRANSITION pause is skipped.
    fn advance(&mut self, t: &mut Transition, fast_forward: bool) {
        loop {
            match self.session.phase {
                SelectionPhase::Banning => {
                    let remote_pick_known = self.session.picks.opponent_locked();
                    if !self.session.bans.is_phase_complete(remote_pick_known) {
                        return;
                    }
                    self.enter(SelectionPhase::Transition, t);
                    if !fast_forward && self.session.picks.local().is_none() {
                        let after = self.timing.transition_delay(&mut self.rng);
                        t.schedule(Schedule::Cosmetic {
                            cue: CosmeticCue::OpenPicking,
                            after,
                        });
                        return;
                    }
                }
                SelectionPhase::Transition => {
                    // Reconnected players that already picked skip the pause.
                    if !fast_forward && self.session.picks.local().is_none() {
                        return;
                    }
                    self.enter(SelectionPhase::Picking, t);
                }
                SelectionPhase::Picking => {
                    if !self.session.picks.is_phase_complete() {
                        return;
                    }
                    self.enter(SelectionPhase::Reveal, t);
                }
                SelectionPhase::Reveal => return,
            }
        }
    }

    fn enter(&mut self, next: SelectionPhase, t: &mut Transition) {
        let from = self.session.phase;
        debug_assert_eq!(from.next(), Some(next));
        self.session.phase = next;
        self.session.local_selection = None;
        info!(match_id = %self.session.match_id(), %from, to = %next, "phase advanced");
        t.emit(Outbound::PhaseChanged { phase: next });

        match next {
            SelectionPhase::Picking => {
                // A remote pick that arrived during BANNING may have been banned since.
                let s = &mut self.session;
                if s.picks.discard_remote_if_banned(s.bans.banned()) {
                    warn!(match_id = %s.match_id(), "opponent pick was banned after it locked, waiting for a new pick");
                }
                self.session.local_confirmed = self.session.picks.local().is_some();
                if !self.session.local_confirmed {
                    self.arm_deadline(t);
                }
            }
            SelectionPhase::Reveal => {
                t.schedule(Schedule::CancelDeadline);
                if let Some((local, remote)) = self.session.picks.revealed() {
                    t.emit(Outbound::PicksRevealed {
                        local_pick_id: local.to_string(),
                        remote_pick_id: remote.to_string(),
                    });
                }
                t.schedule(Schedule::Cosmetic {
                    cue: CosmeticCue::Reveal,
                    after: self.timing.reveal_delay(),
                });
            }
            SelectionPhase::Banning | SelectionPhase::Transition => {}
        }
    }

    fn arm_deadline(&self, t: &mut Transition) {
        let phase = self.session.phase;
        let after = match phase {
            SelectionPhase::Banning => self.timing.ban_timeout(),
            SelectionPhase::Picking => self.timing.pick_timeout(),
            _ => return,
        };
        t.schedule(Schedule::Deadline { phase, after });
        t.emit(Outbound::DeadlineArmed {
            phase,
            timeout_ms: after.as_millis() as u64,
        });
    }

    fn emit_both_ready(&mut self, t: &mut Transition) {
        if self.both_ready_sent {
            return;
        }
        if let Some((local, remote)) = self.session.picks.revealed() {
            info!(match_id = %self.session.match_id(), local_pick = %local, remote_pick = %remote, "both players ready");
            t.emit(Outbound::BothReady {
                local_pick_id: local.to_string(),
                remote_pick_id: remote.to_string(),
            });
            self.both_ready_sent = true;
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    fn is_known(&self, id: &str) -> bool {
        self.all_ids.iter().any(|c| c == id)
    }

    fn known<'a>(&self, id: Option<&'a str>) -> Option<&'a str> {
        match id {
            Some(id) if self.is_known(id) => Some(id),
            Some(id) => {
                warn!(character_id = %id, "unknown character id ignored");
                None
            }
            None => None,
        }
    }

    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    pub fn phase(&self) -> SelectionPhase {
        self.session.phase
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn both_ready_sent(&self) -> bool {
        self.both_ready_sent
    }

    pub fn all_ids(&self) -> &[CharacterId] {
        &self.all_ids
    }

    /// Characters a local pick may currently target.
    pub fn pickable_ids(&self) -> Vec<CharacterId> {
        pickable_pool(&self.all_ids, self.session.owned_character_ids(), self.session.bans.banned())
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            phase: self.session.phase,
            local_role: self.session.local_role(),
            all_ids: &self.all_ids,
            owned: self.session.owned_character_ids(),
            banned: self.session.bans.banned(),
            remote_ban_locked: self.session.bans.remote_locked(),
            opponent_locked: self.session.picks.opponent_locked(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Character, Tier};

    fn start(setup: MatchSetup) -> (PhaseController, Transition) {
        PhaseController::start(setup, CharacterCatalog::builtin(), TimingConfig::default(), Some(42)).unwrap()
    }

    fn guest() -> MatchSetup {
        MatchSetup::new("m-1", Role::Player2).with_owned(["cyber-ninja", "hash-hunter", "block-bruiser"])
    }

    #[test]
    fn test_start_arms_ban_deadline() {
        let (ctl, t) = start(guest());
        assert_eq!(ctl.phase(), SelectionPhase::Banning);
        assert!(t.schedules.contains(&Schedule::Deadline {
            phase: SelectionPhase::Banning,
            after: TimingConfig::default().ban_timeout(),
        }));
        assert_eq!(t.phase_changes().collect::<Vec<_>>(), vec![SelectionPhase::Banning]);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let empty = CharacterCatalog::from_characters(vec![]);
        let result = PhaseController::start(guest(), &empty, TimingConfig::default(), None);
        assert!(result.is_err());
    }

    fn tiny_catalog(ids: &[&str]) -> CharacterCatalog {
        CharacterCatalog::from_characters(
            ids.iter()
                .map(|id| Character {
                    id: id.to_string(),
                    name: id.to_uppercase(),
                    theme: String::new(),
                    tier: Tier::Legacy,
                })
                .collect(),
        )
    }

    #[test]
    fn test_catalog_too_small_for_two_bans_and_a_pick() {
        let two = tiny_catalog(&["a", "b"]);
        let err = PhaseController::start(guest(), &two, TimingConfig::default(), None).err().unwrap();
        assert!(err.contains("at least 3"), "{}", err);
    }

    #[test]
    fn test_smallest_catalog_timeout_resolves() {
        let three = tiny_catalog(&["a", "b", "c"]);
        let setup = MatchSetup::new("m-3", Role::Player1);
        let (mut ctl, _) = PhaseController::start(setup, &three, TimingConfig::default(), Some(1)).unwrap();
        ctl.submit_local_decision("a");
        ctl.on_remote_decision(&RemoteDecision::ban("b", Role::Player2));
        ctl.on_cosmetic(CosmeticCue::OpenPicking);
        assert_eq!(ctl.phase(), SelectionPhase::Picking);

        let t = ctl.on_timeout();
        assert_eq!(t.rejection(), None);
        assert!(ctl.session().is_local_confirmed());
        assert_eq!(ctl.session().local_pick(), Some("c"));
    }

    #[test]
    fn test_transition_waits_for_cosmetic_cue() {
        let (mut ctl, _) = start(guest());
        ctl.submit_local_decision("cyber-ninja");
        let t = ctl.on_remote_decision(&RemoteDecision::ban("dag-warrior", Role::Player1));
        assert_eq!(ctl.phase(), SelectionPhase::Transition);
        let delay = t
            .schedules
            .iter()
            .find_map(|s| match s {
                Schedule::Cosmetic { cue: CosmeticCue::OpenPicking, after } => Some(*after),
                _ => None,
            })
            .expect("open-picking cue scheduled");
        assert!(delay.as_millis() >= 2000 && delay.as_millis() <= 4000);

        // Local input is refused while the pause runs.
        let t = ctl.submit_local_decision("hash-hunter");
        assert_eq!(t.rejection(), Some(Rejection::WrongPhase));

        let t = ctl.on_cosmetic(CosmeticCue::OpenPicking);
        assert_eq!(ctl.phase(), SelectionPhase::Picking);
        assert!(!ctl.session().is_local_confirmed());
        assert!(t.events.iter().any(|e| matches!(e, Outbound::DeadlineArmed { phase: SelectionPhase::Picking, .. })));
    }

    #[test]
    fn test_stale_cues_ignored() {
        let (mut ctl, _) = start(guest());
        assert!(ctl.on_cosmetic(CosmeticCue::OpenPicking).is_empty());
        assert!(ctl.on_cosmetic(CosmeticCue::Reveal).is_empty());
        assert!(ctl.on_deadline(SelectionPhase::Picking).is_empty());
        assert_eq!(ctl.phase(), SelectionPhase::Banning);
    }

    #[test]
    fn test_pick_outside_owned_set_rejected() {
        let (mut ctl, _) = start(guest());
        ctl.submit_local_decision("dag-warrior");
        ctl.on_remote_decision(&RemoteDecision::ban("void-reaper", Role::Player1));
        ctl.on_cosmetic(CosmeticCue::OpenPicking);
        let t = ctl.submit_local_decision("aeon-guard");
        assert_eq!(t.rejection(), Some(Rejection::NotOwned));
        assert!(ctl.session().local_pick().is_none());
    }

    #[test]
    fn test_selection_then_confirm() {
        let (mut ctl, _) = start(guest());
        let t = ctl.select_local("razor-bot-7");
        assert_eq!(
            t.events,
            vec![Outbound::BanSelected {
                character_id: "razor-bot-7".into()
            }]
        );
        assert_eq!(ctl.session().local_selection(), Some("razor-bot-7"));
        let t = ctl.on_timeout();
        assert_eq!(ctl.session().local_ban(), Some("razor-bot-7"));
        assert!(t.events.contains(&Outbound::BanConfirmed {
            character_id: "razor-bot-7".into()
        }));
    }

    #[test]
    fn test_closed_controller_ignores_everything() {
        let (mut ctl, _) = start(guest());
        let t = ctl.close();
        assert_eq!(t.schedules, vec![Schedule::CancelAll]);
        assert!(ctl.submit_local_decision("cyber-ninja").is_empty());
        assert!(ctl.on_remote_decision(&RemoteDecision::ban("dag-warrior", Role::Player1)).is_empty());
        assert!(ctl.on_timeout().is_empty());
        assert!(ctl.close().is_empty());
        assert!(ctl.session().local_ban().is_none());
    }

    #[test]
    fn test_unknown_remote_character_ignored() {
        let (mut ctl, _) = start(guest());
        let t = ctl.on_remote_decision(&RemoteDecision::ban("not-a-fighter", Role::Player1));
        assert!(t.is_empty());
        assert!(!ctl.session().remote_ban_locked());
    }

    #[test]
    fn test_late_remote_ban_ignored() {
        let (mut ctl, _) = start(guest());
        ctl.submit_local_decision("dag-warrior");
        ctl.on_remote_decision(&RemoteDecision::pick("void-reaper", None));
        assert_eq!(ctl.phase(), SelectionPhase::Transition);
        let t = ctl.on_remote_decision(&RemoteDecision::ban("aeon-guard", Role::Player1));
        assert!(t.is_empty());
        assert!(!ctl.session().banned_character_ids().contains("aeon-guard"));
    }
}
