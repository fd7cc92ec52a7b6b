//! Match setup and the per-negotiation session record.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::engine::ban::BanLedger;
use crate::engine::models::{CharacterId, Role, SelectionPhase};
use crate::engine::pick::PickLedger;

/// Match configuration handed over once by the hosting application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSetup {
    pub match_id: String,
    pub local_role: Role,
    #[serde(default)]
    pub owned_character_ids: BTreeSet<CharacterId>,
    #[serde(default)]
    pub is_bot: bool,
    /// Reconnection state from an earlier connection to the same match.
    #[serde(default)]
    pub existing_local_ban: Option<CharacterId>,
    #[serde(default)]
    pub existing_remote_ban: Option<CharacterId>,
    #[serde(default)]
    pub existing_player_character: Option<CharacterId>,
    #[serde(default)]
    pub existing_opponent_character: Option<CharacterId>,
}

impl MatchSetup {
    pub fn new(match_id: impl Into<String>, local_role: Role) -> Self {
        Self {
            match_id: match_id.into(),
            local_role,
            owned_character_ids: BTreeSet::new(),
            is_bot: false,
            existing_local_ban: None,
            existing_remote_ban: None,
            existing_player_character: None,
            existing_opponent_character: None,
        }
    }

    pub fn with_owned<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CharacterId>,
    {
        self.owned_character_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn against_bot(mut self) -> Self {
        self.is_bot = true;
        self
    }
}

/// State of one ban/pick negotiation. Mutated only by the phase controller.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    match_id: String,
    local_role: Role,
    pub(crate) phase: SelectionPhase,
    owned: BTreeSet<CharacterId>,
    pub(crate) bans: BanLedger,
    pub(crate) picks: PickLedger,
    pub(crate) local_confirmed: bool,
    pub(crate) local_selection: Option<CharacterId>,
}

impl SelectionSession {
    pub(crate) fn new(match_id: String, local_role: Role, owned: BTreeSet<CharacterId>) -> Self {
        Self {
            match_id,
            local_role,
            phase: SelectionPhase::Banning,
            owned,
            bans: BanLedger::new(local_role),
            picks: PickLedger::new(local_role),
            local_confirmed: false,
            local_selection: None,
        }
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn local_role(&self) -> Role {
        self.local_role
    }

    pub fn remote_role(&self) -> Role {
        self.local_role.opponent()
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn owned_character_ids(&self) -> &BTreeSet<CharacterId> {
        &self.owned
    }

    pub fn banned_character_ids(&self) -> &BTreeSet<CharacterId> {
        self.bans.banned()
    }

    pub fn local_ban(&self) -> Option<&str> {
        self.bans.local()
    }

    pub fn remote_ban(&self) -> Option<&str> {
        self.bans.remote()
    }

    pub fn local_ban_locked(&self) -> bool {
        self.bans.local_locked()
    }

    pub fn remote_ban_locked(&self) -> bool {
        self.bans.remote_locked()
    }

    /// The confirmed local character.
    pub fn local_pick(&self) -> Option<&str> {
        self.picks.local()
    }

    pub fn opponent_locked(&self) -> bool {
        self.picks.opponent_locked()
    }

    /// The opponent's character, available only once both picks are locked.
    pub fn revealed_opponent_pick(&self) -> Option<&str> {
        self.picks.revealed().map(|(_, remote)| remote)
    }

    pub fn is_local_confirmed(&self) -> bool {
        self.local_confirmed
    }

    pub fn local_selection(&self) -> Option<&str> {
        self.local_selection.as_deref()
    }
}
