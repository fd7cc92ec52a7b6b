//! Pick coordinator: blind picks, revealed only once both seats are locked.

use std::collections::BTreeSet;
use std::fmt;

use crate::engine::models::{CharacterId, RecordOutcome, Role};

#[derive(Clone)]
pub struct PickLedger {
    local_role: Role,
    local: Option<CharacterId>,
    // Never handed out before both picks are known.
    remote: Option<CharacterId>,
}

impl PickLedger {
    pub fn new(local_role: Role) -> Self {
        Self {
            local_role,
            local: None,
            remote: None,
        }
    }

    pub fn record_local(&mut self, id: &str, banned: &BTreeSet<CharacterId>) -> RecordOutcome {
        if banned.contains(id) {
            return RecordOutcome::Banned;
        }
        match self.local.as_deref() {
            Some(existing) if existing == id => RecordOutcome::Duplicate,
            Some(_) => RecordOutcome::Conflict,
            None => {
                self.local = Some(id.to_string());
                RecordOutcome::Recorded
            }
        }
    }

    pub fn record_remote(&mut self, id: &str, role: Option<Role>) -> RecordOutcome {
        if role == Some(self.local_role) {
            return RecordOutcome::SelfEcho;
        }
        match self.remote.as_deref() {
            Some(existing) if existing == id => RecordOutcome::Duplicate,
            Some(_) => RecordOutcome::Conflict,
            None => {
                self.remote = Some(id.to_string());
                RecordOutcome::Recorded
            }
        }
    }

    /// Fill in picks announced by the match-start collaborator. Known picks are kept.
    pub fn backfill(&mut self, local: Option<&str>, remote: Option<&str>) {
        if self.local.is_none() {
            self.local = local.map(str::to_string);
        }
        if self.remote.is_none() {
            self.remote = remote.map(str::to_string);
        }
    }

    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    /// Whether the opponent has locked in. This is all that is visible before reveal.
    pub fn opponent_locked(&self) -> bool {
        self.remote.is_some()
    }

    pub fn is_phase_complete(&self) -> bool {
        self.local.is_some() && self.remote.is_some()
    }

    /// Drop the remote pick if it targets a banned character. Returns true when dropped.
    pub fn discard_remote_if_banned(&mut self, banned: &BTreeSet<CharacterId>) -> bool {
        match self.remote.as_deref() {
            Some(id) if banned.contains(id) => {
                self.remote = None;
                true
            }
            _ => false,
        }
    }

    /// `(local, remote)` once both picks are known.
    pub fn revealed(&self) -> Option<(&str, &str)> {
        match (self.local.as_deref(), self.remote.as_deref()) {
            (Some(l), Some(r)) => Some((l, r)),
            _ => None,
        }
    }
}

impl fmt::Debug for PickLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickLedger")
            .field("local_role", &self.local_role)
            .field("local", &self.local)
            .field("opponent_locked", &self.opponent_locked())
            .finish()
    }
}
