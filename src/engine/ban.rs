//! Ban coordinator: one ban per seat, public to both sides.

use std::collections::BTreeSet;

use crate::engine::models::{CharacterId, RecordOutcome, Role};

#[derive(Debug, Clone)]
pub struct BanLedger {
    local_role: Role,
    banned: BTreeSet<CharacterId>,
    local: Option<CharacterId>,
    remote: Option<CharacterId>,
    local_locked: bool,
    remote_locked: bool,
}

impl BanLedger {
    pub fn new(local_role: Role) -> Self {
        Self {
            local_role,
            banned: BTreeSet::new(),
            local: None,
            remote: None,
            local_locked: false,
            remote_locked: false,
        }
    }

    /// Lock the local ban. A second call never changes the first ban.
    pub fn record_local(&mut self, id: &str) -> RecordOutcome {
        if self.local_locked {
            return match self.local.as_deref() {
                Some(existing) if existing == id => RecordOutcome::Duplicate,
                _ => RecordOutcome::Conflict,
            };
        }
        self.local = Some(id.to_string());
        self.banned.insert(id.to_string());
        self.local_locked = true;
        RecordOutcome::Recorded
    }

    /// Lock the opponent's ban. Messages carrying the local role are loopback echoes.
    pub fn record_remote(&mut self, id: &str, role: Role) -> RecordOutcome {
        if role == self.local_role {
            return RecordOutcome::SelfEcho;
        }
        if self.remote_locked {
            return match self.remote.as_deref() {
                Some(existing) if existing == id => RecordOutcome::Duplicate,
                _ => RecordOutcome::Conflict,
            };
        }
        self.remote = Some(id.to_string());
        self.banned.insert(id.to_string());
        self.remote_locked = true;
        RecordOutcome::Recorded
    }

    /// Reconnection: the local seat already finished banning in an earlier connection.
    pub fn lock_local_implicitly(&mut self) {
        self.local_locked = true;
    }

    /// Reconnection: the opponent already holds a pick, so its ban phase is over.
    pub fn lock_remote_implicitly(&mut self) {
        self.remote_locked = true;
    }

    /// Ban phase is over once the local ban is locked and the opponent has either
    /// locked a ban or is already known to hold a pick.
    pub fn is_phase_complete(&self, remote_pick_known: bool) -> bool {
        self.local_locked && (self.remote_locked || remote_pick_known)
    }

    pub fn banned(&self) -> &BTreeSet<CharacterId> {
        &self.banned
    }

    pub fn is_banned(&self, id: &str) -> bool {
        self.banned.contains(id)
    }

    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    pub fn remote(&self) -> Option<&str> {
        self.remote.as_deref()
    }

    pub fn local_locked(&self) -> bool {
        self.local_locked
    }

    pub fn remote_locked(&self) -> bool {
        self.remote_locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ban_locks_once() {
        let mut bans = BanLedger::new(Role::Player1);
        assert_eq!(bans.record_local("cyber-ninja"), RecordOutcome::Recorded);
        assert_eq!(bans.record_local("dag-warrior"), RecordOutcome::Conflict);
        assert_eq!(bans.record_local("cyber-ninja"), RecordOutcome::Duplicate);
        assert_eq!(bans.local(), Some("cyber-ninja"));
        assert!(!bans.is_banned("dag-warrior"));
    }

    #[test]
    fn test_remote_echo_rejected() {
        let mut bans = BanLedger::new(Role::Player2);
        assert_eq!(bans.record_remote("cyber-ninja", Role::Player2), RecordOutcome::SelfEcho);
        assert!(bans.remote().is_none());
        assert!(bans.banned().is_empty());
        assert_eq!(bans.record_remote("cyber-ninja", Role::Player1), RecordOutcome::Recorded);
        assert_eq!(bans.record_remote("cyber-ninja", Role::Player1), RecordOutcome::Duplicate);
    }

    #[test]
    fn test_completion_requires_local_lock() {
        let mut bans = BanLedger::new(Role::Player1);
        bans.record_remote("dag-warrior", Role::Player2);
        assert!(!bans.is_phase_complete(true));
        bans.record_local("cyber-ninja");
        assert!(bans.is_phase_complete(false));
    }

    #[test]
    fn test_remote_pick_substitutes_for_remote_ban() {
        let mut bans = BanLedger::new(Role::Player1);
        bans.record_local("cyber-ninja");
        assert!(!bans.is_phase_complete(false));
        assert!(bans.is_phase_complete(true));
    }

    #[test]
    fn test_same_character_banned_by_both() {
        let mut bans = BanLedger::new(Role::Player1);
        bans.record_local("hash-hunter");
        bans.record_remote("hash-hunter", Role::Player2);
        assert_eq!(bans.banned().len(), 1);
        assert!(bans.is_phase_complete(false));
    }
}
