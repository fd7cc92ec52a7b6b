//! Deadline policy: force a legal decision for a player who did not act in time.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::models::CharacterId;

/// Characters the local player may pick: owned and unbanned, or every unbanned
/// character once the owned set is empty or banned out.
pub fn pickable_pool(
    all: &[CharacterId],
    owned: &BTreeSet<CharacterId>,
    banned: &BTreeSet<CharacterId>,
) -> Vec<CharacterId> {
    let owned_open: Vec<CharacterId> = all
        .iter()
        .filter(|id| owned.contains(*id) && !banned.contains(*id))
        .cloned()
        .collect();
    if !owned_open.is_empty() {
        return owned_open;
    }
    all.iter().filter(|id| !banned.contains(*id)).cloned().collect()
}

/// Ban to apply on timeout: the highlighted card if it is still unbanned,
/// otherwise a random unbanned character.
pub fn auto_ban<R: Rng + ?Sized>(
    all: &[CharacterId],
    banned: &BTreeSet<CharacterId>,
    selection: Option<&str>,
    rng: &mut R,
) -> Option<CharacterId> {
    let open: Vec<&CharacterId> = all.iter().filter(|id| !banned.contains(*id)).collect();
    if let Some(sel) = selection {
        if open.iter().any(|id| id.as_str() == sel) {
            return Some(sel.to_string());
        }
    }
    open.choose(rng).map(|id| (*id).clone())
}

/// Pick to apply on timeout, drawn from [`pickable_pool`].
pub fn auto_pick<R: Rng + ?Sized>(
    all: &[CharacterId],
    owned: &BTreeSet<CharacterId>,
    banned: &BTreeSet<CharacterId>,
    selection: Option<&str>,
    rng: &mut R,
) -> Option<CharacterId> {
    let pool = pickable_pool(all, owned, banned);
    if let Some(sel) = selection {
        if pool.iter().any(|id| id == sel) {
            return Some(sel.to_string());
        }
    }
    pool.choose(rng).cloned()
}
