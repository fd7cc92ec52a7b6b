//! Bot strategy trait and implementations.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::engine::models::CharacterId;

/// Chooses the ban and the pick for a scripted opponent.
pub trait BotStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// `owned` is the human's owned set; `all` lists the candidates still open.
    fn decide_ban(
        &self,
        owned: &BTreeSet<CharacterId>,
        all: &[CharacterId],
        rng: &mut dyn RngCore,
    ) -> Option<CharacterId>;

    /// `available` lists characters not banned.
    fn decide_pick(&self, available: &[CharacterId], rng: &mut dyn RngCore) -> Option<CharacterId> {
        available.choose(rng).cloned()
    }
}

/// Bans outside the human's owned set whenever such a character exists.
pub struct AdversarialStrategy;

impl BotStrategy for AdversarialStrategy {
    fn name(&self) -> &str {
        "adversarial"
    }

    fn decide_ban(
        &self,
        owned: &BTreeSet<CharacterId>,
        all: &[CharacterId],
        rng: &mut dyn RngCore,
    ) -> Option<CharacterId> {
        let unowned: Vec<&CharacterId> = all.iter().filter(|id| !owned.contains(*id)).collect();
        match unowned.choose(rng) {
            Some(id) => Some((*id).clone()),
            None => all.choose(rng).cloned(),
        }
    }
}

/// Uniformly random ban and pick.
pub struct RandomStrategy;

impl BotStrategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn decide_ban(
        &self,
        _owned: &BTreeSet<CharacterId>,
        all: &[CharacterId],
        rng: &mut dyn RngCore,
    ) -> Option<CharacterId> {
        all.choose(rng).cloned()
    }
}

/// Resolve a strategy by its config name.
pub fn strategy_from_name(name: &str) -> Option<Box<dyn BotStrategy>> {
    match name {
        "adversarial" | "" => Some(Box::new(AdversarialStrategy)),
        "random" => Some(Box::new(RandomStrategy)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(v: &[&str]) -> Vec<CharacterId> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_adversarial_avoids_owned() {
        let all = ids(&["cyber-ninja", "dag-warrior", "void-reaper", "aeon-guard"]);
        let owned: BTreeSet<CharacterId> = ids(&["cyber-ninja", "dag-warrior"]).into_iter().collect();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let ban = AdversarialStrategy.decide_ban(&owned, &all, &mut rng).unwrap();
            assert!(!owned.contains(&ban), "banned owned character {}", ban);
        }
    }

    #[test]
    fn test_adversarial_falls_back_when_everything_owned() {
        let all = ids(&["cyber-ninja", "dag-warrior"]);
        let owned: BTreeSet<CharacterId> = all.iter().cloned().collect();
        let mut rng = StdRng::seed_from_u64(5);
        assert!(AdversarialStrategy.decide_ban(&owned, &all, &mut rng).is_some());
    }

    #[test]
    fn test_same_seed_same_decision() {
        let all = ids(&["a", "b", "c", "d", "e"]);
        let owned = BTreeSet::new();
        let first = AdversarialStrategy.decide_ban(&owned, &all, &mut StdRng::seed_from_u64(77));
        let second = AdversarialStrategy.decide_ban(&owned, &all, &mut StdRng::seed_from_u64(77));
        assert_eq!(first, second);
    }

    #[test]
    fn test_pick_from_available_only() {
        let available = ids(&["hash-hunter"]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(RandomStrategy.decide_pick(&available, &mut rng).as_deref(), Some("hash-hunter"));
        assert!(RandomStrategy.decide_pick(&[], &mut rng).is_none());
    }

    #[test]
    fn test_strategy_lookup() {
        assert_eq!(strategy_from_name("random").map(|s| s.name().to_string()), Some("random".into()));
        assert!(strategy_from_name("mcts").is_none());
    }
}
