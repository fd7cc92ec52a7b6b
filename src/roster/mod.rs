//! Character catalog: read-only reference data for the selection screen.

mod characters;

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::engine::models::CharacterId;

static BUILTIN: Lazy<CharacterCatalog> =
    Lazy::new(|| CharacterCatalog::from_characters(characters::builtin_characters()));

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Legacy,
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub theme: String,
    pub tier: Tier,
}

/// Registry of selectable characters, kept in display order.
#[derive(Debug, Clone)]
pub struct CharacterCatalog {
    characters: Vec<Character>,
    index: HashMap<CharacterId, usize>,
}

impl CharacterCatalog {
    /// The shipped roster.
    pub fn builtin() -> &'static CharacterCatalog {
        &BUILTIN
    }

    /// Build a catalog from an ordered list. Later duplicates of an id are dropped.
    pub fn from_characters(characters: Vec<Character>) -> Self {
        let mut kept = Vec::with_capacity(characters.len());
        let mut index = HashMap::new();
        for c in characters {
            if index.contains_key(&c.id) {
                tracing::warn!(character_id = %c.id, "duplicate character id in catalog, skipping");
                continue;
            }
            index.insert(c.id.clone(), kept.len());
            kept.push(c);
        }
        Self {
            characters: kept,
            index,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Character> {
        self.index.get(id).map(|&i| &self.characters[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// All ids in display order.
    pub fn ids(&self) -> Vec<CharacterId> {
        self.characters.iter().map(|c| c.id.clone()).collect()
    }

    /// Free fighters every account owns.
    pub fn starter_ids(&self) -> BTreeSet<CharacterId> {
        self.characters
            .iter()
            .filter(|c| c.tier == Tier::Legacy)
            .map(|c| c.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_roster() {
        let catalog = CharacterCatalog::builtin();
        assert_eq!(catalog.len(), 20);
        assert!(catalog.contains("cyber-ninja"));
        assert_eq!(catalog.get("dag-warrior").map(|c| c.name.as_str()), Some("DAG Warrior"));
        assert!(!catalog.contains("missing-no"));
    }

    #[test]
    fn test_starter_ids_are_legacy_tier() {
        let starters = CharacterCatalog::builtin().starter_ids();
        let expected: BTreeSet<CharacterId> = ["block-bruiser", "cyber-ninja", "dag-warrior", "hash-hunter"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(starters, expected);
    }

    #[test]
    fn test_duplicate_ids_dropped() {
        let c = |id: &str| Character {
            id: id.into(),
            name: id.into(),
            theme: String::new(),
            tier: Tier::Common,
        };
        let catalog = CharacterCatalog::from_characters(vec![c("a"), c("b"), c("a")]);
        assert_eq!(catalog.ids(), vec!["a".to_string(), "b".to_string()]);
    }
}
