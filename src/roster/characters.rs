//! Built-in fighter roster.

use super::{Character, Tier};

/// (id, display name, theme, tier)
const ROSTER: &[(&str, &str, &str, Tier)] = &[
    // Legacy fighters are free for every account.
    ("cyber-ninja", "Cyber Ninja", "Fast hands and discounted specials", Tier::Legacy),
    ("dag-warrior", "DAG Warrior", "Even damage across every move", Tier::Legacy),
    ("block-bruiser", "Block Bruiser", "Heavy kicks behind a deep health pool", Tier::Legacy),
    ("hash-hunter", "Hash Hunter", "Tight guard and a punishing special", Tier::Legacy),
    ("neon-wraith", "Neon Wraith", "Glass frame fuelled by fast energy", Tier::Common),
    ("heavy-loader", "Heavy Loader", "Industrial tank with a slow battery", Tier::Common),
    ("cyber-paladin", "Cyber Paladin", "Sturdy all-rounder with a solid block", Tier::Common),
    ("razor-bot-7", "Razor Bot 7", "Special-first duelist", Tier::Common),
    ("kitsune-09", "Kitsune-09", "Agile trickster with quick recovery", Tier::Rare),
    ("gene-smasher", "Gene Smasher", "All offence, barely any guard", Tier::Rare),
    ("nano-brawler", "Nano Brawler", "Close-range punch specialist", Tier::Rare),
    ("sonic-striker", "Sonic Striker", "Relentless kick pressure", Tier::Rare),
    ("viperblade", "Viperblade", "Precision striker with a cheap finisher", Tier::Epic),
    ("bastion-hulk", "Bastion Hulk", "Near-impenetrable guard", Tier::Epic),
    ("technomancer", "Technomancer", "Energy caster with discounted specials", Tier::Epic),
    ("prism-duelist", "Prism Duelist", "Balanced fencer that rewards timing", Tier::Epic),
    ("chrono-drifter", "Chrono Drifter", "Bends tempo with rapid regeneration", Tier::Legendary),
    ("scrap-goliath", "Scrap Goliath", "Towering health and crushing blows", Tier::Legendary),
    ("aeon-guard", "Aeon Guard", "Timeless defender", Tier::Legendary),
    ("void-reaper", "Void Reaper", "High-risk special damage", Tier::Legendary),
];

pub(super) fn builtin_characters() -> Vec<Character> {
    ROSTER
        .iter()
        .map(|(id, name, theme, tier)| Character {
            id: (*id).to_string(),
            name: (*name).to_string(),
            theme: (*theme).to_string(),
            tier: *tier,
        })
        .collect()
}
