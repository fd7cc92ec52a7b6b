//! Selection timing and bot settings.
//! Loaded from TOML at runtime by the CLIs; every field has a default.

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SelectionConfig {
    /// Fixed seed for reproducible sessions. Random when absent.
    pub random_seed: Option<u64>,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub ban_timeout_ms: u64,
    pub pick_timeout_ms: u64,
    pub transition_delay_min_ms: u64,
    pub transition_delay_max_ms: u64,
    pub reveal_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ban_timeout_ms: 20_000,
            pick_timeout_ms: 30_000,
            transition_delay_min_ms: 2_000,
            transition_delay_max_ms: 4_000,
            reveal_delay_ms: 1_500,
        }
    }
}

impl TimingConfig {
    pub fn ban_timeout(&self) -> Duration {
        Duration::from_millis(self.ban_timeout_ms)
    }

    pub fn pick_timeout(&self) -> Duration {
        Duration::from_millis(self.pick_timeout_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn transition_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        random_delay(self.transition_delay_min_ms, self.transition_delay_max_ms, rng)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BotConfig {
    /// "adversarial" or "random".
    pub strategy: String,
    pub ban_delay_min_ms: u64,
    pub ban_delay_max_ms: u64,
    pub pick_delay_min_ms: u64,
    pub pick_delay_max_ms: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            strategy: "adversarial".into(),
            ban_delay_min_ms: 1_000,
            ban_delay_max_ms: 3_000,
            pick_delay_min_ms: 3_000,
            pick_delay_max_ms: 6_000,
        }
    }
}

impl BotConfig {
    pub fn ban_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        random_delay(self.ban_delay_min_ms, self.ban_delay_max_ms, rng)
    }

    pub fn pick_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        random_delay(self.pick_delay_min_ms, self.pick_delay_max_ms, rng)
    }
}

/// Uniform delay in `[min, max]` milliseconds. A reversed window is treated as `[max, min]`.
pub fn random_delay<R: Rng + ?Sized>(min_ms: u64, max_ms: u64, rng: &mut R) -> Duration {
    let (lo, hi) = if min_ms <= max_ms { (min_ms, max_ms) } else { (max_ms, min_ms) };
    Duration::from_millis(rng.gen_range(lo..=hi))
}

/// Load a config from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<SelectionConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Try to load the config from well-known paths, returning defaults if none is found.
pub fn load_default_config() -> SelectionConfig {
    let candidates = [
        "selection.toml",
        "../selection.toml",
        "/etc/kaspaclash/selection.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_config(p) {
                Ok(config) => {
                    tracing::info!(path = %p.display(), "loaded selection config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load selection config");
                }
            }
        }
    }
    tracing::info!("no selection.toml found, using built-in defaults");
    SelectionConfig::default()
}
