use anyhow::{Context, Result};
use effects::EffectConfig;
use interaction::InteractionConfig;
use serde::{Deserialize, Serialize};
use skeleton::SkeletonConfig;
use std::path::Path;

/// Everything a session can be tuned with. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub skeleton: SkeletonConfig,
    pub interaction: InteractionConfig,
    pub effects: EffectConfig,
    /// Spawn fireballs when the triangle gesture is recognized.
    pub gesture_effects: bool,
    /// Seed for colors and trail jitter; the OS seeds the generator when unset.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            skeleton: SkeletonConfig::default(),
            interaction: InteractionConfig::default(),
            effects: EffectConfig::default(),
            gesture_effects: true,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
