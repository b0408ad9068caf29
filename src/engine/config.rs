use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::constants::*;
use crate::corruption::CorruptionRng;

/// Environment variable that overrides the configured seed
pub const SEED_ENV: &str = "LIMINAL_SEED";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed seed; `None` draws one from entropy
    pub seed: Option<u64>,
    /// Hashed into a seed when no numeric seed is set
    pub seed_phrase: Option<String>,
    pub tick_rate: u32,
    pub splash_duration: f32,
    pub fade_duration: f32,
    pub narrative_interval: u32,
    pub debug_personalization_step: u32,
    /// Key script for headless runs
    pub script: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            seed_phrase: None,
            tick_rate: DEFAULT_TICK_RATE,
            splash_duration: SPLASH_DURATION,
            fade_duration: FADE_DURATION,
            narrative_interval: NARRATIVE_FLOOR_INTERVAL,
            debug_personalization_step: DEBUG_PERSONALIZATION_STEP,
            script: None,
        }
    }
}

impl EngineConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        info!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.apply_seed_override(std::env::var(SEED_ENV).ok().as_deref());
        self
    }

    /// Numeric override wins over both `seed` and `seed_phrase`
    pub fn apply_seed_override(&mut self, value: Option<&str>) {
        let Some(value) = value else {
            return;
        };
        match value.trim().parse::<u64>() {
            Ok(seed) => {
                self.seed = Some(seed);
                self.seed_phrase = None;
            }
            Err(_) => warn!("{} is not a u64: {:?}; ignored", SEED_ENV, value),
        }
    }

    pub fn corruption_rng(&self) -> CorruptionRng {
        match (self.seed, self.seed_phrase.as_deref()) {
            (Some(seed), _) => CorruptionRng::from_seed(seed),
            (None, Some(phrase)) => CorruptionRng::from_phrase(phrase),
            (None, None) => CorruptionRng::from_entropy(),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }
}
