use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    grade::FilmStock,
};

/// Main configuration for a Retrofilm run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Film stock to grade with
    pub stock: FilmStock,

    /// Timestamp text burned into the bottom-left corner
    pub timestamp_text: String,

    /// Caption text burned into the top-right corner (blank = no caption)
    pub message_text: String,

    /// Apply the chromatic aberration pass
    pub enable_aberration: bool,

    /// Apply the per-frame frame jitter pass
    pub enable_jitter: bool,

    /// Apply the light-leak pass
    pub enable_leaks: bool,

    /// Directory holding light leak images; ignored unless leaks are enabled
    pub leaks_dir: Option<PathBuf>,

    /// Seed for all randomized passes; omit for a fresh seed per run
    pub seed: Option<u64>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            stock: FilmStock::default(),
            timestamp_text: String::new(),
            message_text: String::new(),
            enable_aberration: true,
            enable_jitter: true,
            enable_leaks: true,
            leaks_dir: None,
            seed: None,
        }
    }
}

impl EffectConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: EffectConfig = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string(),
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.enable_leaks {
            if let Some(dir) = &self.leaks_dir {
                if !dir.is_dir() {
                    return Err(ConfigError::InvalidValue {
                        key: "leaks_dir".to_string(),
                        value: dir.display().to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// The seed to use for this run, drawing a fresh one when unset
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
