//! Editor configuration
//!
//! Persisted as versioned JSON. Every field has a default, so a config file
//! only needs the values it overrides.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use log::warn;
use script_core::LayoutMetrics;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::container::DEFAULT_TITLE;

pub const DEFAULT_STORAGE_KEY: &str = "screenplayzaarc_current_script";

/// Config error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Version of the config format (for future migrations)
    pub version: u32,
    /// Page layout constants; must match the export renderer
    pub layout: LayoutMetrics,
    pub autosave_delay_ms: u64,
    /// Store key of the autosave entry
    pub storage_key: String,
    pub default_title: String,
}

impl EditorConfig {
    /// Current version of the config format
    pub const CURRENT_VERSION: u32 = 1;

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: EditorConfig = serde_json::from_str(json)?;

        // Check version compatibility
        if config.version != Self::CURRENT_VERSION {
            return Err(ConfigError::UnsupportedVersion(config.version));
        }

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a config, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|err| {
            warn!("using default config, could not load {}: {}", path.display(), err);
            Self::default()
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            layout: LayoutMetrics::default(),
            autosave_delay_ms: 2000,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}
