use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::timers::RegistryPolicy;

/// Application configuration, read from TOML. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub settings_path: PathBuf,
    pub sound_dir: PathBuf,
    /// Audio player command line; the sound file path is appended
    pub player_command: Option<String>,
    pub desktop_notifications: bool,
    pub cancel_on_stop: bool,
    pub history_limit: usize,
    pub refresh_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from("settings.txt"),
            sound_dir: PathBuf::from("."),
            player_command: None,
            desktop_notifications: true,
            cancel_on_stop: false,
            history_limit: 64,
            refresh_interval_ms: 1000,
        }
    }
}

impl AppConfig {
    /// Load from an explicit path, or the per-user config file if present
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("multitimer").join("config.toml"))
    }

    pub fn registry_policy(&self) -> RegistryPolicy {
        RegistryPolicy {
            cancel_on_stop: self.cancel_on_stop,
            history_limit: self.history_limit,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }
}
