use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ui::settings::{SettingKey, Settings};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write settings file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings file {path} at line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

/// Loads and saves [`Settings`] as `key:value` lines
pub struct SettingsManager {
    path: PathBuf,
}

impl SettingsManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings from disk, returns defaults if the file does not exist
    pub async fn load_settings(&self) -> Result<Settings, SettingsError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings file at {}, using defaults", self.path.display());
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let settings = self.parse(&contents)?;
        debug!("Loaded settings from {}", self.path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub async fn load_or_default(&self) -> Settings {
        match self.load_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("{}; falling back to default settings", e);
                Settings::default()
            }
        }
    }

    /// Overwrite the settings file
    pub async fn save_settings(&self, settings: &Settings) -> Result<(), SettingsError> {
        let contents: String = SettingKey::ALL
            .iter()
            .map(|key| format!("{}:{}\n", key, u8::from(settings.get(*key))))
            .collect();

        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|source| SettingsError::Write {
                path: self.path.clone(),
                source,
            })?;

        info!("Settings saved to {}", self.path.display());
        Ok(())
    }

    fn parse(&self, contents: &str) -> Result<Settings, SettingsError> {
        let mut settings = Settings::default();

        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let parse_error = |reason: String| SettingsError::Parse {
                path: self.path.clone(),
                line: index + 1,
                reason,
            };

            let parts: Vec<&str> = line.split(':').collect();
            let [key, value] = parts.as_slice() else {
                return Err(parse_error(format!("expected key:value, found '{}'", line)));
            };

            // Unknown keys are skipped without looking at the value
            let Ok(key) = key.parse::<SettingKey>() else {
                debug!("Ignoring unknown setting '{}'", key);
                continue;
            };

            let number: i64 = value
                .trim()
                .parse()
                .map_err(|_| parse_error(format!("invalid value '{}' for {}", value, key)))?;
            settings.set(key, number != 0);
        }

        Ok(settings)
    }
}
