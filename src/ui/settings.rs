use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// User preferences persisted between sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    pub always_on_top: bool,
    pub dark_mode: bool,
}

/// A recognised settings key, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    AlwaysOnTop,
    DarkMode,
}

impl SettingKey {
    pub const ALL: [SettingKey; 2] = [SettingKey::AlwaysOnTop, SettingKey::DarkMode];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::AlwaysOnTop => "always_on_top",
            SettingKey::DarkMode => "dark_mode",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown setting '{0}', expected one of always_on_top, dark_mode")]
pub struct UnknownSetting(pub String);

impl FromStr for SettingKey {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownSetting(s.to_string()))
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::AlwaysOnTop => self.always_on_top,
            SettingKey::DarkMode => self.dark_mode,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: bool) {
        match key {
            SettingKey::AlwaysOnTop => self.always_on_top = value,
            SettingKey::DarkMode => self.dark_mode = value,
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::from_settings(self)
    }
}

/// Console palette, derived from the settings in one place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub heading: &'static str,
    pub info: &'static str,
    pub warning: &'static str,
    pub text: &'static str,
    pub topmost: bool,
}

const RESET: &str = "\x1b[0m";

impl Theme {
    pub const LIGHT: Theme = Theme {
        heading: "\x1b[1;34m",
        info: "\x1b[32m",
        warning: "\x1b[33m",
        text: "\x1b[39m",
        topmost: false,
    };

    pub const DARK: Theme = Theme {
        heading: "\x1b[1;97;40m",
        info: "\x1b[92;40m",
        warning: "\x1b[93;40m",
        text: "\x1b[97;40m",
        topmost: false,
    };

    /// No escape codes, for output that is not a terminal
    pub const PLAIN: Theme = Theme {
        heading: "",
        info: "",
        warning: "",
        text: "",
        topmost: false,
    };

    pub fn from_settings(settings: &Settings) -> Theme {
        let base = if settings.dark_mode { Theme::DARK } else { Theme::LIGHT };
        Theme {
            topmost: settings.always_on_top,
            ..base
        }
    }

    /// Same stacking preference, colours stripped
    pub fn plain(&self) -> Theme {
        Theme {
            topmost: self.topmost,
            ..Theme::PLAIN
        }
    }

    pub fn paint(&self, color: &str, text: &str) -> String {
        if color.is_empty() {
            return text.to_string();
        }
        format!("{}{}{}", color, text, RESET)
    }
}

/// Log how the settings change the presentation
pub fn log_applied(settings: &Settings) {
    info!(
        always_on_top = settings.always_on_top,
        dark_mode = settings.dark_mode,
        "Settings applied"
    );
}
