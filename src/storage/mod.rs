pub mod settings_manager;

pub use settings_manager::{SettingsError, SettingsManager};
