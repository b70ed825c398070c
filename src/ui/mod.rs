pub mod audio;
pub mod console;
pub mod notifications;
pub mod settings;

pub use audio::AlarmPlayer;
pub use console::{parse_line, CommandError, Console, ConsoleCommand};
pub use notifications::{NotificationManager, NotificationSink};
pub use settings::{SettingKey, Settings, Theme, UnknownSetting};
