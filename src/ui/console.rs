use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::io::{IsTerminal, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::warn;

use super::settings::{SettingKey, Theme, UnknownSetting};
use crate::timers::{AlarmSound, TimerStatus};

#[derive(Parser, Debug)]
#[command(name = "multitimer", disable_version_flag = true)]
struct ConsoleLine {
    #[command(subcommand)]
    command: ConsoleCommand,
}

/// Commands accepted on the console
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Start a named countdown
    Start {
        name: String,
        hours: u64,
        minutes: u64,
        seconds: u64,
        /// None, beep.wav or bell.wav
        #[arg(default_value = "None")]
        alarm: AlarmSound,
    },
    /// Stop the running timer with this name
    Stop { name: String },
    /// Keep the running timers panel on screen, refreshed every tick
    Show,
    /// Stop refreshing the running timers panel
    Hide,
    /// Print the running timers once
    List,
    /// Print the settings, or set one with `options <key> <on|off>`
    Options {
        #[arg(value_parser = parse_setting_key, requires = "value")]
        key: Option<SettingKey>,
        #[arg(value_parser = parse_toggle)]
        value: Option<bool>,
    },
    /// List the alarm sounds
    Alarms,
    /// Leave the program
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid quoting")]
    InvalidQuoting,

    /// Help text was requested rather than a command
    #[error("{0}")]
    Help(String),

    #[error("{0}")]
    Usage(String),
}

fn parse_setting_key(s: &str) -> Result<SettingKey, String> {
    s.parse().map_err(|e: UnknownSetting| e.to_string())
}

fn parse_toggle(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(format!("expected on or off, found '{}'", s)),
    }
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, CommandError> {
    let mut args = shlex::split(line).ok_or(CommandError::InvalidQuoting)?;
    if args.is_empty() {
        return Ok(None);
    }
    args.insert(0, "multitimer".to_string());

    match ConsoleLine::try_parse_from(args) {
        Ok(parsed) => Ok(Some(parsed.command)),
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            Err(CommandError::Help(e.render().to_string()))
        }
        Err(e) => Err(CommandError::Usage(e.render().to_string())),
    }
}

struct ConsoleInner {
    out: Box<dyn Write + Send>,
    theme: Theme,
    colored: bool,
}

/// Themed text output shared by the controller and the notifier
#[derive(Clone)]
pub struct Console {
    inner: Arc<Mutex<ConsoleInner>>,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>, theme: Theme) -> Self {
        Self::with_color(out, theme, true)
    }

    /// With `colored` off every theme renders without escape codes
    pub fn with_color(out: Box<dyn Write + Send>, theme: Theme, colored: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ConsoleInner { out, theme, colored })),
        }
    }

    /// Standard output, coloured only when it is a terminal
    pub fn stdout(theme: Theme) -> Self {
        let stdout = std::io::stdout();
        let colored = stdout.is_terminal();
        Self::with_color(Box::new(stdout), theme, colored)
    }

    fn lock(&self) -> MutexGuard<'_, ConsoleInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn theme(&self) -> Theme {
        let inner = self.lock();
        if inner.colored {
            inner.theme
        } else {
            inner.theme.plain()
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        self.lock().theme = theme;
    }

    pub fn info(&self, title: &str, message: &str) {
        let theme = self.theme();
        self.write_line(&format!("{} {}", theme.paint(theme.info, &format!("[{}]", title)), message));
    }

    pub fn warning(&self, title: &str, message: &str) {
        let theme = self.theme();
        self.write_line(&format!("{} {}", theme.paint(theme.warning, &format!("[{}]", title)), message));
    }

    /// Render the running-timers panel
    pub fn panel(&self, timers: &[TimerStatus]) {
        let theme = self.theme();
        let heading = if theme.topmost {
            "Running Timers (always on top)"
        } else {
            "Running Timers"
        };
        let mut lines = vec![theme.paint(theme.heading, heading)];
        if timers.is_empty() {
            lines.push(theme.paint(theme.text, "  (none)"));
        }
        for status in timers {
            lines.push(theme.paint(theme.text, &format!("  {}", status)));
        }
        self.write_line(&lines.join("\n"));
    }

    pub fn alarms(&self) {
        let names: Vec<String> = AlarmSound::ALL.iter().map(|alarm| alarm.to_string()).collect();
        self.write_line(&format!("Alarm sounds: {}", names.join(", ")));
    }

    pub fn write_line(&self, text: &str) {
        let mut inner = self.lock();
        if let Err(e) = writeln!(inner.out, "{}", text).and_then(|_| inner.out.flush()) {
            warn!("Failed to write to console: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::settings::Settings;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_start() {
        let command = parse_line("start \"Soft eggs\" 0 0 5 bell.wav").unwrap();
        assert_eq!(
            command,
            Some(ConsoleCommand::Start {
                name: "Soft eggs".to_string(),
                hours: 0,
                minutes: 0,
                seconds: 5,
                alarm: AlarmSound::Bell,
            })
        );
    }

    #[test]
    fn test_parse_start_default_alarm() {
        match parse_line("start Tea 0 3 0").unwrap() {
            Some(ConsoleCommand::Start { alarm, .. }) => assert_eq!(alarm, AlarmSound::None),
            other => panic!("Expected start, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(parse_line("start Tea x 0 0"), Err(CommandError::Usage(_))));
        assert!(matches!(parse_line("start Tea 0 0 -5"), Err(CommandError::Usage(_))));
        assert!(matches!(parse_line("start Tea 0 0 5 gong"), Err(CommandError::Usage(_))));
        assert!(matches!(parse_line("launch"), Err(CommandError::Usage(_))));
        assert!(matches!(parse_line("stop \"Tea"), Err(CommandError::InvalidQuoting)));
    }

    #[test]
    fn test_parse_options() {
        assert_eq!(
            parse_line("options dark_mode on").unwrap(),
            Some(ConsoleCommand::Options {
                key: Some(SettingKey::DarkMode),
                value: Some(true),
            })
        );
        assert_eq!(
            parse_line("options").unwrap(),
            Some(ConsoleCommand::Options { key: None, value: None })
        );
        assert!(parse_line("options dark_mode maybe").is_err());
        assert!(parse_line("options volume on").is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("exit").unwrap(), Some(ConsoleCommand::Quit));
        assert_eq!(parse_line("stop Tea").unwrap(), Some(ConsoleCommand::Stop { name: "Tea".to_string() }));
        assert!(matches!(parse_line("help"), Err(CommandError::Help(_))));
    }

    #[test]
    fn test_panel_rendering() {
        let buffer = Buffer::default();
        let console = Console::new(Box::new(buffer.clone()), Theme::LIGHT);

        console.panel(&[TimerStatus {
            id: crate::timers::TimerId(1),
            name: "Eggs".to_string(),
            remaining: Duration::from_secs(5),
        }]);

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(written.contains("Running Timers"));
        assert!(written.contains("Eggs - 00:00:05"));
    }

    fn sample_row() -> TimerStatus {
        TimerStatus {
            id: crate::timers::TimerId(1),
            name: "Eggs".to_string(),
            remaining: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_default_theme_row_is_readable() {
        let buffer = Buffer::default();
        let console = Console::new(Box::new(buffer.clone()), Settings::default().theme());

        console.panel(&[sample_row()]);

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(written.contains("Eggs - 00:00:05"));
        assert!(!written.contains("\x1b[30m"));
    }

    #[test]
    fn test_uncolored_console_writes_no_escapes() {
        let buffer = Buffer::default();
        let dark = Settings {
            always_on_top: false,
            dark_mode: true,
        };
        let console = Console::with_color(Box::new(buffer.clone()), dark.theme(), false);

        console.panel(&[sample_row()]);
        console.set_theme(Settings::default().theme());
        console.warning("Timer Not Found", "No running timer found with the name 'Tea'.");

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(!written.contains('\x1b'));
        assert!(written.contains("  Eggs - 00:00:05"));
        assert!(written.contains("[Timer Not Found] No running timer"));
    }

    #[test]
    fn test_heading_marks_always_on_top() {
        let buffer = Buffer::default();
        let pinned = Settings {
            always_on_top: true,
            dark_mode: false,
        };
        let console = Console::new(Box::new(buffer.clone()), pinned.theme());

        console.panel(&[]);
        console.set_theme(Settings::default().theme());
        console.panel(&[]);

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written.matches("Running Timers (always on top)").count(), 1);
        assert_eq!(written.matches("Running Timers").count(), 2);
    }
}
