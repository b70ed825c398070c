//! Application controller.
//!
//! Owns the timer registry and the settings, and runs the one loop that
//! handles console input, expiry events and refresh ticks in order.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::scheduler::{AppEvent, PeriodicTask, TokioScheduler};
use crate::storage::SettingsManager;
use crate::timers::TimerRegistry;
use crate::ui::settings::log_applied;
use crate::ui::{parse_line, CommandError, Console, ConsoleCommand, NotificationSink, SettingKey, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    config: AppConfig,
    settings: Settings,
    settings_manager: SettingsManager,
    registry: TimerRegistry,
    scheduler: TokioScheduler,
    notifier: Box<dyn NotificationSink>,
    console: Console,
    refresh: Option<PeriodicTask>,
    events: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(
        config: AppConfig,
        settings: Settings,
        settings_manager: SettingsManager,
        console: Console,
        notifier: Box<dyn NotificationSink>,
    ) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(sender);
        let registry = TimerRegistry::new(Arc::new(scheduler.clone()), config.registry_policy());

        let app = Self {
            config,
            settings,
            settings_manager,
            registry,
            scheduler,
            notifier,
            console,
            refresh: None,
            events,
        };
        app.apply_settings();
        app
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &TimerRegistry {
        &self.registry
    }

    pub fn is_panel_shown(&self) -> bool {
        self.refresh.is_some()
    }

    /// Process input lines and events until quit, end of input, or Ctrl+C
    pub async fn run<R>(mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        info!("Ready for commands");
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read console input")? else {
                        info!("Console input closed");
                        break;
                    };
                    if self.handle_line(&line).await == Flow::Quit {
                        break;
                    }
                }
                Some(event) = self.events.recv() => {
                    self.handle_event(event);
                }
                _ = &mut shutdown => {
                    info!("Interrupted");
                    break;
                }
            }
        }

        self.hide_panel();
        Ok(())
    }

    /// Wait for the next scheduled event
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.events.recv().await
    }

    pub async fn handle_line(&mut self, line: &str) -> Flow {
        match parse_line(line) {
            Ok(Some(command)) => self.handle_command(command).await,
            Ok(None) => Flow::Continue,
            Err(CommandError::Help(text)) => {
                self.console.write_line(text.trim_end());
                Flow::Continue
            }
            Err(e) => {
                self.notifier.show_warning("Invalid Command", e.to_string().trim_end());
                Flow::Continue
            }
        }
    }

    pub async fn handle_command(&mut self, command: ConsoleCommand) -> Flow {
        debug!("Command: {:?}", command);
        match command {
            ConsoleCommand::Start {
                name,
                hours,
                minutes,
                seconds,
                alarm,
            } => match self.registry.create_from_hms(&name, hours, minutes, seconds, alarm) {
                Ok(id) => {
                    let ends = self
                        .registry
                        .get(id)
                        .and_then(|timer| wall_clock_end(timer.duration))
                        .map(|at| format!(" It ends at {}.", at))
                        .unwrap_or_default();
                    self.console
                        .info("Timer Started", &format!("The timer '{}' is running.{}", name, ends));
                }
                Err(e) => self.notifier.show_warning(e.title(), &e.to_string()),
            },
            ConsoleCommand::Stop { name } => match self.registry.stop(&name) {
                Ok(_) => self
                    .notifier
                    .show_info("Timer Stopped", &format!("The timer '{}' has been stopped.", name)),
                Err(e) => self.notifier.show_warning(e.title(), &e.to_string()),
            },
            ConsoleCommand::Show => self.show_panel(),
            ConsoleCommand::Hide => self.hide_panel(),
            ConsoleCommand::List => self.console.panel(&self.registry.running_snapshot()),
            ConsoleCommand::Options { key, value } => match (key, value) {
                (Some(key), Some(value)) => self.update_setting(key, value).await,
                (Some(key), None) => self.print_setting(key),
                _ => {
                    for key in SettingKey::ALL {
                        self.print_setting(key);
                    }
                }
            },
            ConsoleCommand::Alarms => self.console.alarms(),
            ConsoleCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::TimerExpired(id) => {
                self.registry.expire(id, self.notifier.as_ref());
            }
            AppEvent::Refresh => {
                if self.is_panel_shown() {
                    self.console.panel(&self.registry.running_snapshot());
                }
            }
        }
    }

    fn show_panel(&mut self) {
        if self.refresh.is_none() {
            let period = self.config.refresh_interval();
            self.refresh = Some(self.scheduler.every(period, AppEvent::Refresh));
            debug!("Panel refresh started every {:?}", period);
        }
        self.console.panel(&self.registry.running_snapshot());
    }

    fn hide_panel(&mut self) {
        if let Some(refresh) = self.refresh.take() {
            refresh.stop();
            debug!("Panel refresh stopped");
        }
    }

    fn print_setting(&self, key: SettingKey) {
        self.console
            .write_line(&format!("{}: {}", key, on_off(self.settings.get(key))));
    }

    /// Change one setting, apply it, and persist straight away
    async fn update_setting(&mut self, key: SettingKey, value: bool) {
        self.settings.set(key, value);
        self.apply_settings();

        match self.settings_manager.save_settings(&self.settings).await {
            Ok(()) => self
                .notifier
                .show_info("Options", &format!("{} is now {}.", key, on_off(value))),
            Err(e) => {
                error!("Failed to save settings: {:#}", anyhow::Error::from(e));
                self.notifier
                    .show_warning("Options", "The setting was applied but could not be saved.");
            }
        }
    }

    fn apply_settings(&self) {
        self.console.set_theme(self.settings.theme());
        log_applied(&self.settings);
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Local wall-clock time `duration` from now
fn wall_clock_end(duration: Duration) -> Option<String> {
    let delta = chrono::Duration::from_std(duration).ok()?;
    chrono::Local::now()
        .checked_add_signed(delta)
        .map(|at| at.format("%H:%M:%S").to_string())
}
