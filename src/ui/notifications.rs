use notify_rust::{Notification, Timeout};
use tracing::{debug, warn};

use super::audio::AlarmPlayer;
use super::console::Console;
use crate::timers::AlarmSound;

/// Where user-facing prompts and timer alerts go
pub trait NotificationSink {
    /// A timer reached its deadline; play its alarm, then tell the user
    fn timer_ended(&self, name: &str, alarm: AlarmSound);

    fn show_info(&self, title: &str, message: &str);

    fn show_warning(&self, title: &str, message: &str);
}

/// Prompts on the console, mirrored to desktop notifications when enabled
pub struct NotificationManager {
    desktop_enabled: bool,
    app_name: String,
    console: Console,
    player: AlarmPlayer,
}

impl NotificationManager {
    pub fn new(console: Console, player: AlarmPlayer) -> Self {
        Self {
            desktop_enabled: true,
            app_name: "Multitimer".to_string(),
            console,
            player,
        }
    }

    pub fn set_desktop_enabled(&mut self, enabled: bool) {
        self.desktop_enabled = enabled;
        debug!("Desktop notifications {}", if enabled { "enabled" } else { "disabled" });
    }

    fn post_desktop(&self, title: &str, message: &str, icon: &str, timeout_ms: u32) {
        if !self.desktop_enabled {
            return;
        }

        if let Err(e) = Notification::new()
            .summary(title)
            .body(message)
            .appname(&self.app_name)
            .icon(icon)
            .timeout(Timeout::Milliseconds(timeout_ms))
            .show()
        {
            warn!("Failed to show notification: {}", e);
        } else {
            debug!("Showed notification: {} - {}", title, message);
        }
    }
}

impl NotificationSink for NotificationManager {
    fn timer_ended(&self, name: &str, alarm: AlarmSound) {
        if !alarm.is_silent() {
            self.player.play(alarm);
        }
        self.show_info("Timer Ended", &format!("The timer '{}' has ended.", name));
    }

    fn show_info(&self, title: &str, message: &str) {
        self.console.info(title, message);
        self.post_desktop(title, message, "dialog-information", 5000);
    }

    fn show_warning(&self, title: &str, message: &str) {
        self.console.warning(title, message);
        self.post_desktop(title, message, "dialog-warning", 7000);
    }
}
