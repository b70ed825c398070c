use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use super::error::TimerError;

/// Stable identifier handed out by the registry, increasing in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sound played when a timer ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmSound {
    #[default]
    None,
    Beep,
    Bell,
}

impl AlarmSound {
    pub const ALL: [AlarmSound; 3] = [AlarmSound::None, AlarmSound::Beep, AlarmSound::Bell];

    /// Audio file played for this choice, `None` for the silent sentinel
    pub fn file_name(self) -> Option<&'static str> {
        match self {
            AlarmSound::None => None,
            AlarmSound::Beep => Some("beep.wav"),
            AlarmSound::Bell => Some("bell.wav"),
        }
    }

    pub fn is_silent(self) -> bool {
        self == AlarmSound::None
    }
}

impl fmt::Display for AlarmSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name().unwrap_or("None"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown alarm sound '{0}'")]
pub struct UnknownAlarm(pub String);

impl FromStr for AlarmSound {
    type Err = UnknownAlarm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        match lowered.as_str() {
            "none" | "" => Ok(AlarmSound::None),
            "beep" | "beep.wav" => Ok(AlarmSound::Beep),
            "bell" | "bell.wav" => Ok(AlarmSound::Bell),
            _ => Err(UnknownAlarm(s.to_string())),
        }
    }
}

/// A named countdown
#[derive(Debug, Clone)]
pub struct Timer {
    pub id: TimerId,
    pub name: String,
    pub deadline: Instant,
    pub duration: Duration,
    pub running: bool,
    pub alarm: AlarmSound,
}

impl Timer {
    /// Time left before the deadline, clamped at zero
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }
}

/// One row of the running-timers panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerStatus {
    pub id: TimerId,
    pub name: String,
    pub remaining: Duration,
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, format_hms(self.remaining))
    }
}

/// Total duration of an hours/minutes/seconds entry
pub fn duration_from_hms(hours: u64, minutes: u64, seconds: u64) -> Result<Duration, TimerError> {
    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .map(Duration::from_secs)
        .ok_or(TimerError::DurationTooLong)
}

/// Format a duration as "HH:MM:SS", dropping partial seconds
pub fn format_hms(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}
