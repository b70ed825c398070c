//! Error types for timer operations

use thiserror::Error;

/// Reasons a registry operation is rejected. A rejection never changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("Timer duration cannot be zero.")]
    DurationZero,

    #[error("Timer duration is too long.")]
    DurationTooLong,

    #[error("A timer with the name '{name}' is already running.")]
    DuplicateRunningTimer { name: String },

    #[error("No running timer found with the name '{name}'.")]
    NotFound { name: String },
}

impl TimerError {
    /// Title used when the error is shown as a prompt
    pub fn title(&self) -> &'static str {
        match self {
            TimerError::DurationZero | TimerError::DurationTooLong => "Invalid Timer",
            TimerError::DuplicateRunningTimer { .. } => "Timer Already Running",
            TimerError::NotFound { .. } => "Timer Not Found",
        }
    }
}
