pub mod error;
pub mod model;
pub mod registry;

pub use error::TimerError;
pub use model::{duration_from_hms, format_hms, AlarmSound, Timer, TimerId, TimerStatus};
pub use registry::{RegistryPolicy, TimerRegistry};
