// Expose modules for testing
pub mod app;
pub mod config;
pub mod scheduler;
pub mod storage;
pub mod timers;
pub mod ui;
