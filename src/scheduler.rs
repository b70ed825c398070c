//! Delayed and periodic event delivery onto the application event loop.
//!
//! Scheduled work never touches application state directly. A task
//! sleeps, then sends an [`AppEvent`] into the controller's channel, and
//! the controller handles it on its own loop.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::timers::TimerId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    TimerExpired(TimerId),
    Refresh,
}

/// Handle to a pending one-shot delivery.
///
/// Dropping the handle leaves the delivery in place; only [`cancel`]
/// revokes it.
///
/// [`cancel`]: ScheduledTask::cancel
#[derive(Debug)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn spawned(handle: JoinHandle<()>) -> Self {
        Self { handle: Some(handle) }
    }

    /// A handle with nothing behind it, for schedulers that deliver elsewhere
    pub fn detached() -> Self {
        Self { handle: None }
    }

    pub fn cancel(self) {
        if let Some(handle) = self.handle {
            handle.abort();
        }
    }
}

pub trait Scheduler: Send + Sync {
    /// Deliver `event` once, after `delay`
    fn schedule(&self, delay: Duration, event: AppEvent) -> ScheduledTask;
}

/// Scheduler backed by tokio timers feeding an unbounded channel
#[derive(Clone)]
pub struct TokioScheduler {
    sender: mpsc::UnboundedSender<AppEvent>,
}

impl TokioScheduler {
    pub fn new(sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { sender }
    }

    /// Start delivering `event` every `period`, first delivery one period from now
    pub fn every(&self, period: Duration, event: AppEvent) -> PeriodicTask {
        PeriodicTask::start(self.sender.clone(), period, event)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, event: AppEvent) -> ScheduledTask {
        let sender = self.sender.clone();
        debug!("Scheduling {:?} in {:?}", event, delay);
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            // The receiver is gone only during shutdown
            let _ = sender.send(event);
        });
        ScheduledTask::spawned(handle)
    }
}

/// Repeating delivery that runs until stopped or dropped
#[derive(Debug)]
pub struct PeriodicTask {
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    pub fn start(sender: mpsc::UnboundedSender<AppEvent>, period: Duration, event: AppEvent) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if sender.send(event.clone()).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_delivery() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(sender);
        let start = Instant::now();

        let _task = scheduler.schedule(Duration::from_secs(5), AppEvent::TimerExpired(TimerId(7)));

        assert_eq!(receiver.recv().await, Some(AppEvent::TimerExpired(TimerId(7))));
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_never_delivers() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(sender);

        let task = scheduler.schedule(Duration::from_secs(5), AppEvent::Refresh);
        task.cancel();

        let outcome = time::timeout(Duration::from_secs(60), receiver.recv()).await;
        assert!(outcome.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_still_delivers() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(sender);

        drop(scheduler.schedule(Duration::from_secs(1), AppEvent::Refresh));

        assert_eq!(receiver.recv().await, Some(AppEvent::Refresh));
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_task_stops() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(sender);

        let ticker = scheduler.every(Duration::from_secs(1), AppEvent::Refresh);
        assert_eq!(receiver.recv().await, Some(AppEvent::Refresh));
        assert_eq!(receiver.recv().await, Some(AppEvent::Refresh));
        ticker.stop();

        let outcome = time::timeout(Duration::from_secs(10), receiver.recv()).await;
        assert!(outcome.is_err());
    }
}
