use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use super::error::TimerError;
use super::model::{duration_from_hms, AlarmSound, Timer, TimerId, TimerStatus};
use crate::scheduler::{AppEvent, ScheduledTask, Scheduler};
use crate::ui::NotificationSink;

/// How the registry treats stopped timers
#[derive(Debug, Clone)]
pub struct RegistryPolicy {
    /// Revoke the pending expiry when a timer is stopped
    pub cancel_on_stop: bool,
    /// Stopped timers kept around after their expiry is settled
    pub history_limit: usize,
}

impl Default for RegistryPolicy {
    fn default() -> Self {
        Self {
            cancel_on_stop: false,
            history_limit: 64,
        }
    }
}

/// Owns every timer created during the session.
///
/// Timers are keyed by a generated id, so iteration order is creation
/// order and an expiry event can always find its timer again.
pub struct TimerRegistry {
    timers: BTreeMap<TimerId, Timer>,
    pending: HashMap<TimerId, ScheduledTask>,
    next_id: u64,
    scheduler: Arc<dyn Scheduler>,
    policy: RegistryPolicy,
}

impl TimerRegistry {
    pub fn new(scheduler: Arc<dyn Scheduler>, policy: RegistryPolicy) -> Self {
        Self {
            timers: BTreeMap::new(),
            pending: HashMap::new(),
            next_id: 1,
            scheduler,
            policy,
        }
    }

    /// Start a countdown and schedule its expiry
    pub fn create(
        &mut self,
        name: &str,
        duration: Duration,
        alarm: AlarmSound,
    ) -> Result<TimerId, TimerError> {
        if duration.is_zero() {
            return Err(TimerError::DurationZero);
        }

        if self.find_running(name).is_some() {
            return Err(TimerError::DuplicateRunningTimer {
                name: name.to_string(),
            });
        }

        let now = Instant::now();
        let deadline = now
            .checked_add(duration)
            .ok_or(TimerError::DurationTooLong)?;

        let id = TimerId(self.next_id);
        self.next_id += 1;

        self.timers.insert(
            id,
            Timer {
                id,
                name: name.to_string(),
                deadline,
                duration,
                running: true,
                alarm,
            },
        );

        let task = self
            .scheduler
            .schedule(deadline - now, AppEvent::TimerExpired(id));
        self.pending.insert(id, task);

        info!("Started timer '{}' ({}) for {:?}, alarm {}", name, id, duration, alarm);
        self.purge_history();
        Ok(id)
    }

    /// [`create`](Self::create) from an hours/minutes/seconds entry
    pub fn create_from_hms(
        &mut self,
        name: &str,
        hours: u64,
        minutes: u64,
        seconds: u64,
        alarm: AlarmSound,
    ) -> Result<TimerId, TimerError> {
        let duration = duration_from_hms(hours, minutes, seconds)?;
        self.create(name, duration, alarm)
    }

    /// Stop the first running timer with this name
    pub fn stop(&mut self, name: &str) -> Result<TimerId, TimerError> {
        let id = self.find_running(name).ok_or_else(|| TimerError::NotFound {
            name: name.to_string(),
        })?;

        if let Some(timer) = self.timers.get_mut(&id) {
            timer.running = false;
        }

        if self.policy.cancel_on_stop {
            if let Some(task) = self.pending.remove(&id) {
                task.cancel();
                debug!("Cancelled pending expiry for {}", id);
            }
        }

        info!("Stopped timer '{}' ({})", name, id);
        Ok(id)
    }

    /// Handle a delivered expiry: notify, then mark the timer stopped.
    ///
    /// Runs even if the timer was already stopped by hand. Returns false
    /// when the timer is no longer known.
    pub fn expire(&mut self, id: TimerId, sink: &dyn NotificationSink) -> bool {
        self.pending.remove(&id);

        let Some(timer) = self.timers.get_mut(&id) else {
            debug!("Expiry for unknown timer {}", id);
            return false;
        };

        info!("Timer '{}' ({}) ended", timer.name, id);
        sink.timer_ended(&timer.name, timer.alarm);
        timer.running = false;
        true
    }

    /// Remaining time of every running timer, in creation order
    pub fn running_snapshot(&self) -> Vec<TimerStatus> {
        let now = Instant::now();
        self.timers
            .values()
            .filter(|timer| timer.running)
            .map(|timer| TimerStatus {
                id: timer.id,
                name: timer.name.clone(),
                remaining: timer.remaining_at(now),
            })
            .collect()
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers.get(&id)
    }

    /// Stopped timers still held, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Timer> {
        self.timers.values().filter(|timer| !timer.running)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    fn find_running(&self, name: &str) -> Option<TimerId> {
        self.timers
            .values()
            .find(|timer| timer.running && timer.name == name)
            .map(|timer| timer.id)
    }

    /// Drop the oldest settled stopped timers beyond the history limit.
    ///
    /// A stopped timer whose expiry is still pending stays, so its
    /// notification can still find it.
    fn purge_history(&mut self) {
        let settled: Vec<TimerId> = self
            .timers
            .values()
            .filter(|timer| !timer.running && !self.pending.contains_key(&timer.id))
            .map(|timer| timer.id)
            .collect();

        let excess = settled.len().saturating_sub(self.policy.history_limit);
        for id in settled.into_iter().take(excess) {
            self.timers.remove(&id);
            debug!("Purged stopped timer {}", id);
        }
    }
}
