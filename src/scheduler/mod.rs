//! Daily reminder scheduler
//!
//! Maintains one timer task per reminder. A timer sleeps until the next
//! wall-clock `HH:MM` in the configured fixed timezone, emits a
//! [`Event::ReminderFired`] into the engine's event channel, and loops for
//! the next day. Firing is fire-and-forget: existence checks and delivery
//! are the engine's job.
//!
//! Timers are not persisted. On startup [`Scheduler::rehydrate`] re-reads
//! every task from the store and re-registers a timer for each, which is
//! how schedules survive a process restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use metrics::increment_counter;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::EngineHandle;
use crate::error::Result;
use crate::store::{TaskId, TaskStore, TimeOfDay, UserId};

/// Source of the current instant
///
/// Injected so tests can pin the wall clock while tokio's paused timer
/// drives the sleeps.
pub trait Clock: Send + Sync {
    /// The current instant in UTC
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Time remaining until the next daily occurrence of `time`
///
/// A target equal to the current instant counts as already passed and
/// schedules for tomorrow, so a timer that just fired cannot fire twice.
pub fn next_fire_delay(now: DateTime<FixedOffset>, time: TimeOfDay) -> Duration {
    let wall = now
        .date_naive()
        .and_hms_opt(u32::from(time.hour), u32::from(time.minute), 0)
        .expect("validated wall-clock time");

    // A fixed offset maps every local time to exactly one instant.
    let mut target = now
        .offset()
        .from_local_datetime(&wall)
        .single()
        .expect("fixed offsets are unambiguous");

    if target <= now {
        target += chrono::Duration::days(1);
    }

    (target - now).to_std().expect("target is in the future")
}

/// Registry of live daily timers
///
/// Holds only weak references to tasks (owner id + task id); the engine
/// re-resolves the task from the store at fire time.
pub struct Scheduler {
    events: EngineHandle,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    timers: Mutex<HashMap<TaskId, JoinHandle<()>>>,
}

impl Scheduler {
    /// Create a scheduler that emits fires into the given engine channel
    pub fn new(events: EngineHandle, clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self {
            events,
            clock,
            offset,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Convenience constructor for a whole-hour UTC offset
    pub fn with_utc_offset_hours(events: EngineHandle, clock: Arc<dyn Clock>, hours: i8) -> Self {
        let offset = FixedOffset::east_opt(i32::from(hours) * 3600).expect("validated offset");
        Self::new(events, clock, offset)
    }

    /// Register a daily timer for a task
    ///
    /// Replaces (and aborts) any existing timer registered under the same
    /// task id, so re-scheduling is idempotent.
    pub fn schedule(&self, owner: UserId, task_id: TaskId, time: TimeOfDay) {
        let events = self.events.clone();
        let clock = Arc::clone(&self.clock);
        let offset = self.offset;
        let timer_task_id = task_id.clone();

        let handle = tokio::spawn(async move {
            loop {
                let now = clock.now_utc().with_timezone(&offset);
                let delay = next_fire_delay(now, time);
                tokio::time::sleep(delay).await;

                increment_counter!("reminder_fires_total");
                if events.reminder_fired(owner, timer_task_id.clone()).is_err() {
                    debug!(task_id = %timer_task_id, "Engine gone, timer stopping");
                    break;
                }
            }
        });

        debug!(%owner, %task_id, %time, "Registered daily timer");
        let mut timers = self.timers.lock().expect("timer registry lock poisoned");
        if let Some(previous) = timers.insert(task_id, handle) {
            previous.abort();
        }
    }

    /// Cancel the timer for a task
    ///
    /// Returns whether a timer was registered. Cancelling an unknown id is
    /// a no-op: the fire-time existence check in the engine is the
    /// backstop either way.
    pub fn cancel(&self, task_id: &str) -> bool {
        let mut timers = self.timers.lock().expect("timer registry lock poisoned");
        match timers.remove(task_id) {
            Some(handle) => {
                handle.abort();
                debug!(%task_id, "Cancelled daily timer");
                true
            }
            None => false,
        }
    }

    /// Re-register a timer for every task in the store
    ///
    /// Mandatory on process start: only tasks are persisted, never timers.
    /// Returns the number of timers registered.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the sweep over stored sessions fails;
    /// timers registered before the failure stay registered.
    pub fn rehydrate(&self, store: &TaskStore) -> Result<usize> {
        let mut registered = 0;
        for user in store.user_ids()? {
            for task in store.list_tasks(user)? {
                self.schedule(task.owner, task.id.clone(), task.time);
                registered += 1;
            }
        }
        info!(timers = registered, "Rehydrated schedule from store");
        Ok(registered)
    }

    /// Number of live timers (test and diagnostics helper)
    pub fn timer_count(&self) -> usize {
        self.timers
            .lock()
            .expect("timer registry lock poisoned")
            .len()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let timers = self.timers.get_mut().expect("timer registry lock poisoned");
        for (task_id, handle) in timers.drain() {
            handle.abort();
            debug!(%task_id, "Aborted timer on scheduler drop");
        }
    }
}
