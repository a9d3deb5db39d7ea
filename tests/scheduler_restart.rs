//! Restart and rehydration tests
//!
//! Simulates losing every in-memory timer (a process restart) and checks
//! that rehydrating from the persisted store re-registers the schedule
//! without duplicating tasks, and that the re-registered timer fires at
//! the next matching wall-clock time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use askaday::engine::{engine_channel, Event};
use askaday::scheduler::{Clock, Scheduler};
use askaday::store::{new_task_id, Task, TaskStore, TimeOfDay, UserId};

/// Clock pinned to 05:30 UTC, which is 08:30 at the +03:00 offset used in
/// these tests: a 09:00 reminder is half an hour out.
struct MorningClock;

impl Clock for MorningClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 5, 30, 0).unwrap()
    }
}

fn mood_task(user: UserId) -> Task {
    Task {
        id: new_task_id(),
        owner: user,
        text: "Mood?".to_string(),
        time: TimeOfDay { hour: 9, minute: 0 },
    }
}

#[tokio::test(start_paused = true)]
async fn test_rehydrated_timer_fires_at_next_wall_clock_match() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sessions.db");
    let user = UserId(1);

    // First process lifetime: create the task, then "crash" by dropping
    // both the store and the scheduler (all timers are lost with it).
    let expected_task_id;
    {
        let store = TaskStore::open(&path).expect("open store");
        let task = mood_task(user);
        expected_task_id = task.id.clone();
        store.put_task(user, task).expect("put_task");

        let (handle, _events) = engine_channel();
        let scheduler =
            Scheduler::with_utc_offset_hours(handle, Arc::new(MorningClock), 3);
        scheduler.rehydrate(&store).expect("rehydrate");
        assert_eq!(scheduler.timer_count(), 1);
    }

    // Second process lifetime: nothing but the store survives.
    let store = TaskStore::open(&path).expect("reopen store");
    let (handle, mut events) = engine_channel();
    let scheduler = Scheduler::with_utc_offset_hours(handle, Arc::new(MorningClock), 3);
    let registered = scheduler.rehydrate(&store).expect("rehydrate");
    assert_eq!(registered, 1);

    // No duplicate task appeared across the restart.
    assert_eq!(store.list_tasks(user).expect("list").len(), 1);

    // 08:30 local -> the re-registered timer fires at 09:00.
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(30 * 60)).await;
    let event = events.recv().await.expect("expected a fire");
    assert_eq!(
        event,
        Event::ReminderFired {
            owner: user,
            task_id: expected_task_id
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_rehydrate_covers_every_user_and_task() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sessions.db");

    {
        let store = TaskStore::open(&path).expect("open store");
        store.put_task(UserId(1), mood_task(UserId(1))).expect("put");
        store.put_task(UserId(1), mood_task(UserId(1))).expect("put");
        store.put_task(UserId(2), mood_task(UserId(2))).expect("put");
    }

    let store = TaskStore::open(&path).expect("reopen store");
    let (handle, _events) = engine_channel();
    let scheduler = Scheduler::with_utc_offset_hours(handle, Arc::new(MorningClock), 3);
    assert_eq!(scheduler.rehydrate(&store).expect("rehydrate"), 3);
    assert_eq!(scheduler.timer_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_timer_cancelled_after_rehydrate_does_not_fire() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sessions.db");
    let user = UserId(1);
    let task = mood_task(user);
    let task_id = task.id.clone();

    {
        let store = TaskStore::open(&path).expect("open store");
        store.put_task(user, task).expect("put_task");
    }

    let store = TaskStore::open(&path).expect("reopen store");
    let (handle, mut events) = engine_channel();
    let scheduler = Scheduler::with_utc_offset_hours(handle, Arc::new(MorningClock), 3);
    scheduler.rehydrate(&store).expect("rehydrate");

    assert!(scheduler.cancel(&task_id));
    tokio::time::advance(Duration::from_secs(3600)).await;
    assert!(events.try_recv().is_err());
}
