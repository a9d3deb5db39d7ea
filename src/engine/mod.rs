//! Conversation engine
//!
//! The engine is the single consumer of an event channel into which both
//! the transports (inbound user text) and the scheduler (reminder fires)
//! submit [`Event`]s. Each user gets a dedicated worker task with its own
//! inbox; a worker processes its inbox strictly in admission order, which
//! serializes all state transitions for that user while leaving different
//! users fully independent.
//!
//! Collaborators are injected at construction: the engine holds the store,
//! the scheduler, and the outbound channel it was given, never a
//! process-wide singleton.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{AskadayError, Result};
use crate::scheduler::Scheduler;
use crate::store::{TaskId, TaskStore, UserId};
use crate::transport::MessageChannel;

pub mod session;
pub mod worker;

pub use worker::UserWorker;

/// One unit of work admitted into a user's serialization queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A foreground text message from the user
    Inbound {
        /// Sender
        user: UserId,
        /// Raw message text
        text: String,
    },
    /// A scheduler timer reached its wall-clock time
    ///
    /// Carries only weak references; the worker re-resolves the task from
    /// the store, which may no longer contain it.
    ReminderFired {
        /// Task owner
        owner: UserId,
        /// Fired task id
        task_id: TaskId,
    },
}

impl Event {
    /// The user whose serialization queue admits this event
    pub fn user(&self) -> UserId {
        match self {
            Event::Inbound { user, .. } => *user,
            Event::ReminderFired { owner, .. } => *owner,
        }
    }
}

/// Cloneable submission side of the engine's event channel
///
/// Transports and the scheduler hold one of these; the engine owns the
/// receiving end.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Event>,
}

impl EngineHandle {
    /// Submit an event for processing
    ///
    /// # Errors
    ///
    /// Returns `AskadayError::Delivery` if the engine has stopped.
    pub fn submit(&self, event: Event) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| AskadayError::Delivery("engine event channel closed".into()))?;
        Ok(())
    }

    /// Submit a foreground message from a user
    pub fn inbound(&self, user: UserId, text: impl Into<String>) -> Result<()> {
        self.submit(Event::Inbound {
            user,
            text: text.into(),
        })
    }

    /// Submit a reminder fire for a task
    pub fn reminder_fired(&self, owner: UserId, task_id: TaskId) -> Result<()> {
        self.submit(Event::ReminderFired { owner, task_id })
    }
}

/// Create the engine event channel
///
/// Returns the handle to hand out to transports and the scheduler, and the
/// receiver to construct the [`Engine`] with.
pub fn engine_channel() -> (EngineHandle, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EngineHandle { tx }, rx)
}

/// The conversation engine dispatch loop
///
/// Routes admitted events to per-user workers, spawning a worker on a
/// user's first event. Runs until every [`EngineHandle`] is dropped.
pub struct Engine {
    store: Arc<TaskStore>,
    scheduler: Arc<Scheduler>,
    channel: Arc<dyn MessageChannel>,
    events: mpsc::UnboundedReceiver<Event>,
    workers: HashMap<UserId, mpsc::UnboundedSender<Event>>,
}

impl Engine {
    /// Create an engine from its injected collaborators
    pub fn new(
        store: Arc<TaskStore>,
        scheduler: Arc<Scheduler>,
        channel: Arc<dyn MessageChannel>,
        events: mpsc::UnboundedReceiver<Event>,
    ) -> Self {
        Self {
            store,
            scheduler,
            channel,
            events,
            workers: HashMap::new(),
        }
    }

    /// Run the dispatch loop to completion
    ///
    /// Returns once the event channel closes. Worker tasks drain their
    /// remaining inboxes and exit on their own.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            let user = event.user();
            let inbox = self
                .workers
                .entry(user)
                .or_insert_with(|| Self::spawn_worker(user, &self.store, &self.scheduler, &self.channel));

            if let Err(rejected) = inbox.send(event) {
                // The worker is gone (it exits only by panicking); start a
                // fresh one and re-admit the event so it is not lost.
                warn!(%user, "Respawning conversation worker");
                let inbox =
                    Self::spawn_worker(user, &self.store, &self.scheduler, &self.channel);
                if inbox.send(rejected.0).is_err() {
                    warn!(%user, "Dropped event for unresponsive worker");
                }
                self.workers.insert(user, inbox);
            }
        }
        debug!("Engine event channel closed, dispatch loop ending");
    }

    fn spawn_worker(
        user: UserId,
        store: &Arc<TaskStore>,
        scheduler: &Arc<Scheduler>,
        channel: &Arc<dyn MessageChannel>,
    ) -> mpsc::UnboundedSender<Event> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
        let worker = UserWorker::new(
            user,
            Arc::clone(store),
            Arc::clone(scheduler),
            Arc::clone(channel),
        );

        tokio::spawn(async move {
            debug!(%user, "Conversation worker started");
            while let Some(event) = rx.recv().await {
                worker.handle(event).await;
            }
            debug!(%user, "Conversation worker finished");
        });

        tx
    }
}
