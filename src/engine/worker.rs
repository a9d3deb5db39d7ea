//! Per-user conversation worker
//!
//! One worker per user, fed from a private inbox by the engine dispatch
//! loop. Because the inbox is drained sequentially, every state transition
//! for a user is serialized: a reminder fire and a foreground message may
//! be admitted in either order, but they are never applied concurrently.
//!
//! Every handler follows the same commit discipline: mutate a local copy
//! of the session, persist it, and only then perform side effects (timer
//! registration, outbound sends). A failed persist leaves the stored
//! session untouched, so the transition is simply not committed.

use std::sync::Arc;

use chrono::Utc;
use metrics::increment_counter;
use tracing::{debug, error, info, warn};

use crate::engine::session::{
    menu_keyboard, render_answer_list, render_task_list, MenuAction, LABEL_GOODBYE, MSG_ASK_QUESTION,
    MSG_BAD_TIME, MSG_FAILURE, MSG_GOODBYE, MSG_MENU, MSG_NO_ANSWERS, MSG_NO_SUCH_NUMBER,
    MSG_NO_TASKS, MSG_PICK_DELETE,
};
use crate::engine::Event;
use crate::error::Result;
use crate::export;
use crate::scheduler::Scheduler;
use crate::store::{
    new_task_id, Answer, ConversationState, Task, TaskStore, TimeOfDay, UserId, UserSession,
};
use crate::transport::MessageChannel;

/// Serialized transition handler for a single user
pub struct UserWorker {
    user: UserId,
    store: Arc<TaskStore>,
    scheduler: Arc<Scheduler>,
    channel: Arc<dyn MessageChannel>,
}

impl UserWorker {
    /// Create a worker bound to one user
    pub fn new(
        user: UserId,
        store: Arc<TaskStore>,
        scheduler: Arc<Scheduler>,
        channel: Arc<dyn MessageChannel>,
    ) -> Self {
        Self {
            user,
            store,
            scheduler,
            channel,
        }
    }

    /// Apply one admitted event
    ///
    /// Never returns an error: failures are reported to the user or
    /// logged, and the worker stays serviceable for the next event.
    pub async fn handle(&self, event: Event) {
        let outcome = match event {
            Event::Inbound { text, .. } => self.on_inbound(text).await,
            Event::ReminderFired { task_id, .. } => self.on_fire(task_id).await,
        };

        if let Err(e) = outcome {
            error!(user = %self.user, error = %e, "Transition failed");
            if let Err(send_err) = self.channel.send(self.user, MSG_FAILURE, None).await {
                warn!(user = %self.user, error = %send_err, "Could not report failure");
            }
        }
    }

    async fn on_inbound(&self, text: String) -> Result<()> {
        let session = self.store.get(self.user)?;

        // An answer-shaped reply outranks every other interpretation: while
        // a question is outstanding, even text matching a menu label is the
        // answer.
        if session.pending_question.is_some() {
            return self.record_answer(session, text).await;
        }

        if text == LABEL_GOODBYE {
            return self.say_goodbye(session).await;
        }

        match session.state {
            ConversationState::Choosing => self.on_menu(session, &text).await,
            ConversationState::SettingQuestion => self.on_question_text(session, text).await,
            ConversationState::SettingTime => self.on_time_text(session, &text).await,
            ConversationState::Deleting => self.on_delete_number(session, &text).await,
        }
    }

    async fn on_menu(&self, mut session: UserSession, text: &str) -> Result<()> {
        match MenuAction::parse(text) {
            Some(MenuAction::Add) => {
                session.state = ConversationState::SettingQuestion;
                self.store.put(&session)?;
                self.channel.send(self.user, MSG_ASK_QUESTION, None).await?;
            }
            Some(MenuAction::MyQuestions) => {
                // Listing is side-effect free; no state change, no write.
                if session.tasks.is_empty() {
                    self.channel.send(self.user, MSG_NO_TASKS, None).await?;
                } else {
                    let listing = render_task_list(&session.tasks);
                    self.channel.send(self.user, &listing, None).await?;
                }
            }
            Some(MenuAction::MyAnswers) => {
                if session.answers.is_empty() {
                    self.channel.send(self.user, MSG_NO_ANSWERS, None).await?;
                } else {
                    let listing = render_answer_list(&session.answers);
                    self.channel.send(self.user, &listing, None).await?;
                }
            }
            Some(MenuAction::Download) => {
                let bytes = export::render_csv(&session.answers)?;
                let filename = export::suggested_filename(self.user);
                self.channel
                    .send_document(self.user, &filename, bytes)
                    .await?;
            }
            Some(MenuAction::Delete) => {
                if session.tasks.is_empty() {
                    self.channel.send(self.user, MSG_NO_TASKS, None).await?;
                    return Ok(());
                }
                session.state = ConversationState::Deleting;
                self.store.put(&session)?;
                let listing = format!(
                    "{}\n{}",
                    MSG_PICK_DELETE,
                    render_task_list(&session.tasks)
                );
                self.channel.send(self.user, &listing, None).await?;
            }
            None => {
                self.channel
                    .send(self.user, MSG_MENU, Some(&menu_keyboard()))
                    .await?;
            }
        }
        Ok(())
    }

    async fn on_question_text(&self, mut session: UserSession, text: String) -> Result<()> {
        let reply = format!(
            "Ok, I will ask you: {}\nWhen should I ask? Send a time as HH:MM",
            text
        );
        session.pending_task_text = Some(text);
        session.state = ConversationState::SettingTime;
        self.store.put(&session)?;
        self.channel.send(self.user, &reply, None).await?;
        Ok(())
    }

    async fn on_time_text(&self, mut session: UserSession, text: &str) -> Result<()> {
        let time = match TimeOfDay::parse(text) {
            Ok(time) => time,
            Err(e) => {
                // Validation failures re-prompt in place; the captured
                // question text is kept.
                debug!(user = %self.user, error = %e, "Rejected time input");
                self.channel.send(self.user, MSG_BAD_TIME, None).await?;
                return Ok(());
            }
        };

        let Some(question) = session.pending_task_text.take() else {
            // No captured question means the session record is stale;
            // recover by returning to the menu.
            warn!(user = %self.user, "SettingTime with no pending question text");
            session.state = ConversationState::Choosing;
            self.store.put(&session)?;
            self.channel
                .send(self.user, MSG_MENU, Some(&menu_keyboard()))
                .await?;
            return Ok(());
        };

        let task = Task {
            id: new_task_id(),
            owner: self.user,
            text: question,
            time,
        };

        // Task append, pending-text clear, and state reset commit in one
        // store write; the timer is registered only after that commit.
        session.tasks.push(task.clone());
        session.state = ConversationState::Choosing;
        self.store.put(&session)?;
        self.scheduler
            .schedule(self.user, task.id.clone(), task.time);

        info!(user = %self.user, task_id = %task.id, time = %task.time, "Task created");
        let reply = format!(
            "Ok, I will ask you \"{}\" every day at {}.\nAnything else?",
            task.text, task.time
        );
        self.channel
            .send(self.user, &reply, Some(&menu_keyboard()))
            .await?;
        Ok(())
    }

    async fn on_delete_number(&self, mut session: UserSession, text: &str) -> Result<()> {
        // 1-based index into the current task list; anything else is
        // rejected without mutation and the user may retry.
        let position = match text.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= session.tasks.len() => n,
            _ => {
                self.channel.send(self.user, MSG_NO_SUCH_NUMBER, None).await?;
                return Ok(());
            }
        };

        let task = self.store.delete_task(self.user, position - 1)?;
        // Cancel before acknowledging; a fire racing this gap re-resolves
        // the task, finds nothing, and retires itself.
        self.scheduler.cancel(&task.id);

        session = self.store.get(self.user)?;
        session.state = ConversationState::Choosing;
        self.store.put(&session)?;

        info!(user = %self.user, task_id = %task.id, "Task deleted");
        let reply = format!("Removed \"{}\".\nAnything else?", task.text);
        self.channel
            .send(self.user, &reply, Some(&menu_keyboard()))
            .await?;
        Ok(())
    }

    async fn record_answer(&self, mut session: UserSession, text: String) -> Result<()> {
        let Some(question) = session.pending_question.take() else {
            // Checked by the caller; unreachable in practice.
            return Ok(());
        };

        // Answer append and pending-question clear commit in one write, so
        // no observable state has the question both answered and pending.
        session.answers.push(Answer {
            timestamp: Utc::now(),
            question: question.clone(),
            text: text.clone(),
        });
        self.store.put(&session)?;

        increment_counter!("answers_recorded_total");
        info!(user = %self.user, "Answer recorded");
        let reply = format!(
            "Thanks! You answered \"{}\" to \"{}\".",
            text, question
        );
        self.channel.send(self.user, &reply, None).await?;
        Ok(())
    }

    async fn say_goodbye(&self, mut session: UserSession) -> Result<()> {
        // Goodbye aborts an unfinished add flow; the half-built task is
        // dropped.
        session.pending_task_text = None;
        session.state = ConversationState::Choosing;
        self.store.put(&session)?;
        self.channel.send(self.user, MSG_GOODBYE, None).await?;
        Ok(())
    }

    async fn on_fire(&self, task_id: String) -> Result<()> {
        // Weak reference: the task may have been deleted since scheduling.
        let Some(task) = self.store.find_task(self.user, &task_id)? else {
            self.scheduler.cancel(&task_id);
            debug!(user = %self.user, %task_id, "Fire for deleted task, timer retired");
            return Ok(());
        };

        let mut session = self.store.get(self.user)?;
        if session.pending_question.is_some() || session.pending_task_text.is_some() {
            // At most one transient field may be set; this fire waits for
            // tomorrow's timer instead of clobbering the user's context.
            increment_counter!("reminder_skips_total");
            info!(user = %self.user, %task_id, "Fire skipped, user context busy");
            return Ok(());
        }

        session.pending_question = Some(task.text.clone());
        self.store.put(&session)?;

        match self.channel.send_reply_prompt(self.user, &task.text).await {
            Ok(()) => {
                increment_counter!("reminder_deliveries_total");
                debug!(user = %self.user, %task_id, "Reminder delivered");
            }
            Err(e) => {
                // Roll the pending question back so an undelivered prompt
                // cannot swallow the user's next message; the timer stays
                // registered and retries tomorrow.
                increment_counter!("reminder_delivery_failures_total");
                warn!(user = %self.user, %task_id, error = %e, "Reminder delivery failed");
                session.pending_question = None;
                if let Err(rollback) = self.store.put(&session) {
                    error!(user = %self.user, error = %rollback, "Pending-question rollback failed");
                }
            }
        }
        Ok(())
    }
}
