//! Durable per-user session store
//!
//! Stores one [`UserSession`] record per user in an embedded `sled`
//! database. Every committed write is flushed before success is returned,
//! so an acknowledged operation survives a process restart.
//!
//! The store is safe for concurrent use across users; operations against a
//! single user are serialized by the engine's per-user worker, which is the
//! only writer for that key.

use crate::error::{AskadayError, Result};
use directories::ProjectDirs;
use sled::Db;
use std::path::{Path, PathBuf};

pub mod types;
pub use types::{
    new_task_id, Answer, ConversationState, Task, TaskId, TimeOfDay, UserId, UserSession,
};

/// Sled-backed task and answer store
pub struct TaskStore {
    db: Db,
}

impl TaskStore {
    /// Open the store at its default location
    ///
    /// The `ASKADAY_STORE` environment variable overrides the platform
    /// data directory, which makes it easy to point the binary at a test
    /// database or an alternate path.
    ///
    /// # Errors
    ///
    /// Returns `AskadayError::Storage` if the database cannot be opened.
    pub fn open_default() -> Result<Self> {
        if let Ok(override_path) = std::env::var("ASKADAY_STORE") {
            return Self::open(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "xbcsmith", "askaday")
            .ok_or_else(|| AskadayError::Storage("Could not determine data directory".into()))?;

        let path: PathBuf = proj_dirs.data_dir().join("sessions.db");
        Self::open(path)
    }

    /// Open or create a store at the given path
    ///
    /// # Errors
    ///
    /// Returns `AskadayError::Storage` if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)
            .map_err(|e| AskadayError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    /// Fetch a user's session, creating an empty one if absent
    ///
    /// Idempotent: an absent key is not an error and nothing is written
    /// until the session is stored explicitly.
    pub fn get(&self, user: UserId) -> Result<UserSession> {
        match self
            .db
            .get(user.key_bytes())
            .map_err(|e| AskadayError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => {
                let session = serde_json::from_slice(&bytes)
                    .map_err(|e| AskadayError::Storage(format!("Deserialization failed: {}", e)))?;
                Ok(session)
            }
            None => Ok(UserSession::new(user)),
        }
    }

    /// Persist a full session record
    ///
    /// The write is flushed before returning; success means durable.
    pub fn put(&self, session: &UserSession) -> Result<()> {
        let value = serde_json::to_vec(session)
            .map_err(|e| AskadayError::Storage(format!("Serialization failed: {}", e)))?;

        self.db
            .insert(session.user.key_bytes(), value)
            .map_err(|e| AskadayError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| AskadayError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    /// Append a task to a user's list, returning its 0-based index
    pub fn put_task(&self, user: UserId, task: Task) -> Result<usize> {
        let mut session = self.get(user)?;
        session.tasks.push(task);
        let index = session.tasks.len() - 1;
        self.put(&session)?;
        Ok(index)
    }

    /// Remove and return the task at a 0-based index
    ///
    /// Subsequent tasks shift down by one, which keeps display numbering
    /// dense.
    ///
    /// # Errors
    ///
    /// Returns `AskadayError::NotFound` if the index is out of range; the
    /// stored session is left untouched.
    pub fn delete_task(&self, user: UserId, index: usize) -> Result<Task> {
        let mut session = self.get(user)?;
        if index >= session.tasks.len() {
            return Err(AskadayError::NotFound(format!(
                "task index {} for user {}",
                index, user
            ))
            .into());
        }
        let task = session.tasks.remove(index);
        self.put(&session)?;
        Ok(task)
    }

    /// Append an answer record to a user's history
    pub fn append_answer(&self, user: UserId, answer: Answer) -> Result<()> {
        let mut session = self.get(user)?;
        session.answers.push(answer);
        self.put(&session)
    }

    /// All of a user's tasks in insertion order
    pub fn list_tasks(&self, user: UserId) -> Result<Vec<Task>> {
        Ok(self.get(user)?.tasks)
    }

    /// All of a user's answers in append order
    pub fn list_answers(&self, user: UserId) -> Result<Vec<Answer>> {
        Ok(self.get(user)?.answers)
    }

    /// Re-resolve a task by id
    ///
    /// Used by the engine at fire time: the task may have been deleted
    /// between scheduling and firing.
    pub fn find_task(&self, user: UserId, task_id: &str) -> Result<Option<Task>> {
        Ok(self
            .get(user)?
            .tasks
            .into_iter()
            .find(|task| task.id == task_id))
    }

    /// Every user id with a stored session
    ///
    /// Used by scheduler rehydration after a restart.
    pub fn user_ids(&self) -> Result<Vec<UserId>> {
        let mut users = Vec::new();
        for entry in self.db.iter() {
            let (key, _) =
                entry.map_err(|e| AskadayError::Storage(format!("Iteration failed: {}", e)))?;
            let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                AskadayError::Storage(format!("Malformed session key of length {}", key.len()))
            })?;
            users.push(UserId(u64::from_be_bytes(bytes)));
        }
        Ok(users)
    }
}
