//! Answer history export
//!
//! Renders a user's collected answers to a tabular CSV byte stream:
//! a `timestamp,question,answer` header row, then one row per answer in
//! append order with RFC-3339 timestamps. Pure read path; nothing in the
//! store or the session is touched.

use std::sync::Arc;

use crate::error::{AskadayError, Result};
use crate::store::{Answer, TaskStore, UserId};

/// Render answers as CSV bytes
///
/// Zero answers produce a header-only document, not an error.
pub fn render_csv(answers: &[Answer]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["timestamp", "question", "answer"])
        .map_err(|e| AskadayError::Storage(format!("CSV header failed: {}", e)))?;

    for answer in answers {
        writer
            .write_record([
                answer.timestamp.to_rfc3339().as_str(),
                answer.question.as_str(),
                answer.text.as_str(),
            ])
            .map_err(|e| AskadayError::Storage(format!("CSV row failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AskadayError::Storage(format!("CSV flush failed: {}", e)))?;
    Ok(bytes)
}

/// Suggested artifact name for a user's export
pub fn suggested_filename(user: UserId) -> String {
    format!("results_{}.csv", user)
}

/// Read-only adapter from the session store to the CSV sink
pub struct ExportAdapter {
    store: Arc<TaskStore>,
}

impl ExportAdapter {
    /// Create an adapter over a store
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }

    /// Export one user's full answer history as CSV bytes
    pub fn export(&self, user: UserId) -> Result<Vec<u8>> {
        let answers = self.store.list_answers(user)?;
        render_csv(&answers)
    }
}
