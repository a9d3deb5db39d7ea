//! Messaging channel abstraction and implementations
//!
//! This module defines the [`MessageChannel`] trait the conversation engine
//! uses for all outbound traffic. Concrete implementations live in
//! submodules:
//!
//! - [`console::ConsoleChannel`] -- local terminal output for the `serve`
//!   command (rustyline drives the inbound side).
//! - [`fake::FakeChannel`] -- in-process fake used in tests.
//!
//! # Design
//!
//! The trait is intentionally minimal: the engine `send`s plain text with
//! an optional reply keyboard, asks a question with `send_reply_prompt`,
//! and delivers export artifacts with `send_document`. Framing, rendering,
//! and delivery retries are the responsibility of each implementation.
//!
//! Inbound text does not travel through this trait: transports submit
//! [`crate::engine::Event::Inbound`] events through an
//! [`crate::engine::EngineHandle`], which is what serializes them against
//! the scheduler's timer fires.

use crate::error::Result;
use crate::store::UserId;

/// A one-tap reply keyboard offered alongside a message
///
/// Rows of button labels; tapping a button sends its label back as an
/// ordinary text message. Transports that cannot render keyboards are free
/// to ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    /// Button labels, one inner vector per rendered row
    pub rows: Vec<Vec<String>>,
}

impl Keyboard {
    /// Build a single-row keyboard from labels
    pub fn single_row<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: vec![labels.into_iter().map(Into::into).collect()],
        }
    }

    /// All labels in render order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }
}

/// Abstraction over the outbound half of a chat transport
///
/// Used polymorphically through `Arc<dyn MessageChannel>`; the engine never
/// knows which concrete transport it is talking to.
#[async_trait::async_trait]
pub trait MessageChannel: Send + Sync {
    /// Deliver a plain text message, optionally with a reply keyboard.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AskadayError::Delivery`] if the underlying
    /// channel fails; the engine logs and never escalates these.
    async fn send(&self, user: UserId, text: &str, keyboard: Option<&Keyboard>) -> Result<()>;

    /// Ask a question, marking the next user message as an answer-shaped
    /// reply where the transport supports it.
    async fn send_reply_prompt(&self, user: UserId, text: &str) -> Result<()>;

    /// Deliver a downloadable artifact (the CSV answer export).
    async fn send_document(&self, user: UserId, filename: &str, bytes: Vec<u8>) -> Result<()>;
}

pub mod console;
pub mod fake;
