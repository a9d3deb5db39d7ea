//! In-process fake channel for engine unit and integration tests
//!
//! This module provides [`FakeChannel`] and [`FakeChannelHandle`], an
//! in-process pair that replaces a real chat transport in tests.
//!
//! # Usage
//!
//! Call [`FakeChannel::new`] to obtain a `(FakeChannel, FakeChannelHandle)`
//! pair. Wire the [`FakeChannel`] into the engine under test. From the test
//! side, use the [`FakeChannelHandle`] to read what the engine sent:
//! `handle.outbound_rx.recv().await`.
//!
//! Inbound traffic does not pass through the channel: tests submit
//! [`crate::engine::Event`]s directly through an
//! [`crate::engine::EngineHandle`], exactly as a real transport would.

use tokio::sync::mpsc;

use crate::error::{AskadayError, Result};
use crate::store::UserId;
use crate::transport::{Keyboard, MessageChannel};

/// One outbound item captured by the fake channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A plain message, with the keyboard that accompanied it
    Message {
        /// Recipient
        user: UserId,
        /// Message body
        text: String,
        /// Reply keyboard, when one was offered
        keyboard: Option<Keyboard>,
    },
    /// A reply-requesting question prompt
    ReplyPrompt {
        /// Recipient
        user: UserId,
        /// The question text
        text: String,
    },
    /// A delivered document artifact
    Document {
        /// Recipient
        user: UserId,
        /// Suggested file name
        filename: String,
        /// Raw artifact bytes
        bytes: Vec<u8>,
    },
}

/// In-process fake channel for use in tests
///
/// Implements the full [`MessageChannel`] trait using an in-memory queue,
/// so tests can observe outbound traffic without any real transport.
pub struct FakeChannel {
    outbound_tx: mpsc::UnboundedSender<Outbound>,
}

/// Test-side observer for a [`FakeChannel`]
pub struct FakeChannelHandle {
    /// Drain of everything the engine sent, in send order
    pub outbound_rx: mpsc::UnboundedReceiver<Outbound>,
}

impl FakeChannel {
    /// Create a new `(FakeChannel, FakeChannelHandle)` pair
    pub fn new() -> (Self, FakeChannelHandle) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        (Self { outbound_tx }, FakeChannelHandle { outbound_rx })
    }

    fn push(&self, item: Outbound) -> Result<()> {
        self.outbound_tx
            .send(item)
            .map_err(|_| AskadayError::Delivery("fake channel receiver dropped".into()))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MessageChannel for FakeChannel {
    async fn send(&self, user: UserId, text: &str, keyboard: Option<&Keyboard>) -> Result<()> {
        self.push(Outbound::Message {
            user,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        })
    }

    async fn send_reply_prompt(&self, user: UserId, text: &str) -> Result<()> {
        self.push(Outbound::ReplyPrompt {
            user,
            text: text.to_string(),
        })
    }

    async fn send_document(&self, user: UserId, filename: &str, bytes: Vec<u8>) -> Result<()> {
        self.push(Outbound::Document {
            user,
            filename: filename.to_string(),
            bytes,
        })
    }
}

impl FakeChannelHandle {
    /// Drain every item currently queued, without waiting
    pub fn drain(&mut self) -> Vec<Outbound> {
        let mut items = Vec::new();
        while let Ok(item) = self.outbound_rx.try_recv() {
            items.push(item);
        }
        items
    }
}
