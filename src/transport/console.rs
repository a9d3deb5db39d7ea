//! Local console implementation of the messaging channel
//!
//! Renders outbound messages to the terminal for the `serve` command. The
//! inbound side is a rustyline loop owned by the command handler, which
//! submits text straight into the engine's event channel; this type only
//! covers delivery.
//!
//! Reply keyboards are rendered as a dimmed option line, reply prompts in
//! a distinct color so a scheduled question is visually separate from the
//! menu dialogue. Documents are written next to the process and announced.

use std::path::PathBuf;

use colored::Colorize;

use crate::error::{AskadayError, Result};
use crate::store::UserId;
use crate::transport::{Keyboard, MessageChannel};

/// Terminal-backed message channel
pub struct ConsoleChannel {
    docs_dir: PathBuf,
}

impl ConsoleChannel {
    /// Channel writing documents to the current directory
    pub fn new() -> Self {
        Self {
            docs_dir: PathBuf::from("."),
        }
    }

    /// Channel writing documents to a specific directory
    pub fn with_docs_dir(docs_dir: impl Into<PathBuf>) -> Self {
        Self {
            docs_dir: docs_dir.into(),
        }
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MessageChannel for ConsoleChannel {
    async fn send(&self, _user: UserId, text: &str, keyboard: Option<&Keyboard>) -> Result<()> {
        println!("{}", text.cyan());
        if let Some(keyboard) = keyboard {
            let options = keyboard.labels().collect::<Vec<_>>().join(" | ");
            println!("{}", format!("[{}]", options).dimmed());
        }
        Ok(())
    }

    async fn send_reply_prompt(&self, _user: UserId, text: &str) -> Result<()> {
        println!("{}", format!("(reply) {}", text).yellow().bold());
        Ok(())
    }

    async fn send_document(&self, _user: UserId, filename: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.docs_dir.join(filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AskadayError::Delivery(format!("Could not write {}: {}", path.display(), e)))?;
        println!("{}", format!("Saved {}", path.display()).green());
        Ok(())
    }
}
