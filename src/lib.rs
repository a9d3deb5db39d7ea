//! Askaday - conversational daily reminder agent library
//!
//! This library provides the core functionality for the Askaday agent:
//! a per-user conversation state machine, a daily reminder scheduler, a
//! durable session store, and an answer export adapter.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `engine`: Conversation state machine with per-user worker tasks
//! - `scheduler`: Daily timers, rehydrated from the store on startup
//! - `store`: Durable per-user sessions, tasks, and answers over sled
//! - `export`: Answer history rendered to a CSV byte stream
//! - `transport`: Messaging channel trait plus console and fake channels
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use askaday::{Config, TaskStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml")?;
//!     config.validate()?;
//!
//!     let store = TaskStore::open_default()?;
//!     let _tasks = store.list_tasks(askaday::store::UserId(1))?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod scheduler;
pub mod store;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use engine::{engine_channel, Engine, EngineHandle, Event};
pub use error::{AskadayError, Result};
pub use export::ExportAdapter;
pub use scheduler::{Clock, Scheduler, SystemClock};
pub use store::TaskStore;
pub use transport::{Keyboard, MessageChannel};
