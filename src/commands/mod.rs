/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `serve`   — Run the agent with an interactive console session
- `export`  — Write a user's answers to a CSV file
- `history` — Show a user's answers as a terminal table

These handlers are intentionally small and use the library components:
the store, the scheduler, the engine, and the export adapter.
*/

use crate::config::Config;
use crate::error::Result;
use crate::store::TaskStore;

pub mod export;
pub mod history;
pub mod serve;

/// Open the session store honoring the override chain
///
/// Precedence: `ASKADAY_STORE` environment variable (the entrypoint
/// mirrors `--storage-path` into it), then the configured path, then the
/// platform default.
pub(crate) fn open_store(config: &Config) -> Result<TaskStore> {
    if std::env::var("ASKADAY_STORE").is_ok() {
        return TaskStore::open_default();
    }
    match &config.storage.path {
        Some(path) => TaskStore::open(path),
        None => TaskStore::open_default(),
    }
}
