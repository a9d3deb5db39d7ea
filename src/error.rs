//! Error types for Askaday
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Askaday operations
///
/// This enum encompasses all possible errors that can occur during
/// conversation handling, scheduling, persistence, and export.
#[derive(Error, Debug)]
pub enum AskadayError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input that fails local validation (time grammar, delete index)
    ///
    /// Always recovered by re-prompting in the same conversation state;
    /// never surfaced as a crash.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced task or index does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Session store errors (database operations)
    ///
    /// Not locally recoverable: the in-progress transition must not be
    /// considered committed when one of these is returned.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Outbound message channel failures during a scheduled fire
    ///
    /// Logged and retried implicitly on the next day's fire.
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Askaday operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
