//! Export command handler

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;

use crate::config::Config;
use crate::error::Result;
use crate::export::{suggested_filename, ExportAdapter};
use crate::store::UserId;

/// Write a user's answers to a CSV file
///
/// With no explicit output path the artifact lands in the current
/// directory as `results_<user>.csv`. Zero answers still produce a valid
/// header-only file.
pub fn run_export(config: &Config, user: u64, output: Option<PathBuf>) -> Result<()> {
    let user = UserId(user);
    let store = Arc::new(super::open_store(config)?);
    let adapter = ExportAdapter::new(store);

    let bytes = adapter.export(user)?;
    let rows = bytes.iter().filter(|b| **b == b'\n').count().saturating_sub(1);
    let path = output.unwrap_or_else(|| PathBuf::from(suggested_filename(user)));
    std::fs::write(&path, bytes)?;

    println!(
        "{}",
        format!("Wrote {} answers to {}", rows, path.display()).green()
    );
    Ok(())
}
