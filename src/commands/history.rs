//! History command handler

use std::sync::Arc;

use colored::Colorize;
use prettytable::{format, Table};

use crate::config::Config;
use crate::error::Result;
use crate::store::UserId;

/// Show a user's recorded answers as a terminal table
pub fn run_history(config: &Config, user: u64, limit: Option<usize>) -> Result<()> {
    let store = Arc::new(super::open_store(config)?);
    let answers = store.list_answers(UserId(user))?;

    if answers.is_empty() {
        println!("{}", "No answers recorded yet.".yellow());
        return Ok(());
    }

    let shown = limit.unwrap_or(answers.len()).min(answers.len());
    let skipped = answers.len() - shown;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "#".bold(),
        "Recorded".bold(),
        "Question".bold(),
        "Answer".bold()
    ]);

    for (position, answer) in answers.iter().enumerate().skip(skipped) {
        let recorded = answer.timestamp.format("%Y-%m-%d %H:%M").to_string();
        table.add_row(prettytable::row![
            position + 1,
            recorded.cyan(),
            &answer.question,
            &answer.text
        ]);
    }

    println!("\nAnswer history for user {}:", user);
    table.printstd();
    if skipped > 0 {
        println!("({} earlier answers hidden)", skipped);
    }
    println!();
    Ok(())
}
