//! Command-line interface definition for Askaday
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for serving the agent, exporting answers, and
//! browsing answer history.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Askaday - conversational daily reminder agent
///
/// Register recurring questions with a daily time, get asked on schedule,
/// and export the collected answers.
#[derive(Parser, Debug, Clone)]
#[command(name = "askaday")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the session store path (also honored as ASKADAY_STORE)
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Askaday
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the agent with an interactive console session
    Serve {
        /// User id the console session is attributed to
        #[arg(short, long)]
        user: Option<u64>,
    },

    /// Export a user's answers as a CSV file
    Export {
        /// User id to export
        #[arg(short, long)]
        user: u64,

        /// Output path (defaults to results_<user>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show a user's recorded answers as a table
    History {
        /// User id to show
        #[arg(short, long)]
        user: u64,

        /// Show at most this many answers, newest last
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_serve_with_user() {
        let cli = Cli::parse_from(["askaday", "serve", "--user", "7"]);
        assert!(matches!(cli.command, Commands::Serve { user: Some(7) }));
    }

    #[test]
    fn test_cli_parses_export_with_output() {
        let cli = Cli::parse_from(["askaday", "export", "--user", "7", "--output", "out.csv"]);
        match cli.command {
            Commands::Export { user, output } => {
                assert_eq!(user, 7);
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            other => panic!("Expected export command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "askaday",
            "--config",
            "custom.yaml",
            "--storage-path",
            "/tmp/store",
            "history",
            "--user",
            "1",
        ]);
        assert_eq!(cli.config.as_deref(), Some("custom.yaml"));
        assert_eq!(cli.storage_path.as_deref(), Some("/tmp/store"));
        assert!(matches!(
            cli.command,
            Commands::History {
                user: 1,
                limit: None
            }
        ));
    }
}
