//! Askaday - conversational daily reminder agent
//!
#![doc = "Askaday - conversational daily reminder agent"]
#![doc = "Main entry point for the Askaday application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use askaday::cli::{Cli, Commands};
use askaday::commands;
use askaday::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // If the user supplied a storage path on the CLI, mirror it into
    // ASKADAY_STORE so the store initializer can pick it up. This keeps
    // callers unchanged while allowing `TaskStore::open_default()` to
    // honor an override.
    if let Some(store_path) = &cli.storage_path {
        std::env::set_var("ASKADAY_STORE", store_path);
        tracing::info!("Using store override from CLI: {}", store_path);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Serve { user } => {
            tracing::info!("Starting interactive serve mode");
            if let Some(u) = user {
                tracing::debug!("Using console user override: {}", u);
            }
            commands::serve::run_serve(config, user).await?;
            Ok(())
        }
        Commands::Export { user, output } => {
            tracing::info!("Starting answer export for user {}", user);
            commands::export::run_export(&config, user, output)?;
            Ok(())
        }
        Commands::History { user, limit } => {
            tracing::info!("Starting history listing for user {}", user);
            commands::history::run_history(&config, user, limit)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("askaday=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
