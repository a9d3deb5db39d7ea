//! Interactive serve mode handler
//!
//! Wires the store, scheduler, engine, and console channel together,
//! rehydrates the schedule from persisted tasks, and runs a readline loop
//! that submits console input into the engine as the configured user.
//!
//! Reminders fire into the same event channel the readline loop submits
//! to, so scheduled prompts interleave with the foreground dialogue
//! exactly as they would over a real chat transport.

use std::sync::Arc;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

use crate::config::Config;
use crate::engine::session::{menu_keyboard, MSG_GREETING};
use crate::engine::{engine_channel, Engine};
use crate::error::Result;
use crate::scheduler::{Scheduler, SystemClock};
use crate::store::UserId;
use crate::transport::console::ConsoleChannel;
use crate::transport::MessageChannel;

/// Run the agent with an interactive console session
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `user_override` - Optional user id replacing the configured one
pub async fn run_serve(config: Config, user_override: Option<u64>) -> Result<()> {
    let user = UserId(user_override.unwrap_or(config.chat.console_user));
    let store = Arc::new(super::open_store(&config)?);

    let (handle, events) = engine_channel();
    let scheduler = Arc::new(Scheduler::with_utc_offset_hours(
        handle.clone(),
        Arc::new(SystemClock),
        config.schedule.utc_offset_hours,
    ));
    let rehydrated = scheduler.rehydrate(&store)?;
    info!(timers = rehydrated, %user, "Serving console session");

    let channel: Arc<dyn MessageChannel> = Arc::new(ConsoleChannel::new());
    channel.send(user, MSG_GREETING, Some(&menu_keyboard())).await?;

    let engine = Engine::new(
        Arc::clone(&store),
        Arc::clone(&scheduler),
        Arc::clone(&channel),
        events,
    );
    let engine_task = tokio::spawn(engine.run());

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                rl.add_history_entry(trimmed)?;
                handle.inbound(user, trimmed)?;
                // Give the worker a chance to print before the next prompt.
                tokio::task::yield_now().await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    println!("{}", "Stopping.".dimmed());
    engine_task.abort();
    Ok(())
}
