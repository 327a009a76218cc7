/// Main entry point for the habit tracker bot
///
/// This file sets up logging, reads configuration, and starts the bot on the
/// console gateway. Replies go to stdout as JSON lines, so logs go to stderr.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use habit_tracker_bot::config::Settings;
use habit_tracker_bot::{ConsoleGateway, HabitTrackerBot, UserId};

/// How often idle session cells are swept
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::parse();

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter())
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    info!("Starting habit tracker bot ({})", settings.environment);
    info!("Update transport: {}", settings.transport());
    if settings.bot_token.is_none() {
        info!("No bot token configured; serving the console gateway only");
    }

    let db_path = settings.database_path()?;
    info!("Using database at: {}", db_path.display());

    let bot = Arc::new(HabitTrackerBot::new(db_path, settings.session_timeout()).await?);

    let sweeper = {
        let bot = Arc::clone(&bot);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(PURGE_INTERVAL);
            loop {
                ticker.tick().await;
                bot.engine().purge_sessions();
            }
        })
    };

    let mut gateway = ConsoleGateway::stdio();
    if let Some(user) = settings.console_user {
        gateway = gateway.with_default_user(UserId(user));
    }

    let result = bot.run(&mut gateway).await;
    sweeper.abort();
    result?;

    info!("Habit tracker bot shutdown complete");
    Ok(())
}
