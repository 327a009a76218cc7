/// Public library interface for the habit tracker chat bot
///
/// This module exports the bot facade and the public types that the binary,
/// gateways and tests build on.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

// Internal modules
pub mod analytics;
pub mod config;
pub mod dialog;
pub mod display;
pub mod domain;
pub mod gateway;
pub mod session;
pub mod storage;

// Re-export public modules and types
pub use analytics::{current_streak, date_range, StatsReport};
pub use dialog::{DialogEngine, DialogError};
pub use domain::*;
pub use gateway::{ConsoleGateway, Inbound, MessagingGateway, Reply, ReplyOption};
pub use session::{DialogState, SessionStore};
pub use storage::{HabitStorage, SqliteStorage, StorageError};

/// Errors that can occur while running the bot
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Database error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Habit tracker bot backed by a SQLite database
///
/// Owns the storage and the dialog engine. Gateways feed it messages through
/// `handle` or hand it the whole loop through `run`.
pub struct HabitTrackerBot {
    storage: Arc<SqliteStorage>,
    engine: DialogEngine<SqliteStorage>,
}

impl HabitTrackerBot {
    /// Create a bot with the specified database path
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(db_path: PathBuf, idle_timeout: Option<Duration>) -> Result<Self, BotError> {
        tracing::info!("Initializing habit tracker bot with database: {:?}", db_path);
        let storage = SqliteStorage::new(db_path)?;
        Ok(Self::with_storage(storage, idle_timeout))
    }

    /// Create a bot over an already opened storage
    pub fn with_storage(storage: SqliteStorage, idle_timeout: Option<Duration>) -> Self {
        let storage = Arc::new(storage);
        let engine = DialogEngine::new(Arc::clone(&storage), SessionStore::new(idle_timeout));
        Self { storage, engine }
    }

    /// Process one message and return the reply
    pub async fn handle(&self, inbound: &Inbound) -> Reply {
        self.engine.handle(inbound).await
    }

    /// Serve a gateway until it closes
    ///
    /// Messages are handled in arrival order. A failed delivery ends the
    /// loop with the error.
    pub async fn run<G: MessagingGateway>(&self, gateway: &mut G) -> Result<(), BotError> {
        tracing::info!("Bot started, waiting for messages...");

        let mut handled: u64 = 0;
        while let Some(inbound) = gateway.recv().await? {
            let reply = self.handle(&inbound).await;
            gateway.send(inbound.user_id, &reply).await?;
            handled += 1;
        }

        tracing::info!("Gateway closed after {} message(s)", handled);
        Ok(())
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Get a reference to the dialog engine
    pub fn engine(&self) -> &DialogEngine<SqliteStorage> {
        &self.engine
    }
}
