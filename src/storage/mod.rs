/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving habits and completion events.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

use crate::analytics;
use crate::domain::{Habit, HabitId, HabitSummary, Period, UserId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Invalid completion count: {0} (must be at least 1)")]
    InvalidCount(u32),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Storage task failed: {0}")]
    Task(String),
}

/// Trait defining the storage interface for habits
///
/// All operations are async: implementations may block on disk I/O and must
/// not stall other users' dialogs while doing so. Every write is atomic per
/// call.
#[async_trait]
pub trait HabitStorage: Send + Sync {
    /// Insert a new habit and return its storage-assigned ID
    ///
    /// Duplicate names are allowed.
    async fn create_habit(&self, owner_id: UserId, name: &str) -> Result<HabitId, StorageError>;

    /// List all habits owned by a user, in creation order
    async fn list_habits(&self, owner_id: UserId) -> Result<Vec<Habit>, StorageError>;

    /// Delete a habit and all of its completions
    ///
    /// Only deletes when the habit belongs to `owner_id`. Returns false (not
    /// an error) when nothing matched.
    async fn delete_habit(&self, habit_id: HabitId, owner_id: UserId) -> Result<bool, StorageError>;

    /// Append one completion event stamped with the current time
    ///
    /// Fails with `HabitNotFound` if the habit no longer exists.
    async fn record_completion(&self, habit_id: HabitId, count: u32) -> Result<(), StorageError>;

    /// Aggregate a habit's completion history
    ///
    /// Returns None if the habit is missing or belongs to someone else.
    async fn get_habit_summary(
        &self,
        habit_id: HabitId,
        owner_id: UserId,
    ) -> Result<Option<HabitSummary>, StorageError>;

    /// Sum of completion counts with `start <= completed_at < end`
    async fn count_completions_between(
        &self,
        habit_id: HabitId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<u64, StorageError>;

    /// Timestamps of every completion for a habit, newest first
    async fn completion_times(&self, habit_id: HabitId) -> Result<Vec<DateTime<Utc>>, StorageError>;

    /// Sum of completion counts inside the current window for `period`
    ///
    /// Returns 0 when there are none (including for deleted habits).
    async fn get_statistics(&self, habit_id: HabitId, period: Period) -> Result<u64, StorageError> {
        let today = Utc::now().date_naive();
        let (start, end) = analytics::date_range(period, today);
        self.count_completions_between(habit_id, start, end).await
    }
}
