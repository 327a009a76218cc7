/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and data conversion.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{Completion, Habit, HabitId, HabitSummary, UserId};
use crate::storage::{migrations, HabitStorage, StorageError};

/// How long a statement waits on a locked database file before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based storage implementation
///
/// The connection is shared behind a mutex and every operation runs on the
/// blocking thread pool, so callers can await storage without holding up
/// the async executor.
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Create a storage instance backed by a private in-memory database
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self, StorageError> {
        // Enable foreign key constraints
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| StorageError::Connection(format!("Failed to set busy timeout: {}", e)))?;

        // Initialize/migrate the database schema
        migrations::initialize_database(&mut conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a database operation on the blocking pool with exclusive access
    async fn run<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StorageError::Connection("Database connection lock poisoned".to_string()))?;
            op(&mut *guard)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }

    /// Append a completion with an explicit timestamp
    ///
    /// Used for importing history. The check that the habit exists and the
    /// insert share one transaction.
    pub async fn record_completion_at(
        &self,
        habit_id: HabitId,
        count: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        if count == 0 {
            return Err(StorageError::InvalidCount(count));
        }

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let exists = tx
                .query_row("SELECT 1 FROM habits WHERE id = ?1", params![habit_id.0], |_| Ok(()))
                .optional()?;
            if exists.is_none() {
                return Err(StorageError::HabitNotFound {
                    habit_id: habit_id.to_string(),
                });
            }

            tx.execute(
                "INSERT INTO completions (habit_id, count, completed_at) VALUES (?1, ?2, ?3)",
                params![habit_id.0, count, encode_timestamp(&completed_at)],
            )?;
            tx.commit()?;

            tracing::debug!("Recorded {} completion(s) for habit {}", count, habit_id);
            Ok(())
        })
        .await
    }

    /// Get every completion event for a habit, newest first
    pub async fn completions_for_habit(&self, habit_id: HabitId) -> Result<Vec<Completion>, StorageError> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, habit_id, count, completed_at
                 FROM completions WHERE habit_id = ?1
                 ORDER BY completed_at DESC, id DESC",
            )?;

            let rows = stmt.query_map(params![habit_id.0], |row| {
                let completed_at_str: String = row.get(3)?;
                Ok(Completion {
                    id: row.get(0)?,
                    habit_id: HabitId(row.get(1)?),
                    count: row.get(2)?,
                    completed_at: decode_timestamp(3, &completed_at_str)?,
                })
            })?;

            let mut completions = Vec::new();
            for completion in rows {
                completions.push(completion?);
            }
            Ok(completions)
        })
        .await
    }
}

/// Fixed-width UTC text, so string order matches time order in SQL
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn encode_naive(ts: &NaiveDateTime) -> String {
    encode_timestamp(&Utc.from_utc_datetime(ts))
}

fn decode_timestamp(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(column, "Invalid datetime".to_string(), rusqlite::types::Type::Text)
        })
}

/// Map a `SELECT id, owner_id, name, created_at` row to a Habit
fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let created_at_str: String = row.get(3)?;
    Ok(Habit::from_existing(
        HabitId(row.get(0)?),
        UserId(row.get(1)?),
        row.get(2)?,
        decode_timestamp(3, &created_at_str)?,
    ))
}

#[async_trait]
impl HabitStorage for SqliteStorage {
    async fn create_habit(&self, owner_id: UserId, name: &str) -> Result<HabitId, StorageError> {
        let name = name.to_string();
        let created_at = encode_timestamp(&Utc::now());

        self.run(move |conn| {
            conn.execute(
                "INSERT INTO habits (owner_id, name, created_at) VALUES (?1, ?2, ?3)",
                params![owner_id.0, name, created_at],
            )?;
            let habit_id = HabitId(conn.last_insert_rowid());

            tracing::debug!("Created habit: {} ({}) for user {}", name, habit_id, owner_id);
            Ok(habit_id)
        })
        .await
    }

    async fn list_habits(&self, owner_id: UserId) -> Result<Vec<Habit>, StorageError> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, owner_id, name, created_at
                 FROM habits WHERE owner_id = ?1
                 ORDER BY id ASC",
            )?;

            let habit_iter = stmt.query_map(params![owner_id.0], habit_from_row)?;

            let mut habits = Vec::new();
            for habit in habit_iter {
                habits.push(habit?);
            }
            Ok(habits)
        })
        .await
    }

    async fn delete_habit(&self, habit_id: HabitId, owner_id: UserId) -> Result<bool, StorageError> {
        self.run(move |conn| {
            let tx = conn.transaction()?;

            // Cascade explicitly; the foreign key enforces the same rule
            tx.execute(
                "DELETE FROM completions WHERE habit_id IN
                    (SELECT id FROM habits WHERE id = ?1 AND owner_id = ?2)",
                params![habit_id.0, owner_id.0],
            )?;
            let rows_affected = tx.execute(
                "DELETE FROM habits WHERE id = ?1 AND owner_id = ?2",
                params![habit_id.0, owner_id.0],
            )?;
            tx.commit()?;

            if rows_affected == 0 {
                tracing::debug!("Delete of habit {} by user {} matched nothing", habit_id, owner_id);
                return Ok(false);
            }

            tracing::debug!("Deleted habit: {} for user {}", habit_id, owner_id);
            Ok(true)
        })
        .await
    }

    async fn record_completion(&self, habit_id: HabitId, count: u32) -> Result<(), StorageError> {
        self.record_completion_at(habit_id, count, Utc::now()).await
    }

    async fn get_habit_summary(
        &self,
        habit_id: HabitId,
        owner_id: UserId,
    ) -> Result<Option<HabitSummary>, StorageError> {
        self.run(move |conn| {
            let summary = conn
                .query_row(
                    "SELECT h.id, h.name, h.created_at,
                            COALESCE(SUM(c.count), 0), MAX(c.completed_at)
                     FROM habits h
                     LEFT JOIN completions c ON c.habit_id = h.id
                     WHERE h.id = ?1 AND h.owner_id = ?2
                     GROUP BY h.id",
                    params![habit_id.0, owner_id.0],
                    |row| {
                        let created_at_str: String = row.get(2)?;
                        let total: i64 = row.get(3)?;
                        let last_completed_str: Option<String> = row.get(4)?;
                        let last_completed_at = match last_completed_str {
                            Some(s) => Some(decode_timestamp(4, &s)?),
                            None => None,
                        };

                        Ok(HabitSummary {
                            habit_id: HabitId(row.get(0)?),
                            name: row.get(1)?,
                            total_completions: total.max(0) as u64,
                            created_at: decode_timestamp(2, &created_at_str)?,
                            last_completed_at,
                        })
                    },
                )
                .optional()?;

            Ok(summary)
        })
        .await
    }

    async fn count_completions_between(
        &self,
        habit_id: HabitId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<u64, StorageError> {
        let start = encode_naive(&start);
        let end = encode_naive(&end);

        self.run(move |conn| {
            let total: i64 = conn.query_row(
                "SELECT COALESCE(SUM(count), 0) FROM completions
                 WHERE habit_id = ?1 AND completed_at >= ?2 AND completed_at < ?3",
                params![habit_id.0, start, end],
                |row| row.get(0),
            )?;
            Ok(total.max(0) as u64)
        })
        .await
    }

    async fn completion_times(&self, habit_id: HabitId) -> Result<Vec<DateTime<Utc>>, StorageError> {
        let completions = self.completions_for_habit(habit_id).await?;
        Ok(completions.into_iter().map(|c| c.completed_at).collect())
    }
}
