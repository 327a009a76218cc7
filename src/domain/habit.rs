/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a user's habit
/// they want to track, the aggregated HabitSummary, and name validation.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{HabitId, UserId, DomainError};

/// Longest habit name accepted, counted in characters after trimming
pub const MAX_NAME_CHARS: usize = 50;

/// A habit represents something the user wants to do regularly
///
/// Each habit belongs to exactly one user. Names need not be unique within a
/// user's list; `(owner_id, id)` is what identifies a habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// The user who owns this habit
    pub owner_id: UserId,
    /// Display name (e.g., "Drink water", "Read for 30min")
    pub name: String,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated and is mainly used
    /// by the storage layer when loading habits from the database.
    pub fn from_existing(
        id: HabitId,
        owner_id: UserId,
        name: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name,
            created_at,
        }
    }

    /// Validate a habit name according to business rules
    ///
    /// Returns the trimmed name on success. Names must be 1 to 50 characters
    /// long once surrounding whitespace is removed.
    pub fn validate_name(name: &str) -> Result<String, DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > MAX_NAME_CHARS {
            return Err(DomainError::InvalidHabitName(
                format!("Habit name cannot be longer than {} characters", MAX_NAME_CHARS)
            ));
        }

        Ok(trimmed.to_string())
    }
}

/// Aggregated view of one habit and its completion history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitSummary {
    pub habit_id: HabitId,
    pub name: String,
    /// Sum of `count` over every completion event
    pub total_completions: u64,
    pub created_at: DateTime<Utc>,
    /// Most recent completion, None if never completed
    pub last_completed_at: Option<DateTime<Utc>>,
}
