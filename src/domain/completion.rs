/// Completion events for tracking habit progress
///
/// This module defines the Completion struct that represents the user
/// performing a habit some number of times at a point in time.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{HabitId, DomainError};

/// Largest batch a user may log in a single dialog step
pub const MAX_BATCH_COUNT: u32 = 100;

/// A record of completing a habit one or more times
///
/// Completions are append-only. They are removed only when their habit is
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Storage row identifier
    pub id: i64,
    /// Which habit this completion is for
    pub habit_id: HabitId,
    /// Number of repetitions recorded in this event (always >= 1)
    pub count: u32,
    /// When this completion was recorded
    pub completed_at: DateTime<Utc>,
}

impl Completion {
    /// Parse a user-typed repetition count
    ///
    /// Accepts integers from 1 to `MAX_BATCH_COUNT`. Anything else is a
    /// validation failure with a message suitable for re-prompting.
    pub fn parse_count(input: &str) -> Result<u32, DomainError> {
        let value: i64 = input.trim().parse().map_err(|_| {
            DomainError::InvalidCount(
                "Please enter a whole number (for example: 1, 2, 5)".to_string()
            )
        })?;

        if value <= 0 {
            return Err(DomainError::InvalidCount(
                "The number of repetitions must be positive".to_string()
            ));
        }

        if value > MAX_BATCH_COUNT as i64 {
            return Err(DomainError::InvalidCount(
                format!("The number of repetitions cannot exceed {}", MAX_BATCH_COUNT)
            ));
        }

        Ok(value as u32)
    }
}
