/// Domain module containing core business data types
///
/// This module defines the core entities (Habit, Completion, HabitSummary) and
/// their validation rules. These are fixed-shape records shared by the storage
/// layer, the statistics functions and the dialog flows.

pub mod habit;
pub mod completion;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use completion::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid completion count: {0}")]
    InvalidCount(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
}
