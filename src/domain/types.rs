/// Core types and enums used throughout the domain layer
///
/// This module defines the ID newtypes and the statistics Period that are
/// used by Habit, Completion, the storage layer and the dialog flows.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Prefix of the identifier token carried by habit selection options
const HABIT_TOKEN_PREFIX: &str = "habit:";

/// Unique identifier for a habit
///
/// Assigned by storage on insert. This is a wrapper to provide type safety -
/// you can't accidentally pass a habit ID where a user ID is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HabitId(pub i64);

impl HabitId {
    /// Opaque token embedded in a selection option (e.g. `habit:42`)
    pub fn token(&self) -> String {
        format!("{}{}", HABIT_TOKEN_PREFIX, self.0)
    }

    /// Parse a selection token back into an ID
    ///
    /// Returns None for anything that is not exactly `habit:<integer>`.
    pub fn from_token(token: &str) -> Option<Self> {
        token
            .trim()
            .strip_prefix(HABIT_TOKEN_PREFIX)?
            .parse::<i64>()
            .ok()
            .map(Self)
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a chat user, as delivered by the messaging gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reporting window for completion statistics
///
/// Each period maps to a half-open calendar range computed by
/// `analytics::date_range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The current calendar day
    Today,
    /// Monday through Sunday of the current week
    Week,
    /// The current calendar month
    Month,
    /// The current calendar year
    Year,
}

impl Period {
    /// All periods in display order
    pub const ALL: [Period; 4] = [Period::Today, Period::Week, Period::Month, Period::Year];

    /// Stable lowercase token
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// Button label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Week => "Week",
            Period::Month => "Month",
            Period::Year => "Year",
        }
    }

    /// Phrase used inside report sentences ("completions this week")
    pub fn describe(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "this week",
            Period::Month => "this month",
            Period::Year => "this year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" | "day" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(DomainError::InvalidPeriod(s.trim().to_string())),
        }
    }
}
