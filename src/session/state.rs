//! Dialog states and the per-user session record.

use std::fmt;

use tokio::time::Instant;

use crate::domain::{Habit, HabitId, UserId};

/// Steps of the create-habit flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStep {
    AwaitingName,
    AwaitingConfirmation,
}

/// Steps of the delete-habit flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStep {
    AwaitingHabitChoice,
    AwaitingConfirmation,
}

/// Steps of the complete-habit flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteStep {
    AwaitingHabitChoice,
    AwaitingCount,
    AwaitingConfirmation,
}

/// Steps of the statistics flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsStep {
    AwaitingHabitChoice,
    AwaitingPeriod,
}

/// Where a user currently is inside a flow
///
/// Each flow has its own closed set of steps, so a user is in at most one
/// flow at a time. Idle is the absence of a session, not a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Create(CreateStep),
    Delete(DeleteStep),
    Complete(CompleteStep),
    Stats(StatsStep),
}

impl DialogState {
    /// Name of the flow this state belongs to
    pub fn flow(&self) -> &'static str {
        match self {
            DialogState::Create(_) => "create",
            DialogState::Delete(_) => "delete",
            DialogState::Complete(_) => "complete",
            DialogState::Stats(_) => "stats",
        }
    }

    fn step(&self) -> &'static str {
        match self {
            DialogState::Create(CreateStep::AwaitingName) => "awaiting_name",
            DialogState::Delete(DeleteStep::AwaitingHabitChoice)
            | DialogState::Complete(CompleteStep::AwaitingHabitChoice)
            | DialogState::Stats(StatsStep::AwaitingHabitChoice) => "awaiting_habit_choice",
            DialogState::Complete(CompleteStep::AwaitingCount) => "awaiting_count",
            DialogState::Stats(StatsStep::AwaitingPeriod) => "awaiting_period",
            DialogState::Create(CreateStep::AwaitingConfirmation)
            | DialogState::Delete(DeleteStep::AwaitingConfirmation)
            | DialogState::Complete(CompleteStep::AwaitingConfirmation) => "awaiting_confirmation",
        }
    }
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.flow(), self.step())
    }
}

/// Input accumulated across the steps of one flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub habit_name: Option<String>,
    pub habit_id: Option<HabitId>,
    pub count: Option<u32>,
}

/// One user's in-progress dialog
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    pub state: DialogState,
    pub draft: Draft,
    /// The user's habits as fetched when the flow started
    pub choices: Vec<Habit>,
    pub(crate) last_active: Instant,
}

impl Session {
    /// Start a session in the given state with an empty draft
    pub fn new(user_id: UserId, state: DialogState) -> Self {
        Self {
            user_id,
            state,
            draft: Draft::default(),
            choices: Vec::new(),
            last_active: Instant::now(),
        }
    }

    /// Attach the habit list a selection step will match against
    pub fn with_choices(mut self, choices: Vec<Habit>) -> Self {
        self.choices = choices;
        self
    }

    /// Time since this session last advanced
    pub fn idle_for(&self) -> std::time::Duration {
        self.last_active.elapsed()
    }
}
