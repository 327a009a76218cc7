/// Classification of raw user text
///
/// Everything the engine needs to know about a message before it looks at
/// the session: cancel words, slash commands, menu triggers, yes/no answers
/// and habit selections.

use crate::dialog::keyboards;
use crate::domain::{Habit, HabitId};

const CANCEL_WORDS: &[&str] = &["cancel", "/cancel", "back to main menu"];

const AFFIRMATIVE: &[&str] = &["yes", "y", "да", "1", "true", "ok", "confirm"];
const NEGATIVE: &[&str] = &["no", "n", "нет", "0", "false"];

fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Whether the message abandons the current flow
pub fn is_cancel(input: &str) -> bool {
    CANCEL_WORDS.contains(&normalize(input).as_str())
}

/// Slash commands that do not start a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match normalize(input).as_str() {
            "/start" => Some(Command::Start),
            "/help" => Some(Command::Help),
            _ => None,
        }
    }
}

/// Main menu entries, each starting one flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Create,
    Complete,
    Stats,
    Delete,
}

impl MenuAction {
    pub const ALL: [MenuAction; 4] = [
        MenuAction::Create,
        MenuAction::Complete,
        MenuAction::Stats,
        MenuAction::Delete,
    ];

    /// Button text shown in the main menu
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Create => "Create habit",
            MenuAction::Complete => "Complete habit",
            MenuAction::Stats => "Statistics",
            MenuAction::Delete => "Delete habit",
        }
    }

    fn command(&self) -> &'static str {
        match self {
            MenuAction::Create => "/create",
            MenuAction::Complete => "/complete",
            MenuAction::Stats => "/stats",
            MenuAction::Delete => "/delete",
        }
    }

    /// Match a menu label or its slash-command shortcut, ignoring case
    pub fn parse(input: &str) -> Option<Self> {
        let input = normalize(input);
        Self::ALL
            .into_iter()
            .find(|action| input == action.label().to_lowercase() || input == action.command())
    }
}

/// Answer to a yes/no question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
}

impl Confirmation {
    /// Look the answer up in the fixed word tables
    ///
    /// Returns None for anything that is in neither table.
    pub fn parse(input: &str) -> Option<Self> {
        let input = normalize(input);
        if AFFIRMATIVE.contains(&input.as_str()) {
            Some(Confirmation::Yes)
        } else if NEGATIVE.contains(&input.as_str()) {
            Some(Confirmation::No)
        } else {
            None
        }
    }
}

/// Find the habit a selection message refers to
///
/// Tries the option label first, then an identifier token, then the exact
/// habit name. With duplicate names the name match picks the first habit.
pub fn match_choice<'a>(choices: &'a [Habit], input: &str) -> Option<&'a Habit> {
    let input = input.trim();

    choices
        .iter()
        .find(|habit| keyboards::habit_label(habit, choices) == input)
        .or_else(|| {
            let id = HabitId::from_token(input)?;
            choices.iter().find(|habit| habit.id == id)
        })
        .or_else(|| choices.iter().find(|habit| habit.name == input))
}
