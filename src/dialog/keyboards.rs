/// Option sets attached to replies

use crate::dialog::input::MenuAction;
use crate::domain::{Habit, Period};
use crate::gateway::ReplyOption;
use crate::session::{CompleteStep, CreateStep, DeleteStep, DialogState, Session, StatsStep};

pub const CANCEL: &str = "Cancel";
pub const YES: &str = "Yes";
pub const NO: &str = "No";

pub fn main_menu() -> Vec<ReplyOption> {
    MenuAction::ALL
        .iter()
        .map(|action| ReplyOption::label(action.label()))
        .collect()
}

/// Keyboard for free-text steps
pub fn cancel_only() -> Vec<ReplyOption> {
    vec![ReplyOption::label(CANCEL)]
}

pub fn confirm() -> Vec<ReplyOption> {
    vec![
        ReplyOption::label(YES),
        ReplyOption::label(NO),
        ReplyOption::label(CANCEL),
    ]
}

/// One option per habit, each carrying its `habit:<id>` token
pub fn habit_choices(habits: &[Habit]) -> Vec<ReplyOption> {
    habits
        .iter()
        .map(|habit| ReplyOption::with_id(habit_label(habit, habits), habit.id.token()))
        .chain(std::iter::once(ReplyOption::label(CANCEL)))
        .collect()
}

pub fn periods() -> Vec<ReplyOption> {
    Period::ALL
        .iter()
        .map(|period| ReplyOption::label(period.label()))
        .chain(std::iter::once(ReplyOption::label(CANCEL)))
        .collect()
}

/// Label shown for a habit within a list
///
/// Names shared by more than one habit get their id appended, so each
/// option in a list is distinct.
pub fn habit_label(habit: &Habit, all: &[Habit]) -> String {
    let shared = all.iter().filter(|other| other.name == habit.name).count() > 1;
    if shared {
        format!("{} (#{})", habit.name, habit.id)
    } else {
        habit.name.clone()
    }
}

/// Options to repeat when re-prompting in the session's current step
pub fn for_state(session: &Session) -> Vec<ReplyOption> {
    match session.state {
        DialogState::Create(CreateStep::AwaitingName)
        | DialogState::Complete(CompleteStep::AwaitingCount) => cancel_only(),
        DialogState::Create(CreateStep::AwaitingConfirmation)
        | DialogState::Delete(DeleteStep::AwaitingConfirmation)
        | DialogState::Complete(CompleteStep::AwaitingConfirmation) => confirm(),
        DialogState::Delete(DeleteStep::AwaitingHabitChoice)
        | DialogState::Complete(CompleteStep::AwaitingHabitChoice)
        | DialogState::Stats(StatsStep::AwaitingHabitChoice) => habit_choices(&session.choices),
        DialogState::Stats(StatsStep::AwaitingPeriod) => periods(),
    }
}
