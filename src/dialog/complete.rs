/// Complete-habit flow: choose a habit, enter a count, confirm

use tracing::{info, warn};

use crate::dialog::input::{self, Confirmation};
use crate::dialog::{keyboards, lost_draft, no_habits, stale_habit, DialogError, Step, Transition};
use crate::display::format_date;
use crate::domain::{Completion, UserId, MAX_BATCH_COUNT};
use crate::gateway::Reply;
use crate::session::{CompleteStep, DialogState, Session};
use crate::storage::{HabitStorage, StorageError};

pub(crate) async fn start<S: HabitStorage + ?Sized>(
    storage: &S,
    user_id: UserId,
) -> Result<Transition, DialogError> {
    let habits = storage.list_habits(user_id).await?;
    if habits.is_empty() {
        return Ok(Transition::Finish(no_habits()));
    }

    let reply = Reply::new("Choose a habit to mark as done:")
        .with_options(keyboards::habit_choices(&habits));
    let session = Session::new(user_id, DialogState::Complete(CompleteStep::AwaitingHabitChoice))
        .with_choices(habits);

    Ok(Transition::Continue(session, reply))
}

pub(crate) async fn step<S: HabitStorage + ?Sized>(
    storage: &S,
    session: &mut Session,
    step: CompleteStep,
    input: &str,
) -> Result<Step, DialogError> {
    match step {
        CompleteStep::AwaitingHabitChoice => {
            let habit = input::match_choice(&session.choices, input)
                .cloned()
                .ok_or_else(|| {
                    DialogError::NotFound("Habit not found. Please choose one from the list:".to_string())
                })?;

            let reply = Reply::new(format!(
                "Selected habit: {}\n\nHow many times did you do it? Enter a number from 1 to {}:",
                habit.name, MAX_BATCH_COUNT
            ))
            .with_options(keyboards::cancel_only());

            session.draft.habit_id = Some(habit.id);
            session.draft.habit_name = Some(habit.name);
            session.state = DialogState::Complete(CompleteStep::AwaitingCount);
            Ok(Step::Continue(reply))
        }
        CompleteStep::AwaitingCount => {
            let count = Completion::parse_count(input)?;

            let reply = Reply::new(format!(
                "Confirm completion:\n\nHabit: {}\nRepetitions: {}\n\nRecord it?",
                session.draft.habit_name.as_deref().unwrap_or_default(),
                count
            ))
            .with_options(keyboards::confirm());

            session.draft.count = Some(count);
            session.state = DialogState::Complete(CompleteStep::AwaitingConfirmation);
            Ok(Step::Continue(reply))
        }
        CompleteStep::AwaitingConfirmation => match Confirmation::parse(input) {
            None => Err(DialogError::Validation(
                "Please answer Yes to record the completion or No to cancel.".to_string(),
            )),
            Some(Confirmation::No) => Ok(Step::Finish(Reply::new("Completion not recorded."))),
            Some(Confirmation::Yes) => {
                let (Some(habit_id), Some(count)) = (session.draft.habit_id, session.draft.count) else {
                    return Ok(lost_draft());
                };

                match storage.record_completion(habit_id, count).await {
                    Ok(()) => {}
                    Err(StorageError::HabitNotFound { .. }) => {
                        warn!("Habit {} disappeared before completion was recorded", habit_id);
                        return Ok(stale_habit());
                    }
                    Err(e) => return Err(e.into()),
                }
                info!("User {} recorded {} completion(s) of habit {}", session.user_id, count, habit_id);

                let name = session.draft.habit_name.as_deref().unwrap_or_default();
                // The completion is already stored; a failed read only shortens the reply
                let text = match storage.get_habit_summary(habit_id, session.user_id).await {
                    Ok(Some(summary)) => format!(
                        "Habit \"{}\" marked done {} time(s)!\n\n\
                         Total completions: {}\n\
                         Last completed: {}",
                        name,
                        count,
                        summary.total_completions,
                        format_date(summary.last_completed_at),
                    ),
                    Ok(None) => format!("Habit \"{}\" marked done {} time(s)!", name, count),
                    Err(e) => {
                        warn!("Failed to load summary for habit {} after recording: {}", habit_id, e);
                        format!("Habit \"{}\" marked done {} time(s)!", name, count)
                    }
                };

                Ok(Step::Finish(Reply::new(text)))
            }
        },
    }
}
