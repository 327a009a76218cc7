/// Delete-habit flow: choose a habit, then confirm

use tracing::info;

use crate::dialog::input::{self, Confirmation};
use crate::dialog::{keyboards, lost_draft, no_habits, stale_habit, DialogError, Step, Transition};
use crate::display::format_date;
use crate::domain::UserId;
use crate::gateway::Reply;
use crate::session::{DeleteStep, DialogState, Session};
use crate::storage::HabitStorage;

pub(crate) async fn start<S: HabitStorage + ?Sized>(
    storage: &S,
    user_id: UserId,
) -> Result<Transition, DialogError> {
    let habits = storage.list_habits(user_id).await?;
    if habits.is_empty() {
        return Ok(Transition::Finish(no_habits()));
    }

    let reply = Reply::new("Choose a habit to delete:").with_options(keyboards::habit_choices(&habits));
    let session = Session::new(user_id, DialogState::Delete(DeleteStep::AwaitingHabitChoice))
        .with_choices(habits);

    Ok(Transition::Continue(session, reply))
}

pub(crate) async fn step<S: HabitStorage + ?Sized>(
    storage: &S,
    session: &mut Session,
    step: DeleteStep,
    input: &str,
) -> Result<Step, DialogError> {
    match step {
        DeleteStep::AwaitingHabitChoice => {
            let habit = input::match_choice(&session.choices, input)
                .cloned()
                .ok_or_else(|| {
                    DialogError::NotFound("Habit not found. Please choose one from the list:".to_string())
                })?;

            let Some(summary) = storage.get_habit_summary(habit.id, session.user_id).await? else {
                return Ok(stale_habit());
            };

            let reply = Reply::new(format!(
                "Confirm deleting the habit:\n\n\
                 Name: {}\n\
                 Completed: {} time(s)\n\
                 Created: {}\n\n\
                 This cannot be undone. Delete this habit?",
                summary.name,
                summary.total_completions,
                format_date(Some(summary.created_at)),
            ))
            .with_options(keyboards::confirm());

            session.draft.habit_id = Some(habit.id);
            session.draft.habit_name = Some(habit.name);
            session.state = DialogState::Delete(DeleteStep::AwaitingConfirmation);
            Ok(Step::Continue(reply))
        }
        DeleteStep::AwaitingConfirmation => match Confirmation::parse(input) {
            None => Err(DialogError::Validation(
                "Please answer Yes to delete the habit or No to cancel.".to_string(),
            )),
            Some(Confirmation::No) => Ok(Step::Finish(Reply::new("Deletion cancelled."))),
            Some(Confirmation::Yes) => {
                let (Some(habit_id), Some(name)) = (session.draft.habit_id, session.draft.habit_name.as_deref()) else {
                    return Ok(lost_draft());
                };

                if !storage.delete_habit(habit_id, session.user_id).await? {
                    return Ok(stale_habit());
                }
                info!("User {} deleted habit {} ({})", session.user_id, habit_id, name);

                Ok(Step::Finish(Reply::new(format!(
                    "Habit \"{}\" and all of its history were deleted.",
                    name
                ))))
            }
        },
    }
}
