/// Create-habit flow: name, then confirmation

use tracing::info;

use crate::dialog::input::Confirmation;
use crate::dialog::{keyboards, lost_draft, DialogError, Step, Transition};
use crate::domain::{Habit, UserId};
use crate::gateway::Reply;
use crate::session::{CreateStep, DialogState, Session};
use crate::storage::HabitStorage;

pub(crate) fn start(user_id: UserId) -> Transition {
    let session = Session::new(user_id, DialogState::Create(CreateStep::AwaitingName));
    let reply = Reply::new(
        "Enter a name for your new habit:\n\n\
         For example: Read for 30 minutes, Morning exercises, Drink 2 liters of water",
    )
    .with_options(keyboards::cancel_only());

    Transition::Continue(session, reply)
}

pub(crate) async fn step<S: HabitStorage + ?Sized>(
    storage: &S,
    session: &mut Session,
    step: CreateStep,
    input: &str,
) -> Result<Step, DialogError> {
    match step {
        CreateStep::AwaitingName => {
            let name = Habit::validate_name(input)?;

            let reply = Reply::new(format!(
                "Confirm the new habit:\n\nName: {}\n\nCreate this habit?",
                name
            ))
            .with_options(keyboards::confirm());

            session.draft.habit_name = Some(name);
            session.state = DialogState::Create(CreateStep::AwaitingConfirmation);
            Ok(Step::Continue(reply))
        }
        CreateStep::AwaitingConfirmation => match Confirmation::parse(input) {
            None => Err(DialogError::Validation(
                "Please answer Yes to create the habit or No to cancel.".to_string(),
            )),
            Some(Confirmation::No) => Ok(Step::Finish(Reply::new("Habit creation cancelled."))),
            Some(Confirmation::Yes) => {
                let Some(name) = session.draft.habit_name.as_deref() else {
                    return Ok(lost_draft());
                };

                let habit_id = storage.create_habit(session.user_id, name).await?;
                info!("User {} created habit {} ({})", session.user_id, habit_id, name);

                Ok(Step::Finish(Reply::new(format!(
                    "Habit \"{}\" created!\n\nMark it done any time with Complete habit.",
                    name
                ))))
            }
        },
    }
}
