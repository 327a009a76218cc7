/// Statistics flow: choose a habit, then a period

use chrono::{Duration, Utc};
use tracing::debug;

use crate::analytics::StatsReport;
use crate::dialog::input;
use crate::dialog::{keyboards, lost_draft, no_habits, stale_habit, DialogError, Step, Transition};
use crate::display::{format_date, format_day};
use crate::domain::{Period, UserId};
use crate::gateway::Reply;
use crate::session::{DialogState, Session, StatsStep};
use crate::storage::HabitStorage;

pub(crate) async fn start<S: HabitStorage + ?Sized>(
    storage: &S,
    user_id: UserId,
) -> Result<Transition, DialogError> {
    let habits = storage.list_habits(user_id).await?;
    if habits.is_empty() {
        return Ok(Transition::Finish(no_habits()));
    }

    let reply = Reply::new("Choose a habit to see its statistics:")
        .with_options(keyboards::habit_choices(&habits));
    let session = Session::new(user_id, DialogState::Stats(StatsStep::AwaitingHabitChoice))
        .with_choices(habits);

    Ok(Transition::Continue(session, reply))
}

pub(crate) async fn step<S: HabitStorage + ?Sized>(
    storage: &S,
    session: &mut Session,
    step: StatsStep,
    input: &str,
) -> Result<Step, DialogError> {
    match step {
        StatsStep::AwaitingHabitChoice => {
            let habit = input::match_choice(&session.choices, input)
                .cloned()
                .ok_or_else(|| {
                    DialogError::NotFound("Habit not found. Please choose one from the list:".to_string())
                })?;

            let reply = Reply::new(format!("Choose a period for \"{}\":", habit.name))
                .with_options(keyboards::periods());

            session.draft.habit_id = Some(habit.id);
            session.draft.habit_name = Some(habit.name);
            session.state = DialogState::Stats(StatsStep::AwaitingPeriod);
            Ok(Step::Continue(reply))
        }
        StatsStep::AwaitingPeriod => {
            let period: Period = input.parse()?;
            let Some(habit_id) = session.draft.habit_id else {
                return Ok(lost_draft());
            };

            let Some(summary) = storage.get_habit_summary(habit_id, session.user_id).await? else {
                return Ok(stale_habit());
            };
            let period_completions = storage.get_statistics(habit_id, period).await?;
            let times = storage.completion_times(habit_id).await?;

            let report = StatsReport::build(
                summary,
                period,
                period_completions,
                &times,
                Utc::now().date_naive(),
            );
            debug!("Built {} report for habit {}", period, habit_id);

            Ok(Step::Finish(Reply::new(render(&report))))
        }
    }
}

/// Text form of a statistics report
pub fn render(report: &StatsReport) -> String {
    let (start, end) = report.range;
    let last_day = (end - Duration::days(1)).date();

    format!(
        "Statistics for \"{}\"\n\n\
         Completions {}: {}\n\
         Total completions: {}\n\
         Current streak: {} day(s)\n\n\
         Period: {} - {}\n\
         Created: {}\n\
         Last completed: {}",
        report.habit_name,
        report.period.describe(),
        report.period_completions,
        report.total_completions,
        report.current_streak,
        format_day(start.date()),
        format_day(last_day),
        format_date(Some(report.created_at)),
        format_date(report.last_completed_at),
    )
}
