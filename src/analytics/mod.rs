/// Statistics calculator for habit completion data
///
/// This module provides pure functions for computing period windows and
/// current streaks from completion timestamps already fetched from storage.
/// "Today" is always passed in explicitly so the results are deterministic.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

use crate::domain::{HabitSummary, Period};

/// Half-open `[start, end)` window of wall-clock time
pub type DateRange = (NaiveDateTime, NaiveDateTime);

/// Compute the calendar window for a statistics period
///
/// - `Today`: midnight today to midnight tomorrow
/// - `Week`: the most recent Monday 00:00, spanning seven days
/// - `Month`: first of this month to first of next month
/// - `Year`: January 1st to January 1st of next year
pub fn date_range(period: Period, today: NaiveDate) -> DateRange {
    let (start, end) = match period {
        Period::Today => (today, today + Duration::days(1)),
        Period::Week => {
            let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
            (monday, monday + Duration::days(7))
        }
        Period::Month => {
            let first = today - Duration::days(today.day0() as i64);
            // 31 days past the 1st always lands inside the following month
            let probe = first + Duration::days(31);
            (first, probe - Duration::days(probe.day0() as i64))
        }
        Period::Year => {
            let first = today - Duration::days(today.ordinal0() as i64);
            let probe = first + Duration::days(366);
            (first, probe - Duration::days(probe.ordinal0() as i64))
        }
    };

    (start.and_time(NaiveTime::MIN), end.and_time(NaiveTime::MIN))
}

/// Count consecutive days with at least one completion, ending today or yesterday
///
/// A completion yesterday keeps the streak alive even if today has none yet.
/// Any missing day breaks the streak. Multiple completions on one day count
/// once. Completions after `today` are ignored.
pub fn current_streak(dates: &[DateTime<Utc>], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = dates
        .iter()
        .map(|d| d.date_naive())
        .filter(|d| *d <= today)
        .collect();

    // Newest first, one entry per calendar day
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let mut days = days.into_iter();
    let mut last_counted = match days.next() {
        Some(newest) if (today - newest).num_days() <= 1 => newest,
        _ => return 0,
    };

    let mut streak = 1;
    for day in days {
        if (last_counted - day).num_days() == 1 {
            streak += 1;
            last_counted = day;
        } else {
            break;
        }
    }

    streak
}

/// Everything the statistics flow reports for one habit and period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub habit_name: String,
    pub period: Period,
    pub range: DateRange,
    /// Sum of completion counts inside `range`
    pub period_completions: u64,
    /// Sum of completion counts over the habit's whole history
    pub total_completions: u64,
    pub current_streak: u32,
    pub created_at: DateTime<Utc>,
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl StatsReport {
    /// Assemble a report from storage aggregates and raw completion times
    pub fn build(
        summary: HabitSummary,
        period: Period,
        period_completions: u64,
        completion_times: &[DateTime<Utc>],
        today: NaiveDate,
    ) -> Self {
        Self {
            habit_name: summary.name,
            period,
            range: date_range(period, today),
            period_completions,
            total_completions: summary.total_completions,
            current_streak: current_streak(completion_times, today),
            created_at: summary.created_at,
            last_completed_at: summary.last_completed_at,
        }
    }
}
