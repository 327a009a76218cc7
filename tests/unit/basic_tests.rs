/// Basic unit tests to verify core functionality
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use habit_tracker_bot::dialog::input::{Confirmation, MenuAction};
use habit_tracker_bot::display::{format_date, parse_timestamp};
use habit_tracker_bot::*;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_name_length_boundary() {
    assert!(Habit::validate_name("").is_err());
    assert!(Habit::validate_name("a").is_ok());
    assert!(Habit::validate_name(&"a".repeat(MAX_NAME_CHARS)).is_ok());
    assert!(Habit::validate_name(&"a".repeat(MAX_NAME_CHARS + 1)).is_err());
}

#[test]
fn test_count_boundary() {
    assert!(Completion::parse_count("0").is_err());
    assert_eq!(Completion::parse_count("1"), Ok(1));
    assert_eq!(Completion::parse_count("100"), Ok(MAX_BATCH_COUNT));
    assert!(Completion::parse_count("101").is_err());
}

#[test]
fn test_period_tokens() {
    assert_eq!("Today".parse::<Period>(), Ok(Period::Today));
    assert_eq!("YEAR".parse::<Period>(), Ok(Period::Year));
    assert!("decade".parse::<Period>().is_err());
}

#[test]
fn test_streak_examples() {
    let today = day(2025, 6, 28);
    let at = |d: NaiveDate| Utc.from_utc_datetime(&d.and_hms_opt(12, 0, 0).unwrap());

    // Completions today, yesterday and the day before
    let run = vec![at(today), at(today - Duration::days(1)), at(today - Duration::days(2))];
    assert_eq!(current_streak(&run, today), 3);

    // Latest completion yesterday still counts
    let from_yesterday = vec![at(today - Duration::days(1)), at(today - Duration::days(2))];
    assert_eq!(current_streak(&from_yesterday, today), 2);

    // Two days without a completion breaks it
    assert_eq!(current_streak(&[at(today - Duration::days(2))], today), 0);
    assert_eq!(current_streak(&[], today), 0);
}

#[test]
fn test_period_ranges_are_half_open() {
    let (start, end) = date_range(Period::Month, day(2024, 2, 10));
    assert_eq!(start, day(2024, 2, 1).and_hms_opt(0, 0, 0).unwrap());
    assert_eq!(end, day(2024, 3, 1).and_hms_opt(0, 0, 0).unwrap());
}

#[test]
fn test_input_classification() {
    assert_eq!(MenuAction::parse("create habit"), Some(MenuAction::Create));
    assert_eq!(Confirmation::parse("Нет"), Some(Confirmation::No));
    assert_eq!(Confirmation::parse("sure"), None);
}

#[test]
fn test_display_helpers() {
    let parsed = parse_timestamp("28.06.2025 17:55").unwrap();
    assert_eq!(format_date(Some(Utc.from_utc_datetime(&parsed))), "28 June at 17:55");
}

#[tokio::test]
async fn test_bot_creation() {
    let temp_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let bot = HabitTrackerBot::new(temp_file.path().to_path_buf(), None).await;
    assert!(bot.is_ok());
}
