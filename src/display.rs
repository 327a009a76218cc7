/// Date parsing and formatting for user-facing messages
///
/// This module is presentation only: the storage layer always hands out typed
/// timestamps, and these helpers turn them (or loosely formatted text) into
/// the short forms shown in chat.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

/// Accepted layouts for free-form timestamps, tried in order
const DATETIME_PATTERNS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Date-only layouts, interpreted as midnight
const DATE_PATTERNS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Parse a timestamp written in any of the accepted layouts
///
/// RFC 3339 is tried first (and converted to UTC), then each pattern in
/// `DATETIME_PATTERNS`, then `DATE_PATTERNS`. Returns None if nothing fits.
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }

    DATETIME_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(input, pattern).ok())
        .or_else(|| {
            DATE_PATTERNS
                .iter()
                .find_map(|pattern| NaiveDate::parse_from_str(input, pattern).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Human-readable date such as "28 June at 17:55"
///
/// The time is omitted when it is exactly midnight. `None` reads as "never".
pub fn format_date(value: Option<DateTime<Utc>>) -> String {
    match value {
        Some(dt) => format_naive(&dt.naive_utc()),
        None => "never".to_string(),
    }
}

/// Same as `format_date` for loosely formatted text
///
/// Text that cannot be parsed is returned unchanged.
pub fn format_date_text(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => format_naive(&dt),
        None => value.to_string(),
    }
}

/// Compact day form used for report ranges, e.g. "28.06.2025"
pub fn format_day(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

fn format_naive(dt: &NaiveDateTime) -> String {
    let month = MONTHS[dt.month0() as usize];
    if dt.hour() == 0 && dt.minute() == 0 {
        format!("{} {}", dt.day(), month)
    } else {
        format!("{} {} at {:02}:{:02}", dt.day(), month, dt.hour(), dt.minute())
    }
}
