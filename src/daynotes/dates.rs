//! Conversions between calendar days, timestamps and the strings shown to users.
//!
//! Days travel as `YYYY-MM-DD` everywhere they are stored. Everything here is
//! pure: "today" is always passed in, never read from the system clock, so the
//! labels stay correct across a date rollover and are trivially testable.

use crate::error::{NotesError, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` day.
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
        .map_err(|_| NotesError::InvalidDate(s.to_string()))
}

/// Renders a day as `YYYY-MM-DD`.
pub fn day_string(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// "Monday, January 15, 2024"
pub fn format_long(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Label used in day lists: Today, Yesterday, a weekday for the past week,
/// otherwise a short month/day (with the year when it differs from today's).
pub fn relative_label(date: NaiveDate, today: NaiveDate) -> String {
    if is_today(date, today) {
        return "Today".to_string();
    }
    if is_yesterday(date, today) {
        return "Yesterday".to_string();
    }

    let days_ago = (today - date).num_days();
    if (1..=6).contains(&days_ago) {
        return date.format("%A").to_string();
    }

    if date.year() == today.year() {
        date.format("%b %-d").to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

/// "2:30 PM" in the local timezone.
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    format_time_in(timestamp, &Local)
}

pub fn format_time_in<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.with_timezone(tz).format("%-I:%M %p").to_string()
}

pub fn is_today(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

pub fn is_yesterday(date: NaiveDate, today: NaiveDate) -> bool {
    today.pred_opt() == Some(date)
}
