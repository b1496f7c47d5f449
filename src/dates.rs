//! Effective-day resolution.
//!
//! A run normally treats the local calendar date as "today". Callers may
//! pretend it is another day (a concrete date, or the most recent occurrence
//! of a weekday), and catch-up runs replay every day since the archive was
//! last stamped.

use chrono::{Datelike, Duration, Month, NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;

/// Weekday names as they appear in tags, Monday first.
pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Failure to interpret a day override.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("unknown weekday or date '{0}' (expected YYYY-MM-DD or a weekday name)")]
    Unrecognized(String),
    #[error("invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },
}

/// Tag name for a weekday (`monday` .. `sunday`).
pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAYS[day.num_days_from_monday() as usize]
}

/// Parse a full weekday name, case-insensitively.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    let lower = name.trim().to_lowercase();
    WEEKDAYS
        .iter()
        .position(|w| *w == lower)
        .and_then(|i| Weekday::try_from(i as u8).ok())
}

/// Lowercase month name for the month containing `date` (`january` ..).
pub fn month_name(date: NaiveDate) -> String {
    Month::try_from(date.month() as u8)
        .map(|m| m.name().to_lowercase())
        .unwrap_or_default()
}

/// A caller-supplied replacement for "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOverride {
    /// Treat this exact date as today.
    Date(NaiveDate),
    /// Treat the most recent occurrence of this weekday (possibly today) as today.
    Weekday(Weekday),
}

impl FromStr for DayOverride {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(day) = parse_weekday(s) {
            return Ok(DayOverride::Weekday(day));
        }
        if s.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(DayOverride::Date)
                .map_err(|e| DateError::InvalidDate {
                    input: s.to_string(),
                    reason: e.to_string(),
                });
        }
        Err(DateError::Unrecognized(s.to_string()))
    }
}

impl fmt::Display for DayOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayOverride::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DayOverride::Weekday(day) => f.write_str(weekday_name(*day)),
        }
    }
}

/// Walk back from `today` until the weekday matches.
///
/// Returns `today` itself when it already falls on `day`.
pub fn most_recent_weekday(today: NaiveDate, day: Weekday) -> NaiveDate {
    let mut date = today;
    while date.weekday() != day {
        date -= Duration::days(1);
    }
    date
}

/// The date to use as "today" for one rollover pass.
pub fn resolve_effective_date(today: NaiveDate, day_override: Option<DayOverride>) -> NaiveDate {
    match day_override {
        None => today,
        Some(DayOverride::Date(date)) => date,
        Some(DayOverride::Weekday(day)) => most_recent_weekday(today, day),
    }
}

/// Days strictly after `last` up to and including `today`, in order.
///
/// Empty when `last >= today`.
pub fn missed_days(last: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut date = last + Duration::days(1);
    while date <= today {
        days.push(date);
        date += Duration::days(1);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_names_follow_chrono() {
        // 2024-01-01 was a Monday.
        assert_eq!(weekday_name(date(2024, 1, 1).weekday()), "monday");
        assert_eq!(weekday_name(date(2024, 1, 7).weekday()), "sunday");
        assert_eq!(parse_weekday("Friday"), Some(Weekday::Fri));
        assert_eq!(parse_weekday("fri"), None);
    }

    #[test]
    fn month_names_are_lowercase() {
        assert_eq!(month_name(date(2024, 10, 3)), "october");
        assert_eq!(month_name(date(2024, 1, 31)), "january");
    }

    #[test]
    fn parse_override() {
        assert_eq!(
            "2024-02-29".parse::<DayOverride>(),
            Ok(DayOverride::Date(date(2024, 2, 29)))
        );
        assert_eq!(
            "Monday".parse::<DayOverride>(),
            Ok(DayOverride::Weekday(Weekday::Mon))
        );
        assert!(matches!(
            "2023-02-29".parse::<DayOverride>(),
            Err(DateError::InvalidDate { .. })
        ));
        assert_eq!(
            "someday".parse::<DayOverride>(),
            Err(DateError::Unrecognized("someday".to_string()))
        );
    }

    #[test]
    fn most_recent_weekday_includes_today() {
        let wednesday = date(2024, 1, 3);
        assert_eq!(most_recent_weekday(wednesday, Weekday::Wed), wednesday);
        assert_eq!(most_recent_weekday(wednesday, Weekday::Mon), date(2024, 1, 1));
        assert_eq!(most_recent_weekday(wednesday, Weekday::Thu), date(2023, 12, 28));
    }

    #[test]
    fn resolve_prefers_override() {
        let today = date(2024, 1, 3);
        assert_eq!(resolve_effective_date(today, None), today);
        assert_eq!(
            resolve_effective_date(today, Some(DayOverride::Date(date(2020, 5, 5)))),
            date(2020, 5, 5)
        );
        assert_eq!(
            resolve_effective_date(today, Some(DayOverride::Weekday(Weekday::Sat))),
            date(2023, 12, 30)
        );
    }

    #[test]
    fn missed_days_is_exclusive_inclusive() {
        assert_eq!(
            missed_days(date(2024, 2, 27), date(2024, 3, 1)),
            vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]
        );
        assert!(missed_days(date(2024, 3, 1), date(2024, 3, 1)).is_empty());
        assert!(missed_days(date(2024, 3, 2), date(2024, 3, 1)).is_empty());
    }
}
