//! Alert field parsing.
//!
//! Accepted shapes:
//! - date-time: `YYYY-MM-DDTHH:MM[:SS[.f]]`, `YYYY-MM-DD HH:MM:SS`, RFC 3339
//!   (offset dropped), or a bare date (midnight)
//! - date: `YYYY-MM-DD`, or any accepted date-time (date part kept)
//! - time of day: `H:MM` / `HH:MM[:SS]`

use crate::schedule::{ScheduleError, ScheduleResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_OF_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("valid time-of-day regex")
});

const DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Returns the trimmed value, treating blank strings as absent.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Like [`non_empty`], but absence is a `MissingField` error.
pub fn required<'a>(field: &'static str, value: Option<&'a str>) -> ScheduleResult<&'a str> {
    non_empty(value).ok_or(ScheduleError::MissingField(field))
}

pub fn parse_time_of_day(field: &'static str, value: &str) -> ScheduleResult<NaiveTime> {
    let value = value.trim();
    let parsed = TIME_OF_DAY_RE.captures(value).and_then(|caps| {
        let hour = caps.get(1)?.as_str().parse().ok()?;
        let minute = caps.get(2)?.as_str().parse().ok()?;
        let second = match caps.get(3) {
            Some(raw) => raw.as_str().parse().ok()?,
            None => 0,
        };
        NaiveTime::from_hms_opt(hour, minute, second)
    });
    parsed.ok_or_else(|| unparseable(field, value))
}

pub fn parse_date(field: &'static str, value: &str) -> ScheduleResult<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_date_time(field, value).map(|at| at.date())
}

pub fn parse_date_time(field: &'static str, value: &str) -> ScheduleResult<NaiveDateTime> {
    let value = value.trim();
    for format in DATE_TIME_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(at);
        }
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.naive_local());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| unparseable(field, value))
}

fn unparseable(field: &'static str, value: &str) -> ScheduleError {
    ScheduleError::Unparseable {
        field,
        value: value.to_string(),
    }
}
