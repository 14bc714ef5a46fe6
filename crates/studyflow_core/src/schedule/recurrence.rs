//! Recurrence engine: one alert → ordered base date-times.
//!
//! # Invariants
//! - The k-th repeat is `start + k * interval` units, computed from the
//!   start each time; month/year steps clamp to the last valid day.
//! - Absolute repeats stop after the `until` day (inclusive) or after
//!   `open_ended_cap` entries when `until` is absent.
//! - Relative repeats produce exactly `repeat_count + 1` entries.

use crate::config::RecurrenceLimits;
use crate::model::alert::{Alert, Repeat, ScheduleMode};
use crate::schedule::parse::{non_empty, parse_date, parse_date_time, parse_time_of_day, required};
use crate::schedule::{ScheduleError, ScheduleResult};
use chrono::{Days, Months, NaiveDate, NaiveDateTime};
use log::debug;

/// Base date-times of `alert` with default limits.
pub fn base_dates(alert: &Alert) -> ScheduleResult<Vec<NaiveDateTime>> {
    base_dates_with(alert, &RecurrenceLimits::default())
}

/// Base date-times of `alert`.
///
/// # Errors
/// - `MissingField` / `Unparseable` for absent or malformed mode fields.
/// - `ZeroInterval` for a repeating alert with `interval == 0`.
/// - `OutOfRange` when a step overflows chrono's calendar.
pub fn base_dates_with(
    alert: &Alert,
    limits: &RecurrenceLimits,
) -> ScheduleResult<Vec<NaiveDateTime>> {
    let start = base_instant(alert)?;
    if alert.repeat == Repeat::Never {
        return Ok(vec![start]);
    }
    if alert.interval == 0 {
        return Err(ScheduleError::ZeroInterval);
    }

    match alert.schedule_mode {
        ScheduleMode::Absolute => absolute_series(alert, start, limits),
        ScheduleMode::Relative => relative_series(alert, start),
    }
}

/// First notification instant implied by the alert's mode fields.
pub fn base_instant(alert: &Alert) -> ScheduleResult<NaiveDateTime> {
    match alert.schedule_mode {
        ScheduleMode::Absolute => {
            let raw = required("startDateTime", alert.start_date_time.as_deref())?;
            parse_date_time("startDateTime", raw)
        }
        ScheduleMode::Relative => {
            let raw_date = required(
                "expectedEnrollmentDate",
                alert.expected_enrollment_date.as_deref(),
            )?;
            let enrolled = parse_date("expectedEnrollmentDate", raw_date)?;
            let offset_days = alert
                .offset_days
                .ok_or(ScheduleError::MissingField("offsetDays"))?;
            let raw_time = required("offsetTime", alert.offset_time.as_deref())?;
            let time = parse_time_of_day("offsetTime", raw_time)?;

            enrolled
                .checked_add_days(Days::new(u64::from(offset_days)))
                .map(|day| day.and_time(time))
                .ok_or(ScheduleError::OutOfRange)
        }
    }
}

/// `start` advanced by `units` repeat units.
pub fn advance(start: NaiveDateTime, repeat: Repeat, units: u64) -> Option<NaiveDateTime> {
    match repeat {
        Repeat::Never => Some(start),
        Repeat::Daily => start.checked_add_days(Days::new(units)),
        Repeat::Weekly => start.checked_add_days(Days::new(units.checked_mul(7)?)),
        Repeat::Monthly => start.checked_add_months(Months::new(u32::try_from(units).ok()?)),
        Repeat::Yearly => {
            let months = u32::try_from(units.checked_mul(12)?).ok()?;
            start.checked_add_months(Months::new(months))
        }
    }
}

fn absolute_series(
    alert: &Alert,
    start: NaiveDateTime,
    limits: &RecurrenceLimits,
) -> ScheduleResult<Vec<NaiveDateTime>> {
    let until: Option<NaiveDate> = non_empty(alert.until.as_deref())
        .map(|raw| parse_date("until", raw))
        .transpose()?;
    let cap = match until {
        Some(_) => limits.until_ceiling,
        None => limits.open_ended_cap,
    }
    .max(1);

    let mut dates = Vec::new();
    for k in 0..cap {
        let at = step(alert, start, k)?;
        if until.is_some_and(|last| at.date() > last) {
            return Ok(dates);
        }
        dates.push(at);
    }

    debug!(
        "event=recurrence_cap module=schedule status=skip repeat={} cap={} bounded={}",
        alert.repeat.as_str(),
        cap,
        until.is_some()
    );
    Ok(dates)
}

fn relative_series(alert: &Alert, start: NaiveDateTime) -> ScheduleResult<Vec<NaiveDateTime>> {
    let total = alert.repeat_count.unwrap_or(0);
    (0..=total).map(|k| step(alert, start, k)).collect()
}

fn step(alert: &Alert, start: NaiveDateTime, k: u32) -> ScheduleResult<NaiveDateTime> {
    let units = u64::from(k) * u64::from(alert.interval);
    advance(start, alert.repeat, units).ok_or(ScheduleError::OutOfRange)
}
