//! Human-readable schedule descriptions and first-occurrence lookup.
//!
//! Consumed by export collaborators that list each module's schedule next
//! to the study document.

use crate::config::RecurrenceLimits;
use crate::model::alert::{Alert, Repeat, ScheduleMode};
use crate::model::study::ModuleHeader;
use crate::schedule::occurrence::expand_instants;
use crate::schedule::parse::{non_empty, parse_date, parse_time_of_day};
use crate::schedule::recurrence::{base_dates_with, base_instant};
use crate::schedule::{ScheduleError, ScheduleResult};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Describes when `alert` fires, e.g.
/// `Starting 2025-01-01, every 2 weeks until 2025-01-20`.
///
/// # Errors
/// Same input errors as the recurrence engine.
pub fn describe_alert(alert: &Alert) -> ScheduleResult<String> {
    let start = base_instant(alert)?;
    let repeating = alert.repeat != Repeat::Never;
    if repeating && alert.interval == 0 {
        return Err(ScheduleError::ZeroInterval);
    }

    let mut text = match alert.schedule_mode {
        ScheduleMode::Absolute if repeating => format!("Starting {}", start.format("%Y-%m-%d")),
        ScheduleMode::Absolute => format!("On {} at {}", start.format("%Y-%m-%d"), start.format("%H:%M")),
        ScheduleMode::Relative => format!(
            "Day {} after enrollment at {}",
            alert.offset_days.unwrap_or(0),
            start.format("%H:%M")
        ),
    };

    if repeating {
        text.push_str(", ");
        text.push_str(&every(alert.repeat, alert.interval));
        match alert.schedule_mode {
            ScheduleMode::Absolute => {
                if let Some(raw) = non_empty(alert.until.as_deref()) {
                    let until = parse_date("until", raw)?;
                    text.push_str(&format!(" until {}", until.format("%Y-%m-%d")));
                }
            }
            ScheduleMode::Relative => match alert.repeat_count.unwrap_or(0) {
                0 => {}
                1 => text.push_str(", 1 more time"),
                count => text.push_str(&format!(", {count} more times")),
            },
        }
    }

    if !alert.times.is_empty() {
        let times = alert
            .times
            .iter()
            .map(|raw| parse_time_of_day("times", raw).map(|time| time.format("%H:%M").to_string()))
            .collect::<ScheduleResult<Vec<_>>>()?;
        text.push_str(&format!(", also at {}", times.join(", ")));
    }
    Ok(text)
}

/// Earliest expanded instant of `alert`; `None` when the schedule is empty.
pub fn first_occurrence(alert: &Alert) -> ScheduleResult<Option<NaiveDateTime>> {
    first_occurrence_with(alert, &RecurrenceLimits::default())
}

pub fn first_occurrence_with(
    alert: &Alert,
    limits: &RecurrenceLimits,
) -> ScheduleResult<Option<NaiveDateTime>> {
    let base = base_dates_with(alert, limits)?;
    Ok(expand_instants(&base, &alert.times)?.first().copied())
}

/// Per-module export row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub module_id: String,
    pub name: String,
    pub first_occurrence: Option<NaiveDateTime>,
    pub description: String,
}

pub fn module_summary(
    module: &ModuleHeader,
    limits: &RecurrenceLimits,
) -> ScheduleResult<ScheduleSummary> {
    Ok(ScheduleSummary {
        module_id: module.id.clone(),
        name: module.name.clone(),
        first_occurrence: first_occurrence_with(&module.alerts, limits)?,
        description: describe_alert(&module.alerts)?,
    })
}

fn every(repeat: Repeat, interval: u32) -> String {
    let unit = match repeat {
        Repeat::Never => return String::new(),
        Repeat::Daily => "day",
        Repeat::Weekly => "week",
        Repeat::Monthly => "month",
        Repeat::Yearly => "year",
    };
    if interval == 1 {
        format!("every {unit}")
    } else {
        format!("every {interval} {unit}s")
    }
}
