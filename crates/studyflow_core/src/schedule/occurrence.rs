//! Occurrence expander: base dates + extra times → calendar entries.

use crate::config::RecurrenceLimits;
use crate::model::alert::Alert;
use crate::model::study::ModuleHeader;
use crate::schedule::parse::parse_time_of_day;
use crate::schedule::recurrence::base_dates_with;
use crate::schedule::ScheduleResult;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

/// One concrete notification instant. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    id: String,
    timestamp: i64,
    name: String,
    time: String,
    datetime: String,
    module: String,
    condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    random_offset: Option<String>,
    #[serde(skip)]
    at: NaiveDateTime,
}

impl Occurrence {
    fn new(subject: &OccurrenceSubject<'_>, at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            timestamp: at.and_utc().timestamp_millis(),
            name: subject.name.to_string(),
            time: at.format("%-I:%M %p").to_string(),
            datetime: at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            module: subject.module_id.to_string(),
            condition: subject.condition.to_string(),
            random_offset: subject.random_offset.clone(),
            at,
        }
    }

    /// Session-unique id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Epoch milliseconds of the wall-clock value read as UTC.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 12-hour display time, e.g. `9:00 AM`.
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Local ISO date-time without zone, e.g. `2025-01-01T09:00:00`.
    pub fn datetime(&self) -> &str {
        &self.datetime
    }

    /// Owning module id.
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Display-only randomization hint such as `±30 min`.
    pub fn random_offset(&self) -> Option<&str> {
        self.random_offset.as_deref()
    }

    pub fn at(&self) -> NaiveDateTime {
        self.at
    }

    pub fn date(&self) -> NaiveDate {
        self.at.date()
    }
}

/// Identity fields copied onto every occurrence of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceSubject<'a> {
    pub module_id: &'a str,
    pub name: &'a str,
    pub condition: &'a str,
    pub random_offset: Option<String>,
}

impl<'a> OccurrenceSubject<'a> {
    pub fn for_module(module: &'a ModuleHeader) -> Self {
        Self {
            module_id: &module.id,
            name: &module.name,
            condition: &module.condition,
            random_offset: module.alerts.random_offset_label(),
        }
    }
}

/// Expands base dates with the alert's extra times of day.
///
/// Each base date contributes its own instant first, then one instant per
/// extra time on the same day. The result is sorted stably and exact
/// duplicate instants are collapsed to their first occurrence.
pub fn expand_instants(
    base: &[NaiveDateTime],
    times: &[String],
) -> ScheduleResult<Vec<NaiveDateTime>> {
    let extra = times
        .iter()
        .map(|raw| parse_time_of_day("times", raw))
        .collect::<ScheduleResult<Vec<NaiveTime>>>()?;

    let mut instants = Vec::with_capacity(base.len() * (extra.len() + 1));
    for at in base {
        instants.push(*at);
        instants.extend(extra.iter().map(|time| at.date().and_time(*time)));
    }
    instants.sort();
    instants.dedup();
    Ok(instants)
}

/// Builds occurrences for `subject` from precomputed base dates.
pub fn expand(
    subject: &OccurrenceSubject<'_>,
    alert: &Alert,
    base: &[NaiveDateTime],
) -> ScheduleResult<Vec<Occurrence>> {
    Ok(expand_instants(base, &alert.times)?
        .into_iter()
        .map(|at| Occurrence::new(subject, at))
        .collect())
}

/// Recurrence + expansion for one module.
pub fn schedule_module(
    module: &ModuleHeader,
    limits: &RecurrenceLimits,
) -> ScheduleResult<Vec<Occurrence>> {
    let base = base_dates_with(&module.alerts, limits)?;
    expand(&OccurrenceSubject::for_module(module), &module.alerts, &base)
}

#[cfg(test)]
mod tests {
    use super::{expand_instants, schedule_module};
    use crate::config::RecurrenceLimits;
    use crate::model::alert::Alert;
    use crate::model::study::ModuleHeader;
    use chrono::NaiveDate;

    #[test]
    fn occurrence_formats_time_and_datetime() {
        let mut module = ModuleHeader::new("evening");
        module.name = "Evening check-in".to_string();
        module.condition = "Control".to_string();
        module.alerts = Alert::absolute("2025-03-01T21:05");

        let occurrences = schedule_module(&module, &RecurrenceLimits::default()).unwrap();
        assert_eq!(occurrences.len(), 1);
        let only = &occurrences[0];
        assert_eq!(only.time(), "9:05 PM");
        assert_eq!(only.datetime(), "2025-03-01T21:05:00");
        assert_eq!(only.module(), "evening");
        assert_eq!(only.name(), "Evening check-in");
        assert_eq!(only.random_offset(), None);
        assert_eq!(only.id().len(), 32);
    }

    #[test]
    fn extra_time_equal_to_base_time_is_collapsed() {
        let base = [NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()];
        let instants = expand_instants(&base, &["08:00".to_string(), "07:00".to_string()]).unwrap();

        let hours = instants
            .iter()
            .map(|at| at.format("%H:%M").to_string())
            .collect::<Vec<_>>();
        assert_eq!(hours, ["07:00", "08:00"]);
    }

    #[test]
    fn serialized_occurrence_uses_camel_case_and_omits_missing_offset() {
        let mut module = ModuleHeader::new("m1");
        module.alerts = Alert::absolute("2025-03-01T09:00");
        let occurrence = &schedule_module(&module, &RecurrenceLimits::default()).unwrap()[0];

        let value = serde_json::to_value(occurrence).unwrap();
        assert_eq!(value["module"], "m1");
        assert_eq!(value["timestamp"], 1_740_819_600_000_i64);
        assert!(value.get("randomOffset").is_none());
        assert!(value.get("at").is_none());
    }
}
