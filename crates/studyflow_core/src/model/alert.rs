//! Alert (notification schedule) model.
//!
//! # Invariants
//! - `schedule_mode` decides which field set is meaningful: absolute alerts
//!   read `start_date_time`/`until`, relative alerts read
//!   `expected_enrollment_date`/`offset_days`/`offset_time`/`repeat_count`.
//! - `repeat == Repeat::Never` ignores `interval`, `until` and `repeat_count`.
//! - Date/time fields stay raw strings here; parsing happens in `schedule`
//!   so a malformed alert fails per module instead of failing the load.

use serde::{Deserialize, Deserializer, Serialize};

/// Basis for computing the first notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// Anchored on a calendar date-time.
    #[default]
    Absolute,
    /// Anchored on an offset from participant enrollment.
    Relative,
}

/// Repeat unit for recurring alerts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    #[default]
    Never,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Repeat {
    /// Returns the wire name of this repeat unit.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// Notification content plus scheduling specification for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Alert {
    pub schedule_mode: ScheduleMode,
    /// Absolute mode: first notification, local ISO date-time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<String>,
    /// Absolute mode: last repeat day (`YYYY-MM-DD`, inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    /// Relative mode: enrollment date assumed for previews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_enrollment_date: Option<String>,
    /// Relative mode: days after enrollment of the first notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_days: Option<u32>,
    /// Relative mode: `HH:MM` of the first notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_time: Option<String>,
    /// Relative mode: repeats after the first notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<u32>,
    pub title: String,
    pub message: String,
    /// Extra `HH:MM` times added on every scheduled day.
    #[serde(deserialize_with = "deserialize_times")]
    pub times: Vec<String>,
    pub repeat: Repeat,
    pub interval: u32,
    pub random: bool,
    /// Maximum jitter in minutes, applied by the delivering runtime.
    pub random_interval: u32,
    pub sticky: bool,
    pub sticky_label: String,
    pub timeout: bool,
    /// Milliseconds before an unanswered notification is withdrawn.
    pub timeout_after: u64,
}

impl Default for Alert {
    fn default() -> Self {
        Self {
            schedule_mode: ScheduleMode::Absolute,
            start_date_time: None,
            until: None,
            expected_enrollment_date: None,
            offset_days: None,
            offset_time: None,
            repeat_count: None,
            title: String::new(),
            message: String::new(),
            times: Vec::new(),
            repeat: Repeat::Never,
            interval: 1,
            random: false,
            random_interval: 0,
            sticky: false,
            sticky_label: String::new(),
            timeout: false,
            timeout_after: 0,
        }
    }
}

impl Alert {
    /// Absolute single-shot alert at `start_date_time`.
    pub fn absolute(start_date_time: impl Into<String>) -> Self {
        Self {
            start_date_time: Some(start_date_time.into()),
            ..Self::default()
        }
    }

    /// Relative single-shot alert `offset_days` after `enrollment_date`.
    pub fn relative(
        enrollment_date: impl Into<String>,
        offset_days: u32,
        offset_time: impl Into<String>,
    ) -> Self {
        Self {
            schedule_mode: ScheduleMode::Relative,
            expected_enrollment_date: Some(enrollment_date.into()),
            offset_days: Some(offset_days),
            offset_time: Some(offset_time.into()),
            ..Self::default()
        }
    }

    /// Sets repeat unit and interval.
    pub fn repeating(mut self, repeat: Repeat, interval: u32) -> Self {
        self.repeat = repeat;
        self.interval = interval;
        self
    }

    /// Returns the display annotation for randomized delivery, if enabled.
    pub fn random_offset_label(&self) -> Option<String> {
        self.random
            .then(|| format!("±{} min", self.random_interval))
    }
}

/// Accepts `"HH:MM"` strings and `{hours, minutes}` objects.
fn deserialize_times<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TimeEntry {
        Text(String),
        Parts {
            #[serde(default)]
            hours: u32,
            #[serde(default)]
            minutes: u32,
        },
    }

    let entries = Option::<Vec<TimeEntry>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            TimeEntry::Text(value) => value,
            TimeEntry::Parts { hours, minutes } => format!("{hours:02}:{minutes:02}"),
        })
        .collect())
}
