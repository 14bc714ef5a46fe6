//! Recurrence engine and occurrence expander.
//!
//! # Responsibility
//! - Turn one module's alert into ordered base date-times.
//! - Expand base dates with extra times of day into calendar occurrences.
//! - Run every module of a study with per-module failure isolation.
//!
//! # Invariants
//! - Everything here is pure apart from occurrence id generation.
//! - All values are wall-clock `NaiveDateTime`s; no zone conversion.
//! - Occurrence lists are sorted by timestamp, stable on ties.

pub mod batch;
pub mod describe;
pub mod occurrence;
pub mod parse;
pub mod recurrence;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub use batch::{schedule_modules, schedule_modules_with, ModuleFailure, ScheduleReport};
pub use describe::{
    describe_alert, first_occurrence, first_occurrence_with, module_summary, ScheduleSummary,
};
pub use occurrence::{expand, expand_instants, schedule_module, Occurrence, OccurrenceSubject};
pub use recurrence::{base_dates, base_dates_with, base_instant};

/// Result type used by scheduling operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Input errors of one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A field required by the alert's mode is absent or blank.
    MissingField(&'static str),
    /// A date, time or date-time string does not parse.
    Unparseable { field: &'static str, value: String },
    /// Repeating alert with `interval == 0`.
    ZeroInterval,
    /// Date arithmetic left chrono's representable range.
    OutOfRange,
}

impl ScheduleError {
    /// Stable machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::Unparseable { .. } => "unparseable",
            Self::ZeroInterval => "zero_interval",
            Self::OutOfRange => "out_of_range",
        }
    }
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "alert field `{field}` is required"),
            Self::Unparseable { field, value } => {
                write!(f, "alert field `{field}` has unparseable value `{value}`")
            }
            Self::ZeroInterval => write!(f, "repeat interval must be at least 1"),
            Self::OutOfRange => write!(f, "alert schedule leaves the supported date range"),
        }
    }
}

impl Error for ScheduleError {}
