//! Core domain logic for the studyflow study designer.
//! This crate is the single source of truth for graph and schedule invariants.

pub mod calendar;
pub mod config;
pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use calendar::{build_month_grid, shift_month, CalendarDay, GridOptions, MonthGrid};
pub use config::{EngineConfig, RecurrenceLimits, TitleLimits};
pub use graph::{flatten, materialize, GraphError, GraphResult, GraphStore, Node, NodeMap};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::alert::{Alert, Repeat, ScheduleMode};
pub use model::study::{Module, Params, Study};
pub use repo::{SqliteStudyRepository, StoreError, StudyRepository};
pub use schedule::{
    base_dates, describe_alert, first_occurrence, schedule_modules, Occurrence, ScheduleError,
    ScheduleReport,
};
pub use service::designer_service::{DesignerError, DesignerService, Preview};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
