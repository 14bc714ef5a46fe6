//! Study designer use-case service.
//!
//! # Responsibility
//! - Load interchange JSON into an editable [`GraphStore`] and export it back.
//! - Save and reopen versions through a [`StudyRepository`].
//! - Recompute the calendar preview on demand from current module contents.
//!
//! # Invariants
//! - Imports run the full flatten → materialize → flatten cycle, so a
//!   store handed out is always materializable.
//! - Previews never fail because of one module's alert; failures are
//!   reported next to the grid.

use crate::calendar::{build_month_grid, GridOptions, MonthGrid};
use crate::config::EngineConfig;
use crate::graph::{GraphError, GraphStore};
use crate::model::study::Study;
use crate::repo::{StoreError, StudyRepository, StudySummary, StudyVersion};
use crate::schedule::{
    module_summary, schedule_modules_with, ModuleFailure, ScheduleError, ScheduleReport,
    ScheduleSummary,
};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors from designer service operations.
#[derive(Debug)]
pub enum DesignerError {
    /// Input is not a valid study document.
    Parse(serde_json::Error),
    /// Document could not be rendered as JSON.
    Encode(serde_json::Error),
    /// Structural graph failure.
    Graph(GraphError),
    /// Persistence failure.
    Store(StoreError),
    /// No saved study with this id.
    StudyNotFound(String),
    /// No saved version with this id.
    VersionNotFound(Uuid),
    /// Month grid falls outside the supported date range.
    CalendarRange(NaiveDate),
}

impl Display for DesignerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid study document: {err}"),
            Self::Encode(err) => write!(f, "cannot encode study document: {err}"),
            Self::Graph(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::StudyNotFound(study_id) => write!(f, "study not found: {study_id}"),
            Self::VersionNotFound(id) => write!(f, "study version not found: {id}"),
            Self::CalendarRange(month) => {
                write!(f, "calendar month {} is out of range", month.format("%Y-%m"))
            }
        }
    }
}

impl Error for DesignerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) | Self::Encode(err) => Some(err),
            Self::Graph(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GraphError> for DesignerError {
    fn from(value: GraphError) -> Self {
        Self::Graph(value)
    }
}

impl From<StoreError> for DesignerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(study_id) => Self::StudyNotFound(study_id),
            other => Self::Store(other),
        }
    }
}

pub type DesignerResult<T> = Result<T, DesignerError>;

/// Month grid plus the modules that could not be scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub grid: MonthGrid,
    pub failures: Vec<ModuleFailure>,
}

/// Parses interchange JSON into an editable store.
pub fn import_study_json(text: &str, config: &EngineConfig) -> DesignerResult<GraphStore> {
    let study: Study = serde_json::from_str(text).map_err(|err| {
        warn!(
            "event=study_import module=designer status=error error_code=parse line={} column={}",
            err.line(),
            err.column()
        );
        DesignerError::Parse(err)
    })?;
    import_study(&study, config)
}

/// Loads a typed document into an editable store.
pub fn import_study(study: &Study, config: &EngineConfig) -> DesignerResult<GraphStore> {
    let checked = GraphStore::from_study_with(study, config.titles)?.materialize()?;
    let store = GraphStore::from_study_with(&checked, config.titles)?;
    info!(
        "event=study_import module=designer status=ok nodes={} modules={}",
        store.len(),
        checked.modules.len()
    );
    Ok(store)
}

/// Materializes `store` as pretty-printed interchange JSON.
pub fn export_study_json(store: &GraphStore) -> DesignerResult<String> {
    let study = store.materialize()?;
    serde_json::to_string_pretty(&study).map_err(DesignerError::Encode)
}

/// Runs every module's alert through the engine.
pub fn schedule_store(store: &GraphStore, config: &EngineConfig) -> ScheduleReport {
    schedule_modules_with(store.module_contents(), &config.recurrence)
}

/// Export row per module: first occurrence plus description.
pub fn schedule_summaries(
    store: &GraphStore,
    config: &EngineConfig,
) -> Vec<(String, Result<ScheduleSummary, ScheduleError>)> {
    store
        .module_contents()
        .into_iter()
        .map(|module| (module.id.clone(), module_summary(module, &config.recurrence)))
        .collect()
}

/// Schedules the store and buckets the result onto `month`'s grid.
pub fn preview_month(
    store: &GraphStore,
    month: NaiveDate,
    options: GridOptions,
    config: &EngineConfig,
) -> DesignerResult<Preview> {
    let report = schedule_store(store, config);
    let grid = build_month_grid(month, &report.occurrences, options)
        .ok_or(DesignerError::CalendarRange(month))?;
    Ok(Preview {
        grid,
        failures: report.failures,
    })
}

/// Designer facade over a study repository.
pub struct DesignerService<R: StudyRepository> {
    repo: R,
    config: EngineConfig,
}

impl<R: StudyRepository> DesignerService<R> {
    /// Creates service with default engine configuration.
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, EngineConfig::default())
    }

    pub fn with_config(repo: R, config: EngineConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn import_json(&self, text: &str) -> DesignerResult<GraphStore> {
        import_study_json(text, &self.config)
    }

    pub fn export_json(&self, store: &GraphStore) -> DesignerResult<String> {
        export_study_json(store)
    }

    /// Appends the materialized store as a new version.
    pub fn save(&self, store: &GraphStore) -> DesignerResult<StudyVersion> {
        let study = store.materialize()?;
        self.repo.insert_version(&study).map_err(Into::into)
    }

    /// Opens the latest version of `study_id` for editing.
    pub fn open(&self, study_id: &str) -> DesignerResult<GraphStore> {
        let version = self
            .repo
            .latest(study_id)?
            .ok_or_else(|| DesignerError::StudyNotFound(study_id.to_string()))?;
        import_study(&version.study, &self.config)
    }

    /// Opens one specific saved version.
    pub fn open_version(&self, version_uuid: Uuid) -> DesignerResult<GraphStore> {
        let version = self
            .repo
            .get_version(version_uuid)?
            .ok_or(DesignerError::VersionNotFound(version_uuid))?;
        import_study(&version.study, &self.config)
    }

    pub fn versions(&self, study_id: &str, limit: u32) -> DesignerResult<Vec<StudyVersion>> {
        self.repo
            .list_versions(study_id, limit)
            .map_err(Into::into)
    }

    pub fn studies(&self) -> DesignerResult<Vec<StudySummary>> {
        self.repo.list_studies().map_err(Into::into)
    }

    pub fn delete(&self, study_id: &str) -> DesignerResult<usize> {
        self.repo.delete_study(study_id).map_err(Into::into)
    }

    pub fn schedule(&self, store: &GraphStore) -> ScheduleReport {
        schedule_store(store, &self.config)
    }

    pub fn preview(
        &self,
        store: &GraphStore,
        month: NaiveDate,
        options: GridOptions,
    ) -> DesignerResult<Preview> {
        preview_month(store, month, options, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::{export_study_json, import_study_json, DesignerError};
    use crate::config::EngineConfig;

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = import_study_json("{ not json", &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, DesignerError::Parse(_)));
    }

    #[test]
    fn legacy_type_markers_are_ignored_on_import() {
        let text = r#"{
            "_type": "study",
            "properties": {"_type": "properties", "study_id": "Pilot-1", "study_name": "Pilot"},
            "modules": []
        }"#;
        let store = import_study_json(text, &EngineConfig::default()).unwrap();
        let exported = export_study_json(&store).unwrap();

        assert!(!exported.contains("_type"));
        assert!(exported.contains("\"study_id\": \"pilot1\""));
    }
}
