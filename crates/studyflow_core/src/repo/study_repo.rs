//! Versioned study repository and SQLite implementation.
//!
//! # Responsibility
//! - Append a full document snapshot on every save.
//! - Resolve the latest version per study and list history.
//!
//! # Invariants
//! - Write paths require a non-blank `properties.study_id`.
//! - The stored document carries `timestamp == created_at`.
//! - Listing order is `created_at DESC`, ties broken by insertion order.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::study::Study;
use chrono::Utc;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Upper bound for one `list_versions` page.
pub const MAX_VERSION_LIST: u32 = 100;

const VERSION_SELECT_SQL: &str = "SELECT
    version_uuid,
    study_id,
    study_name,
    document,
    created_at
FROM study_versions";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// No version exists for the study id.
    NotFound(String),
    /// Study has a blank `properties.study_id`.
    MissingStudyId,
    /// Document could not be encoded for storage.
    Encode(serde_json::Error),
    /// Connection has not been migrated to the expected schema.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Persisted row cannot be converted to a valid version.
    InvalidData(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(_) => "db",
            Self::NotFound(_) => "not_found",
            Self::MissingStudyId => "missing_study_id",
            Self::Encode(_) => "encode",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::MissingRequiredTable(_) => "missing_required_table",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(study_id) => write!(f, "study not found: {study_id}"),
            Self::MissingStudyId => write!(f, "study has no study_id"),
            Self::Encode(err) => write!(f, "cannot encode study document: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "study repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "study repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted study data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::NotFound(_)
            | Self::MissingStudyId
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One immutable saved snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyVersion {
    pub version_uuid: Uuid,
    pub study_id: String,
    pub study_name: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub study: Study,
}

/// Latest-version row of one study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySummary {
    pub study_id: String,
    pub study_name: String,
    pub latest_version: Uuid,
    pub updated_at: i64,
    pub version_count: u32,
}

/// Repository interface for versioned studies.
pub trait StudyRepository {
    fn insert_version(&self, study: &Study) -> StoreResult<StudyVersion>;
    fn latest(&self, study_id: &str) -> StoreResult<Option<StudyVersion>>;
    fn get_version(&self, version_uuid: Uuid) -> StoreResult<Option<StudyVersion>>;
    /// Newest first; `limit` is clamped to `1..=MAX_VERSION_LIST`.
    fn list_versions(&self, study_id: &str, limit: u32) -> StoreResult<Vec<StudyVersion>>;
    fn list_studies(&self) -> StoreResult<Vec<StudySummary>>;
    /// Removes every version of `study_id`; returns the removed count.
    fn delete_study(&self, study_id: &str) -> StoreResult<usize>;
}

/// SQLite-backed study repository.
pub struct SqliteStudyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudyRepository<'conn> {
    /// Wraps a connection opened through [`crate::db::open_db`].
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` when the schema was tampered with.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl StudyRepository for SqliteStudyRepository<'_> {
    fn insert_version(&self, study: &Study) -> StoreResult<StudyVersion> {
        let study_id = study.properties.study_id.trim();
        if study_id.is_empty() {
            return Err(StoreError::MissingStudyId);
        }

        let created_at = Utc::now().timestamp_millis();
        let mut stamped = study.clone();
        stamped.timestamp = Some(created_at);
        let document = serde_json::to_string(&stamped).map_err(StoreError::Encode)?;
        let version_uuid = Uuid::new_v4();

        self.conn.execute(
            "INSERT INTO study_versions (
                version_uuid,
                study_id,
                study_name,
                document,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                version_uuid.to_string(),
                study_id,
                stamped.properties.study_name.as_str(),
                document,
                created_at,
            ],
        )?;

        info!(
            "event=study_save module=store status=ok study_id={} version={}",
            study_id, version_uuid
        );
        Ok(StudyVersion {
            version_uuid,
            study_id: study_id.to_string(),
            study_name: stamped.properties.study_name.clone(),
            created_at,
            study: stamped,
        })
    }

    fn latest(&self, study_id: &str) -> StoreResult<Option<StudyVersion>> {
        let mut stmt = self.conn.prepare(&format!(
            "{VERSION_SELECT_SQL}
             WHERE study_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([study_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_version_row(row)?)),
            None => Ok(None),
        }
    }

    fn get_version(&self, version_uuid: Uuid) -> StoreResult<Option<StudyVersion>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{VERSION_SELECT_SQL} WHERE version_uuid = ?1;"))?;
        let mut rows = stmt.query([version_uuid.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_version_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_versions(&self, study_id: &str, limit: u32) -> StoreResult<Vec<StudyVersion>> {
        let limit = limit.clamp(1, MAX_VERSION_LIST);
        let mut stmt = self.conn.prepare(&format!(
            "{VERSION_SELECT_SQL}
             WHERE study_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![study_id, i64::from(limit)])?;
        let mut versions = Vec::new();
        while let Some(row) = rows.next()? {
            versions.push(parse_version_row(row)?);
        }
        Ok(versions)
    }

    fn list_studies(&self) -> StoreResult<Vec<StudySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                v.study_id,
                v.study_name,
                v.version_uuid,
                v.created_at,
                (SELECT COUNT(*) FROM study_versions c WHERE c.study_id = v.study_id)
             FROM study_versions v
             WHERE v.rowid = (
                SELECT l.rowid
                FROM study_versions l
                WHERE l.study_id = v.study_id
                ORDER BY l.created_at DESC, l.rowid DESC
                LIMIT 1
             )
             ORDER BY v.study_name COLLATE NOCASE ASC, v.study_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut studies = Vec::new();
        while let Some(row) = rows.next()? {
            let version_text: String = row.get(2)?;
            studies.push(StudySummary {
                study_id: row.get(0)?,
                study_name: row.get(1)?,
                latest_version: parse_uuid(&version_text)?,
                updated_at: row.get(3)?,
                version_count: row.get(4)?,
            });
        }
        Ok(studies)
    }

    fn delete_study(&self, study_id: &str) -> StoreResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM study_versions WHERE study_id = ?1;", [study_id])?;
        if removed == 0 {
            return Err(StoreError::NotFound(study_id.to_string()));
        }

        info!(
            "event=study_delete module=store status=ok study_id={} removed={}",
            study_id, removed
        );
        Ok(removed)
    }
}

fn parse_version_row(row: &Row<'_>) -> StoreResult<StudyVersion> {
    let uuid_text: String = row.get("version_uuid")?;
    let version_uuid = parse_uuid(&uuid_text)?;
    let document: String = row.get("document")?;
    let study = serde_json::from_str::<Study>(&document).map_err(|err| {
        StoreError::InvalidData(format!(
            "cannot decode study_versions.document for `{uuid_text}`: {err}"
        ))
    })?;

    Ok(StudyVersion {
        version_uuid,
        study_id: row.get("study_id")?,
        study_name: row.get("study_name")?,
        created_at: row.get("created_at")?,
        study,
    })
}

fn parse_uuid(value: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid uuid value `{value}` in study_versions.version_uuid"
        ))
    })
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'study_versions';",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if table.is_none() {
        return Err(StoreError::MissingRequiredTable("study_versions"));
    }
    Ok(())
}
