//! Repository layer over the study database.
//!
//! # Responsibility
//! - Define the versioned study store contract.
//! - Keep SQL details out of service orchestration.
//!
//! # Invariants
//! - Versions are append-only; the newest row per `study_id` is current.
//! - Persisted documents that fail to decode surface as `InvalidData`.

pub mod study_repo;

pub use study_repo::{
    SqliteStudyRepository, StoreError, StoreResult, StudyRepository, StudySummary, StudyVersion,
    MAX_VERSION_LIST,
};
