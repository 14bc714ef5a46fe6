mod common;

use common::sample_study;
use rusqlite::Connection;
use studyflow_core::db::open_db_in_memory;
use studyflow_core::repo::{
    SqliteStudyRepository, StoreError, StudyRepository, MAX_VERSION_LIST,
};
use uuid::Uuid;

#[test]
fn saved_version_is_returned_as_latest() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudyRepository::try_new(&conn).unwrap();

    let saved = repo.insert_version(&sample_study()).unwrap();
    assert_eq!(saved.study_id, "Sleep-Pilot");
    assert_eq!(saved.study_name, "Sleep pilot");
    assert_eq!(saved.study.timestamp, Some(saved.created_at));

    let latest = repo.latest("Sleep-Pilot").unwrap().unwrap();
    assert_eq!(latest, saved);
    assert_eq!(latest.study.modules.len(), 2);
    assert_eq!(repo.get_version(saved.version_uuid).unwrap(), Some(saved));
}

#[test]
fn unknown_ids_return_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudyRepository::try_new(&conn).unwrap();

    assert_eq!(repo.latest("missing").unwrap(), None);
    assert_eq!(repo.get_version(Uuid::new_v4()).unwrap(), None);
    assert!(repo.list_versions("missing", 10).unwrap().is_empty());
}

#[test]
fn versions_are_listed_newest_first_with_clamped_limit() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudyRepository::try_new(&conn).unwrap();

    let mut study = sample_study();
    let mut saved = Vec::new();
    for name in ["first", "second", "third"] {
        study.properties.study_name = name.to_string();
        saved.push(repo.insert_version(&study).unwrap());
    }

    let versions = repo.list_versions("Sleep-Pilot", 10).unwrap();
    let names = versions
        .iter()
        .map(|version| version.study_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, ["third", "second", "first"]);

    assert_eq!(repo.list_versions("Sleep-Pilot", 0).unwrap().len(), 1);
    assert_eq!(
        repo.list_versions("Sleep-Pilot", MAX_VERSION_LIST + 50)
            .unwrap()
            .len(),
        3
    );
    assert_eq!(
        repo.latest("Sleep-Pilot").unwrap().map(|v| v.version_uuid),
        Some(saved[2].version_uuid)
    );
}

#[test]
fn list_studies_summarizes_latest_versions() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudyRepository::try_new(&conn).unwrap();

    let mut study = sample_study();
    repo.insert_version(&study).unwrap();
    study.properties.study_name = "Zeta".to_string();
    let newest = repo.insert_version(&study).unwrap();

    let mut other = sample_study();
    other.properties.study_id = "alpha".to_string();
    other.properties.study_name = "Alpha study".to_string();
    repo.insert_version(&other).unwrap();

    let studies = repo.list_studies().unwrap();
    assert_eq!(studies.len(), 2);
    assert_eq!(studies[0].study_id, "alpha");
    assert_eq!(studies[0].version_count, 1);
    assert_eq!(studies[1].study_name, "Zeta");
    assert_eq!(studies[1].latest_version, newest.version_uuid);
    assert_eq!(studies[1].version_count, 2);
}

#[test]
fn delete_removes_all_versions_and_reports_unknown_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudyRepository::try_new(&conn).unwrap();
    let study = sample_study();
    repo.insert_version(&study).unwrap();
    repo.insert_version(&study).unwrap();

    assert_eq!(repo.delete_study("Sleep-Pilot").unwrap(), 2);
    assert_eq!(repo.latest("Sleep-Pilot").unwrap(), None);
    assert!(matches!(
        repo.delete_study("Sleep-Pilot").unwrap_err(),
        StoreError::NotFound(id) if id == "Sleep-Pilot"
    ));
}

#[test]
fn blank_study_id_is_rejected_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudyRepository::try_new(&conn).unwrap();
    let mut study = sample_study();
    study.properties.study_id = "   ".to_string();

    let err = repo.insert_version(&study).unwrap_err();
    assert_eq!(err.code(), "missing_study_id");
    assert!(repo.list_studies().unwrap().is_empty());
}

#[test]
fn corrupt_document_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO study_versions (version_uuid, study_id, study_name, document, created_at)
         VALUES (?1, 'broken', '', 'not json', 1);",
        [Uuid::new_v4().to_string()],
    )
    .unwrap();
    let repo = SqliteStudyRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.latest("broken").unwrap_err(),
        StoreError::InvalidData(message) if message.contains("document")
    ));
}

#[test]
fn unmigrated_connection_is_refused() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteStudyRepository::try_new(&conn) {
        Err(StoreError::UninitializedConnection {
            actual_version, ..
        }) => assert_eq!(actual_version, 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection was accepted"),
    }
}

#[test]
fn dropped_table_is_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE study_versions;").unwrap();

    assert!(matches!(
        SqliteStudyRepository::try_new(&conn),
        Err(StoreError::MissingRequiredTable("study_versions"))
    ));
}
