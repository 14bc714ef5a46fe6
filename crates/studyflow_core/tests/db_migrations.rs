use rusqlite::Connection;
use studyflow_core::db::migrations::{current_user_version, latest_version};
use studyflow_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn in_memory_database_is_fully_migrated() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_schema_object(&conn, "table", "study_versions");
    assert_schema_object(&conn, "index", "idx_study_versions_study_created");
}

#[test]
fn reopening_a_study_file_keeps_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studies.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO study_versions (version_uuid, study_id, study_name, document, created_at)
             VALUES ('v1', 'pilot', 'Pilot', '{}', 1);",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(current_user_version(&second).unwrap(), latest_version());
    let rows: i64 = second
        .query_row("SELECT COUNT(*) FROM study_versions;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn missing_parent_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("studies.db");

    let conn = open_db(&path).unwrap();

    assert!(path.exists());
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
}

#[test]
fn blank_study_id_violates_the_table_check() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO study_versions (version_uuid, study_id, document, created_at)
         VALUES ('v1', '', '{}', 1);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
