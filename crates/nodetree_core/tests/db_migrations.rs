use nodetree_core::db::migrations::latest_version;
use nodetree_core::db::{open_db, open_db_in_memory, DbError};
use nodetree_core::{RepoError, SqliteNodeRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations_and_seeds_root() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    let (parent_id, title, ordering): (i64, String, i64) = conn
        .query_row(
            "SELECT parentId, title, ordering FROM nodes WHERE id = 1;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(parent_id, 0);
    assert_eq!(title, "Root");
    assert_eq!(ordering, 1);
}

#[test]
fn reopening_file_database_keeps_rows_and_single_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO nodes (parentId, title, ordering) VALUES (1, 'Child', 1);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM nodes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
    let roots: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM nodes WHERE parentId = 0;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(roots, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
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

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteNodeRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}
