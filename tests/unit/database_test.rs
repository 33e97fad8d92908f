//! Unit tests for the Linkshelf database layer (connection + migrations).

use linkshelf::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use linkshelf::database::Database;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_all_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for table in ["bookmarks", "bookmark_tags", "schema_version"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Table '{}' should exist after migrations", table);
    }
}

#[test]
fn test_migrations_create_indexes() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    let expected_indexes = [
        "idx_bookmarks_url",
        "idx_bookmarks_date_added",
        "idx_bookmark_tags_tag",
    ];

    for index in &expected_indexes {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name=?1",
                [index],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Index '{}' should exist after migrations", index);
    }
}

#[test]
fn test_schema_version_recorded() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    assert_eq!(get_schema_version(&db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();
    // Running migrations a second time should not fail
    assert!(run_all(&conn).is_ok(), "Running migrations twice should succeed");
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn test_open_file_database_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("store").join("linkshelf.db");

    let db = Database::open(&db_path);
    assert!(db.is_ok(), "open with file path should succeed");
    assert!(db_path.exists(), "Database file should exist on disk");

    db.unwrap().close().expect("close should succeed");
}

#[test]
fn test_file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("linkshelf.db");

    {
        let db = Database::open(&db_path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO bookmarks (id, title, url, date_added) VALUES ('bm-1', 'Example', 'https://example.com/', 1700000000000)",
                [],
            )
            .unwrap();
        db.close().unwrap();
    }

    let db = Database::open(&db_path).unwrap();
    let url: String = db
        .connection()
        .query_row("SELECT url FROM bookmarks WHERE id = 'bm-1'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(url, "https://example.com/");
}

#[test]
fn test_bookmark_columns_have_defaults() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    conn.execute(
        "INSERT INTO bookmarks (id, title, url, date_added) VALUES (?1, ?2, ?3, 1700000000000)",
        ["bm-1", "Example", "https://example.com/"],
    )
    .expect("Should be able to insert into bookmarks table");

    let (view_count, last_visited, archived, pinned): (i64, Option<i64>, bool, bool) = conn
        .query_row(
            "SELECT view_count, last_visited, archived, pinned FROM bookmarks WHERE id = 'bm-1'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();

    assert_eq!(view_count, 0);
    assert_eq!(last_visited, None);
    assert!(!archived);
    assert!(!pinned);
}

#[test]
fn test_deleting_bookmark_cascades_to_tags() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    conn.execute_batch(
        "INSERT INTO bookmarks (id, title, url, date_added) VALUES ('bm-1', 'Example', 'https://example.com/', 1);
         INSERT INTO bookmark_tags (bookmark_id, position, tag) VALUES ('bm-1', 0, 'rust');
         INSERT INTO bookmark_tags (bookmark_id, position, tag) VALUES ('bm-1', 1, 'web');
         DELETE FROM bookmarks WHERE id = 'bm-1';",
    )
    .unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM bookmark_tags", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0, "Tags should be removed with their bookmark");
}

#[test]
fn test_open_fails_when_parent_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let result = Database::open(blocker.join("store").join("linkshelf.db"));
    assert!(result.is_err(), "open under a regular file should fail");
}

#[test]
fn test_fold_case_function_is_registered() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let folded: String = db
        .connection()
        .query_row("SELECT fold_case('ÄÖÜ Straße ABC')", [], |row| row.get(0))
        .unwrap();
    assert_eq!(folded, "äöü straße abc");
}
