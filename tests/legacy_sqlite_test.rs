use pdastore::drive::memory::MemDrive;
use pdastore::legacy::{migrate_legacy, LegacySource, MigrationReport, SqliteLegacySource};
use pdastore::store::RecordStore;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn create_legacy_db(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE bookmarks (
            profileId INTEGER,
            url TEXT,
            title TEXT,
            pinned INTEGER,
            createdAt INTEGER,
            tags TEXT,
            notes TEXT,
            PRIMARY KEY (profileId, url)
        );
        INSERT INTO bookmarks VALUES (0, 'https://beakerbrowser.com/', 'Beaker', 1, 1500000000, '', 'the browser');
        INSERT INTO bookmarks VALUES (0, 'dat://example.com/docs/', 'Docs', 0, 1500000100, 'docs', NULL);
        INSERT INTO bookmarks VALUES (0, '', 'Broken', 0, 1500000200, '', NULL);",
    )
    .unwrap();
}

#[tokio::test]
async fn test_reads_legacy_rows() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("beaker.db");
    create_legacy_db(&db);

    let rows = SqliteLegacySource::new(&db).load().await.unwrap();
    assert_eq!(rows.len(), 3);
    let beaker = rows
        .iter()
        .find(|r| r.url == "https://beakerbrowser.com/")
        .unwrap();
    assert_eq!(beaker.title.as_deref(), Some("Beaker"));
    assert_eq!(beaker.notes.as_deref(), Some("the browser"));
    assert_eq!(beaker.created_at.unwrap().timestamp(), 1_500_000_000);
}

#[tokio::test]
async fn test_database_without_bookmarks_table() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("empty.db");
    Connection::open(&db)
        .unwrap()
        .execute_batch("CREATE TABLE settings (key TEXT, value TEXT);")
        .unwrap();

    assert!(SqliteLegacySource::new(&db).load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_migrate_from_sqlite_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("beaker.db");
    create_legacy_db(&db);

    let drive = Arc::new(MemDrive::new());
    let store = RecordStore::bookmarks(Arc::clone(&drive));
    let source = SqliteLegacySource::new(&db);

    let report = migrate_legacy(&store, &source).await.unwrap();
    assert_eq!(
        report,
        MigrationReport {
            migrated: 2,
            skipped: 1
        }
    );
    let first_paths = drive.paths().await;
    assert_eq!(first_paths.len(), 2);

    migrate_legacy(&store, &source).await.unwrap();
    assert_eq!(drive.paths().await, first_paths);

    let docs = store.get("dat://example.com/docs").await.unwrap().unwrap();
    assert_eq!(docs.title.as_deref(), Some("Docs"));
    assert!(!docs.is_public());
    assert_eq!(docs.created_at.unwrap().timestamp(), 1_500_000_100);

    let beaker = store.get("https://beakerbrowser.com").await.unwrap().unwrap();
    assert_eq!(beaker.description.as_deref(), Some("the browser"));
}
