//! Tests for the SQLite record repository.

use swap_puzzle::{LevelId, LevelRecord, RecordMap, RecordPersistence, RecordStore, SqliteRecordRepository};
use tempfile::NamedTempFile;

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready repository.
fn setup_test_db() -> (NamedTempFile, SqliteRecordRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = SqliteRecordRepository::open(db_path).expect("Failed to open repository");
    (db_file, repo)
}

fn map(entries: &[(&str, u32, u32)]) -> RecordMap {
    entries
        .iter()
        .map(|(id, time, moves)| (LevelId::from(*id), LevelRecord::new(*time, *moves)))
        .collect()
}

#[test]
fn test_empty_database_has_no_records() {
    let (_db, repo) = setup_test_db();
    assert!(repo.list().expect("List failed").is_empty());
    assert!(repo.load_records().expect("Load failed").is_empty());
}

#[test]
fn test_empty_path_rejected() {
    assert!(SqliteRecordRepository::new("  ".to_string()).is_err());
}

#[test]
fn test_replace_then_load_round_trip() {
    let (_db, repo) = setup_test_db();
    let records = map(&[("1", 75, 12), ("custom", 300, 40)]);

    repo.replace_records(&records).expect("Save failed");

    assert_eq!(repo.load_records().expect("Load failed"), records);
    let row = repo.get(&LevelId::from("1")).expect("Query failed").expect("Row missing");
    assert_eq!(*row.time_seconds(), 75);
    assert_eq!(*row.moves(), 12);
}

#[test]
fn test_get_missing_level() {
    let (_db, repo) = setup_test_db();
    assert!(repo.get(&LevelId::from("nope")).expect("Query failed").is_none());
}

#[test]
fn test_rows_ordered_by_level_id() {
    let (_db, repo) = setup_test_db();
    repo.replace_records(&map(&[("b", 1, 1), ("a", 2, 2), ("c", 3, 3)]))
        .expect("Save failed");

    let ids: Vec<String> = repo
        .list()
        .expect("List failed")
        .iter()
        .map(|row| row.level_id().clone())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn test_unchanged_rows_keep_achieved_at() {
    let (_db, repo) = setup_test_db();
    repo.replace_records(&map(&[("a", 10, 5)])).expect("Save failed");
    let before = *repo
        .get(&LevelId::from("a"))
        .expect("Query failed")
        .expect("Row missing")
        .achieved_at();

    repo.replace_records(&map(&[("a", 10, 5), ("b", 20, 8)]))
        .expect("Save failed");

    let after = *repo
        .get(&LevelId::from("a"))
        .expect("Query failed")
        .expect("Row missing")
        .achieved_at();
    assert_eq!(before, after);
}

#[test]
fn test_improved_row_replaced_and_stale_row_deleted() {
    let (_db, repo) = setup_test_db();
    repo.replace_records(&map(&[("a", 10, 5), ("b", 20, 8)]))
        .expect("Save failed");

    repo.replace_records(&map(&[("a", 9, 4)])).expect("Save failed");

    assert_eq!(repo.load_records().expect("Load failed"), map(&[("a", 9, 4)]));
}

#[test]
fn test_reopen_runs_no_duplicate_migrations() {
    let (db, repo) = setup_test_db();
    repo.replace_records(&map(&[("a", 10, 5)])).expect("Save failed");

    let reopened = SqliteRecordRepository::open(repo.db_path().to_string()).expect("Reopen failed");
    assert_eq!(reopened.load_records().expect("Load failed"), map(&[("a", 10, 5)]));
    drop(db);
}

#[test]
fn test_repository_backs_record_store() {
    let (_db, repo) = setup_test_db();
    let level = LevelId::from("1");

    let mut store = RecordStore::open(repo.clone());
    assert!(store.compare_and_store(&level, 60, 10).improved);
    assert!(!store.compare_and_store(&level, 90, 20).improved);
    assert!(store.compare_and_store(&level, 60, 8).improved);
    assert!(!store.is_save_pending());

    // A fresh store sees what the first one persisted.
    let reloaded = RecordStore::open(repo.clone());
    assert_eq!(reloaded.record(&level), Some(LevelRecord::new(60, 8)));
    assert_eq!(RecordPersistence::load(&repo).expect("Load failed").len(), 1);
}
