use super::*;
use crate::records::{MedicationEntry, MoodEntry, WaterEntry};
use chrono::DateTime;
use std::fs;
use tempfile::{tempdir, TempDir};

fn store_in_temp() -> (TempDir, DataStore) {
    let dir = tempdir().unwrap();
    let store = DataStore::new(dir.path().join("profile").join("data.json"));
    (dir, store)
}

fn sample_document() -> DataDocument {
    let ts = DateTime::parse_from_rfc3339("2026-02-25T07:34:00-05:00").unwrap();
    let mut doc = DataDocument::new();
    doc.append_mood(MoodEntry::new(ts, 7).unwrap()).unwrap();
    doc.append_medication(MedicationEntry::new(ts, "Vyvanse", "30 mg").unwrap())
        .unwrap();
    doc.append_water(WaterEntry::new(ts, 16).unwrap()).unwrap();
    doc
}

fn leftover_temp_files(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().ends_with(TEMP_FILE_SUFFIX))
                .unwrap_or(false)
        })
        .collect()
}

#[test]
fn test_init_creates_empty_document() {
    let (_dir, store) = store_in_temp();

    assert_eq!(store.init().unwrap(), InitOutcome::Created);

    let doc = store.load().unwrap();
    assert_eq!(doc, DataDocument::new());

    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.ends_with("}\n"));
    assert!(raw.contains("\"version\": 1"));
}

#[test]
fn test_init_twice_is_idempotent() {
    let (_dir, store) = store_in_temp();
    store.init().unwrap();
    let doc = sample_document();
    store.save(&doc).unwrap();

    assert_eq!(store.init().unwrap(), InitOutcome::AlreadyValid);
    assert_eq!(store.load().unwrap(), doc);
}

#[test]
fn test_init_rejects_malformed_existing_file() {
    let (_dir, store) = store_in_temp();
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    fs::write(store.path(), "{ not json").unwrap();

    match store.init() {
        Err(AppError::Validation(msg)) => assert!(msg.contains("data.json")),
        other => panic!("Expected Validation error, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
}

#[test]
fn test_load_missing_file_is_not_found() {
    let (_dir, store) = store_in_temp();

    match store.load() {
        Err(AppError::NotFound { path }) => assert_eq!(path, store.path()),
        other => panic!("Expected NotFound error, got {:?}", other),
    }
}

#[test]
fn test_load_rejects_empty_and_unknown_fields() {
    let (_dir, store) = store_in_temp();
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();

    fs::write(store.path(), "  \n").unwrap();
    assert!(matches!(store.load(), Err(AppError::Validation(_))));

    fs::write(
        store.path(),
        r#"{"version": 1, "moods": [], "medications": [], "extra": true}"#,
    )
    .unwrap();
    assert!(matches!(store.load(), Err(AppError::Validation(_))));

    fs::write(
        store.path(),
        r#"{"version": 3, "moods": [], "medications": []}"#,
    )
    .unwrap();
    match store.load() {
        Err(AppError::Validation(msg)) => assert!(msg.contains("schema version 3")),
        other => panic!("Expected Validation error, got {:?}", other),
    }
}

#[test]
fn test_save_then_load_round_trips() {
    let (_dir, store) = store_in_temp();
    let doc = sample_document();

    store.save(&doc).unwrap();

    assert_eq!(store.load().unwrap(), doc);
    assert!(leftover_temp_files(store.path().parent().unwrap()).is_empty());
}

#[test]
fn test_dropped_stage_leaves_previous_file_intact() {
    let (_dir, store) = store_in_temp();
    store.init().unwrap();
    let before = fs::read(store.path()).unwrap();

    let pending = store.stage(&sample_document()).unwrap();
    let temp_path = pending.temp_path().to_path_buf();
    assert!(temp_path.exists());
    assert_eq!(temp_path.parent(), store.path().parent());

    // Simulated crash between write and rename.
    drop(pending);

    assert_eq!(fs::read(store.path()).unwrap(), before);
    assert!(!temp_path.exists());
    assert!(leftover_temp_files(store.path().parent().unwrap()).is_empty());
}

#[test]
fn test_commit_replaces_target() {
    let (_dir, store) = store_in_temp();
    store.init().unwrap();

    let doc = sample_document();
    let pending = store.stage(&doc).unwrap();
    assert_eq!(store.load().unwrap(), DataDocument::new());

    pending.commit().unwrap();
    assert_eq!(store.load().unwrap(), doc);
}

#[test]
fn test_update_failure_writes_nothing() {
    let (_dir, store) = store_in_temp();
    store.init().unwrap();
    let before = fs::read(store.path()).unwrap();

    let result: AppResult<()> =
        store.update(|_| Err(AppError::Validation("rejected".to_string())));

    assert!(result.is_err());
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn test_guard_blocks_every_operation() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    let store = DataStore::new(dir.path().join("data.json"));

    assert!(matches!(store.init(), Err(AppError::Safety { .. })));
    assert!(matches!(store.load(), Err(AppError::Safety { .. })));
    assert!(matches!(
        store.save(&DataDocument::new()),
        Err(AppError::Safety { .. })
    ));
    assert!(!store.path().exists());
}

#[test]
fn test_guard_override_allows_repo_path() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    let store = DataStore::new(dir.path().join("data.json")).allow_repo_data_path(true);

    assert_eq!(store.init().unwrap(), InitOutcome::Created);
    assert!(store.load().is_ok());
}

#[cfg(unix)]
#[test]
fn test_permissions_are_owner_only() {
    let (_dir, store) = store_in_temp();
    store.init().unwrap();

    assert_eq!(store.file_mode().unwrap(), Some(0o600));

    let dir_mode = fs::metadata(store.path().parent().unwrap())
        .unwrap()
        .permissions()
        .mode()
        & 0o777;
    assert_eq!(dir_mode, 0o700);
}

#[cfg(unix)]
#[test]
fn test_file_mode_missing_file() {
    let (_dir, store) = store_in_temp();
    assert_eq!(store.file_mode().unwrap(), None);
}
