//! Error handling and edge case tests.

use logbook::autosave::payload::{payload_path, read_payload, write_payload};
use logbook::{
    AddOrDelete, AutoSaveRecord, EditorConfig, EditorError, EditorSession, Entity, EntityId,
    Notice, NoticeConfig, NoticeFilter, RetentionIndex, Scene, Timestamp, CATALOG_FILE,
};
use std::fs;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn test_session(dir: &TempDir) -> EditorSession<Scene> {
    let mut config = EditorConfig::default();
    config.autosave.directory = dir.path().join(".AutoSaves");
    EditorSession::open(config, Scene::new("Kastrull"))
}

fn record(dir: &TempDir, secs: u64) -> AutoSaveRecord {
    AutoSaveRecord {
        file_path: dir.path().join(format!("autosave_{secs}.sav")),
        document_name: "Kastrull".to_string(),
        saved_at_secs: secs,
    }
}

/// Tick until the in-flight save has reported back.
fn settle(session: &mut EditorSession<Scene>) {
    let now = Instant::now();
    let deadline = now + Duration::from_secs(10);
    while session.is_autosaving() {
        assert!(Instant::now() < deadline, "autosave did not finish");
        if session.pending_jobs() == 0 {
            thread::sleep(Duration::from_millis(5));
        }
        session.tick(now, false, true);
    }
}

// --- History Boundaries ---

#[test]
fn test_undo_redo_on_empty_history() {
    let dir = TempDir::new().unwrap();
    let mut session = test_session(&dir);

    assert_eq!(session.undo(1), 0);
    assert_eq!(session.redo(1), 0);
    assert_eq!(session.jump_to(5), 0);
    assert_eq!(session.history().cursor(), 0);
}

#[test]
fn test_undo_more_than_available() {
    let dir = TempDir::new().unwrap();
    let mut session = test_session(&dir);
    session.perform(AddOrDelete::added(vec![Entity::new(EntityId(1), "Hatch")]));
    session.perform(AddOrDelete::added(vec![Entity::new(EntityId(2), "Hatch")]));

    assert_eq!(session.undo(10), 2);
    assert_eq!(session.undo(1), 0);
    assert_eq!(session.redo(10), 2);
    assert_eq!(session.redo(1), 0);
    assert_eq!(session.document().len(), 2);
}

#[test]
fn test_operations_on_missing_entities_are_ignored() {
    let dir = TempDir::new().unwrap();
    let mut session = test_session(&dir);

    // Deleting something that is not there must not panic, and undo puts
    // the captured entity back.
    session.perform(AddOrDelete::deleted(vec![Entity::new(EntityId(9), "Ghost")]));
    assert_eq!(session.document().len(), 0);
    session.undo(1);
    assert_eq!(session.document().len(), 1);
}

// --- Config Errors ---

#[test]
fn test_bad_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("editor.toml");
    fs::write(&path, "[autosave]\nenabled = \"sometimes\"").unwrap();

    let result = EditorConfig::load(&path);
    assert!(matches!(result, Err(EditorError::Config(_))));
    assert_eq!(EditorConfig::load_or_default(&path), EditorConfig::default());
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.toml");

    assert!(matches!(EditorConfig::load(&path), Err(EditorError::Config(_))));
    assert_eq!(EditorConfig::load_or_default(&path), EditorConfig::default());
}

// --- Catalog Errors ---

#[test]
fn test_corrupt_catalog_starts_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CATALOG_FILE), b"{ not json").unwrap();

    let mut index = RetentionIndex::load_or_init(dir.path(), 4);
    assert!(index.is_empty());
    assert!(index.is_persistent());

    // The next insert overwrites the corrupt file.
    index.insert(record(&dir, 10));
    let reloaded = RetentionIndex::load_or_init(dir.path(), 4);
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn test_eviction_tolerates_missing_payload() {
    let dir = TempDir::new().unwrap();
    let mut index = RetentionIndex::load_or_init(dir.path(), 1);

    // Neither payload file exists on disk.
    index.insert(record(&dir, 10));
    let evicted = index.insert(record(&dir, 20));

    assert_eq!(evicted, vec![record(&dir, 10)]);
    assert_eq!(index.entries(), &[record(&dir, 20)]);
}

// --- Payload Errors ---

#[test]
fn test_restore_unknown_handle() {
    let dir = TempDir::new().unwrap();
    let mut session = test_session(&dir);
    session.select(Instant::now());
    session.perform(AddOrDelete::added(vec![Entity::new(EntityId(1), "Hatch")]));

    // A handle from another session's catalog.
    let mut other = RetentionIndex::load_or_init(dir.path().join("other"), 4);
    other.insert(record(&dir, 10));
    let handle = other.menu_entries(Timestamp::from_secs(10))[0].handle.clone();

    let result = session.restore_autosave(&handle);
    assert!(matches!(result, Err(EditorError::AutoSaveNotFound(_))));
    assert_eq!(session.document().len(), 1);
}

#[test]
fn test_restore_with_deleted_payload() {
    let dir = TempDir::new().unwrap();

    // Catalog entry whose file was removed behind our back.
    let mut index = RetentionIndex::load_or_init(dir.path().join(".AutoSaves"), 4);
    index.insert(AutoSaveRecord {
        file_path: payload_path(index.dir(), Timestamp::from_secs(5)),
        document_name: "Kastrull".to_string(),
        saved_at_secs: 5,
    });
    drop(index);

    let mut session = test_session(&dir);
    let handle = session.autosave_menu(Timestamp::from_secs(5))[0].handle.clone();
    let result = session.restore_autosave(&handle);
    assert!(matches!(result, Err(EditorError::Io(_))));
}

#[test]
fn test_truncated_payload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("autosave_1.sav");
    write_payload(&path, &[7u8; 4096]).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(read_payload(&path).is_err());
}

#[test]
fn test_foreign_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("autosave_1.sav");
    fs::write(&path, b"PK\x03\x04 definitely a zip file").unwrap();

    assert!(matches!(read_payload(&path), Err(EditorError::InvalidFormat(_))));
}

#[test]
fn test_corrupt_snapshot_fails_restore() {
    let dir = TempDir::new().unwrap();

    // Valid payload container, but the snapshot inside is not a scene.
    let mut index = RetentionIndex::load_or_init(dir.path().join(".AutoSaves"), 4);
    let path = payload_path(index.dir(), Timestamp::from_secs(5));
    write_payload(&path, b"not a scene").unwrap();
    index.insert(AutoSaveRecord {
        file_path: path,
        document_name: "Kastrull".to_string(),
        saved_at_secs: 5,
    });
    drop(index);

    let mut session = test_session(&dir);
    session.perform(AddOrDelete::added(vec![Entity::new(EntityId(1), "Hatch")]));

    let handle = session.autosave_menu(Timestamp::from_secs(5))[0].handle.clone();
    let result = session.restore_autosave(&handle);
    assert!(matches!(result, Err(EditorError::Deserialization(_))));
    // The current document and its history are untouched.
    assert_eq!(session.document().len(), 1);
    assert!(session.history().can_undo());
}

#[test]
fn test_autosave_disabled() {
    let dir = TempDir::new().unwrap();
    let mut config = EditorConfig::default();
    config.autosave.directory = dir.path().join(".AutoSaves");
    config.autosave.enabled = false;
    let mut session = EditorSession::open(config, Scene::new("Kastrull"));
    session.select(Instant::now());
    session.perform(AddOrDelete::added(vec![Entity::new(EntityId(1), "Hatch")]));

    assert!(!session.autosave_now());
    assert!(session.retention().is_empty());
}

// --- Autosave Failures ---

#[test]
fn test_failed_write_skips_catalog_and_releases_guard() {
    let dir = TempDir::new().unwrap();
    let mut session = test_session(&dir);
    let notices = session.subscribe_notices(NoticeConfig {
        filter: NoticeFilter::autosave(),
        ..Default::default()
    });
    session.select(Instant::now());
    session.perform(AddOrDelete::added(vec![Entity::new(EntityId(1), "Hatch")]));

    // A regular file where the autosave directory should be.
    let autosaves = session.retention().dir().to_path_buf();
    fs::remove_dir_all(&autosaves).unwrap();
    fs::write(&autosaves, b"in the way").unwrap();

    assert!(session.autosave_now());
    settle(&mut session);

    assert_eq!(session.retention().len(), 0);
    assert!(!session.is_autosaving());
    assert!(matches!(
        notices.recv_timeout(Duration::from_secs(1)),
        Ok(Notice::AutoSaveFailed { .. })
    ));

    // Once the obstacle is gone the next request goes through.
    fs::remove_file(&autosaves).unwrap();
    assert!(session.autosave_now());
    settle(&mut session);
    assert_eq!(session.retention().len(), 1);
    assert!(matches!(
        notices.recv_timeout(Duration::from_secs(1)),
        Ok(Notice::AutoSaved { .. })
    ));
}

#[test]
fn test_directory_removed_mid_session_is_recreated() {
    let dir = TempDir::new().unwrap();
    let mut session = test_session(&dir);
    session.select(Instant::now());
    session.perform(AddOrDelete::added(vec![Entity::new(EntityId(1), "Hatch")]));

    fs::remove_dir_all(session.retention().dir()).unwrap();

    assert!(session.autosave_now());
    settle(&mut session);

    assert_eq!(session.retention().len(), 1);
    assert!(session.retention().entries()[0].file_path.exists());
    assert!(session.retention().catalog_path().exists());
}

#[test]
fn test_uncreatable_directory_runs_in_memory() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();

    let mut config = EditorConfig::default();
    config.autosave.directory = blocker.join(".AutoSaves");
    let mut session = EditorSession::open(config, Scene::new("Kastrull"));
    assert!(!session.retention().is_persistent());

    session.select(Instant::now());
    session.perform(AddOrDelete::added(vec![Entity::new(EntityId(1), "Hatch")]));
    assert!(!session.autosave_now());
    assert!(!session.is_autosaving());
    assert!(session.retention().is_empty());
}
