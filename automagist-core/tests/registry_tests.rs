//! Registry store load/save semantics, corrupt-state reporting and atomic-write safety.

use assert_fs::prelude::*;
use automagist_core::{RegistryError, RegistryStore, RemoteId};
use predicates::prelude::predicate;
use std::fs;
use std::path::PathBuf;

fn tracked() -> PathBuf {
    PathBuf::from("/Users/test/workspace/file.txt")
}

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

#[test]
fn load_without_state_file_is_empty_and_ok() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let mut store = RegistryStore::new(root.path());
    store.load().expect("missing file is the first-run state");
    assert!(store.is_empty());
    root.child("state.json").assert(predicate::path::missing());
}

#[test]
fn load_corrupt_json_returns_corrupt_state_with_path() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("state.json").write_str("{ \"/a\": { broken").expect("write");

    let mut store = RegistryStore::new(root.path());
    let err = store.load().unwrap_err();
    assert!(matches!(err, RegistryError::CorruptState { .. }), "got: {err}");
    assert!(err.to_string().contains("state.json"), "must contain file path, got: {err}");
}

#[test]
fn load_wrong_shape_returns_corrupt_state() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("state.json").write_str("[\"this is a list\"]").expect("write");

    let mut store = RegistryStore::new(root.path());
    let err = store.load().unwrap_err();
    assert!(matches!(err, RegistryError::CorruptState { .. }), "got: {err}");
}

#[test]
fn load_relative_key_returns_corrupt_state() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("state.json")
        .write_str(r#"{"notes.md":{"gist_id":"g","updated_at":1,"status":"active"}}"#)
        .expect("write");

    let mut store = RegistryStore::new(root.path());
    let err = store.load().unwrap_err();
    assert!(matches!(err, RegistryError::CorruptState { .. }), "got: {err}");
}

#[test]
fn corrupt_state_is_never_rewritten_by_load() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("state.json").write_str("garbage").expect("write");

    let mut store = RegistryStore::new(root.path());
    let _ = store.load();
    root.child("state.json").assert("garbage");
}

// ---------------------------------------------------------------------------
// 2. Mutation semantics
// ---------------------------------------------------------------------------

#[test]
fn re_registration_overwrites_instead_of_duplicating() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let mut store = RegistryStore::new(root.path());
    store.add_tracked(tracked(), RemoteId::from("first"), 100).expect("add");
    let replaced = store
        .add_tracked(tracked(), RemoteId::from("second"), 200)
        .expect("re-add");

    assert_eq!(replaced.map(|f| f.remote_id), Some(RemoteId::from("first")));
    assert_eq!(store.len(), 1);
    let entry = store.get(&tracked()).expect("entry");
    assert_eq!(entry.remote_id, RemoteId::from("second"));
    assert_eq!(entry.updated_at, 200);
}

#[test]
fn removing_untracked_path_is_a_noop() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let mut store = RegistryStore::new(root.path());
    store.add_tracked(tracked(), RemoteId::from("gist1"), 100).expect("add");
    let before = store.files().clone();

    assert!(store.remove_tracked(&PathBuf::from("/not/tracked")).is_none());
    assert_eq!(store.files(), &before);
}

#[test]
fn remove_then_reload_drops_entry() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let mut store = RegistryStore::new(root.path());
    store.add_tracked(tracked(), RemoteId::from("gist1"), 100).expect("add");
    store.save().expect("save");

    assert!(store.remove_tracked(&tracked()).is_some());
    store.save().expect("save");

    let mut fresh = RegistryStore::new(root.path());
    fresh.load().expect("load");
    assert!(fresh.is_empty());
}

// ---------------------------------------------------------------------------
// 3. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn mid_write_crash_leaves_original_intact() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let mut store = RegistryStore::new(root.path());
    store.add_tracked(tracked(), RemoteId::from("gist1"), 100).expect("add");
    store.save().expect("save");
    let original_bytes = fs::read(store.state_path()).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    let tmp = store.state_path().with_file_name("state.json.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    let mut fresh = RegistryStore::new(root.path());
    fresh.load().expect("load ignores the orphan tmp");
    assert_eq!(fresh.files(), store.files());
    assert_eq!(original_bytes, fs::read(store.state_path()).expect("read after crash"));
}

#[test]
fn save_overwrites_orphan_tmp_from_earlier_crash() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("state.json.tmp").write_str("CRASH").expect("write");

    let mut store = RegistryStore::new(root.path());
    store.add_tracked(tracked(), RemoteId::from("gist1"), 100).expect("add");
    store.save().expect("save");

    root.child("state.json.tmp").assert(predicate::path::missing());
    root.child("state.json").assert(predicate::str::contains("gist1"));
}

#[test]
fn save_is_idempotent() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let mut store = RegistryStore::new(root.path());
    store.add_tracked(tracked(), RemoteId::from("gist1"), 100).expect("add");
    store.save().expect("first");
    let first = fs::read(store.state_path()).expect("read");
    store.save().expect("second");
    assert_eq!(first, fs::read(store.state_path()).expect("read"));
}

// ---------------------------------------------------------------------------
// 4. Process marker lifecycle
// ---------------------------------------------------------------------------

#[test]
fn marker_file_holds_plain_decimal_pid() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let store = RegistryStore::new(root.path());
    let pid = store.write_process_marker().expect("write marker");

    root.child("monitor.pid").assert(pid.to_string());
    store.delete_process_marker().expect("delete");
    root.child("monitor.pid").assert(predicate::path::missing());
}
