//! Save → fresh load roundtrip tests for the registry file.
//!
//! Each `#[case]` is isolated; no shared state.

use automagist_core::{FileStatus, RegistryStore, RemoteId};
use rstest::rstest;
use std::path::PathBuf;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn entries(n: usize) -> Vec<(PathBuf, RemoteId, i64)> {
    (0..n)
        .map(|i| {
            (
                PathBuf::from(format!("/home/user/dir{}/file{i}.txt", i % 3)),
                RemoteId::from(format!("gist{i:04}")),
                1_700_000_000 + i as i64,
            )
        })
        .collect()
}

fn unicode_entries() -> Vec<(PathBuf, RemoteId, i64)> {
    vec![
        (PathBuf::from("/home/user/ノート/日本語.md"), RemoteId::from("a1b2"), 1),
        (PathBuf::from("/home/user/проект/файл.txt"), RemoteId::from("c3d4"), 2),
        (PathBuf::from("/home/user/with space/\"quoted\".lua"), RemoteId::from("e5f6"), 3),
    ]
}

// ---------------------------------------------------------------------------
// Parameterised roundtrip test
// ---------------------------------------------------------------------------

#[rstest]
#[case("empty", entries(0))]
#[case("single", entries(1))]
#[case("shared_directories", entries(7))]
#[case("unicode_paths", unicode_entries())]
fn registry_roundtrip(#[case] label: &str, #[case] input: Vec<(PathBuf, RemoteId, i64)>) {
    let root = TempDir::new().expect("tempdir");
    let mut store = RegistryStore::new(root.path());
    for (path, id, ts) in &input {
        store
            .add_tracked(path.clone(), id.clone(), *ts)
            .unwrap_or_else(|e| panic!("[{label}] add failed: {e}"));
    }
    store.save().unwrap_or_else(|e| panic!("[{label}] save failed: {e}"));

    let mut fresh = RegistryStore::new(root.path());
    fresh.load().unwrap_or_else(|e| panic!("[{label}] load failed: {e}"));

    assert_eq!(fresh.len(), input.len(), "[{label}] entry count");
    for (path, id, ts) in &input {
        let got = fresh.get(path).unwrap_or_else(|| panic!("[{label}] missing {}", path.display()));
        assert_eq!(&got.remote_id, id, "[{label}] remote id");
        assert_eq!(got.updated_at, *ts, "[{label}] updated_at");
        assert_eq!(got.status, FileStatus::Active, "[{label}] status");
    }
}

// ---------------------------------------------------------------------------
// Byte-level stability
// ---------------------------------------------------------------------------

#[test]
fn unmodified_resave_is_byte_identical() {
    let root = TempDir::new().expect("tempdir");
    let mut store = RegistryStore::new(root.path());
    for (path, id, ts) in entries(5) {
        store.add_tracked(path, id, ts).expect("add");
    }
    store.save().expect("save");
    let first = std::fs::read(store.state_path()).expect("read");

    let mut fresh = RegistryStore::new(root.path());
    fresh.load().expect("load");
    fresh.save().expect("resave");
    assert_eq!(first, std::fs::read(fresh.state_path()).expect("read"));
}

#[test]
fn loads_file_written_in_wire_format() {
    let root = TempDir::new().expect("tempdir");
    std::fs::write(
        root.path().join("state.json"),
        r#"{
  "/Users/test/workspace/file.txt": {
    "gist_id": "abcdef123456",
    "updated_at": 1700000000,
    "status": "active"
  }
}"#,
    )
    .expect("write");

    let mut store = RegistryStore::new(root.path());
    store.load().expect("load");
    let entry = store
        .get(&PathBuf::from("/Users/test/workspace/file.txt"))
        .expect("entry");
    assert_eq!(entry.remote_id, RemoteId::from("abcdef123456"));
    assert_eq!(entry.updated_at, 1_700_000_000);

    // Re-saving reproduces the same pretty-printed shape.
    store.save().expect("save");
    let text = std::fs::read_to_string(store.state_path()).expect("read");
    assert!(text.contains("  \"/Users/test/workspace/file.txt\": {\n    \"gist_id\": \"abcdef123456\","));
}
