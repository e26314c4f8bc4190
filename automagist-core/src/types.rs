//! Domain types for the automagist registry.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! The on-disk shape is fixed: `{"<abs path>": {"gist_id", "updated_at", "status"}}`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque identifier of the remote document a tracked file syncs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(pub String);

impl RemoteId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RemoteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RemoteId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Sync state of a tracked file. Only `Active` exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Active,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Active => write!(f, "active"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One monitored local file. The absolute path is the registry key, not a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedFile {
    #[serde(rename = "gist_id")]
    pub remote_id: RemoteId,
    /// Unix seconds of the last observed local change.
    pub updated_at: i64,
    #[serde(default)]
    pub status: FileStatus,
}

impl TrackedFile {
    pub fn active(remote_id: RemoteId, updated_at: i64) -> Self {
        Self {
            remote_id,
            updated_at,
            status: FileStatus::Active,
        }
    }
}

/// Full durable state: absolute path → tracked file.
///
/// A `BTreeMap` keeps serialization order stable, so an unmodified
/// load → save cycle reproduces the same bytes.
pub type Registry = BTreeMap<PathBuf, TrackedFile>;

/// A qualifying change to a tracked file, already persisted to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub remote_id: RemoteId,
    pub updated_at: i64,
}

/// Current wall-clock time in Unix seconds.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
