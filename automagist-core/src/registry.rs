//! Durable registry of tracked files.
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   state.json       (pretty JSON, mode 0600, directory mode 0700)
//!   state.json.tmp   (only while a save is in flight)
//! ```
//!
//! # Concurrency
//!
//! Every process (CLI invocation or monitor) holds its own loaded copy and
//! writes the whole snapshot back. There is no locking: the last `save` to
//! complete wins, and a running monitor never re-reads the file.

use std::path::{Path, PathBuf};

use crate::error::{io_err, RegistryError};
use crate::paths;
use crate::types::{Registry, RemoteId, TrackedFile};

/// Owns the canonical in-memory [`Registry`] for one process.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    root: PathBuf,
    files: Registry,
}

impl RegistryStore {
    /// Store rooted at an explicit configuration directory. Nothing is read yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: Registry::new(),
        }
    }

    /// Store rooted at `~/.config/gh-automagist` (uses `dirs::home_dir()`).
    pub fn open_default() -> Result<Self, RegistryError> {
        Ok(Self::new(paths::default_config_root()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> PathBuf {
        paths::state_path(&self.root)
    }

    pub fn marker_path(&self) -> PathBuf {
        paths::marker_path(&self.root)
    }

    // -----------------------------------------------------------------------
    // Load / save
    // -----------------------------------------------------------------------

    /// Read `state.json` into memory.
    ///
    /// A missing file is the first-run state and yields an empty registry.
    /// Malformed content, or a key that is not an absolute path, yields
    /// [`RegistryError::CorruptState`]; the file is left as is.
    pub fn load(&mut self) -> Result<(), RegistryError> {
        let path = self.state_path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                self.files = Registry::new();
                return Ok(());
            }
            Err(err) => return Err(io_err(&path, err)),
        };

        let files: Registry = serde_json::from_str(&contents)
            .map_err(|source| RegistryError::CorruptState { path: path.clone(), source })?;
        if let Some(relative) = files.keys().find(|key| !key.is_absolute()) {
            let source = <serde_json::Error as serde::de::Error>::custom(format!(
                "registry key is not an absolute path: {}",
                relative.display()
            ));
            return Err(RegistryError::CorruptState { path, source });
        }

        self.files = files;
        Ok(())
    }

    /// Atomically write the whole registry to `state.json`.
    ///
    /// Write flow: serialize → `state.json.tmp` → `chmod 0600` → `rename`.
    /// The tmp file lives in the same directory as the target, so the rename
    /// never crosses filesystems. On failure the previous file is untouched.
    pub fn save(&self) -> Result<(), RegistryError> {
        ensure_root(&self.root)?;
        let json = serde_json::to_string_pretty(&self.files)?;
        atomic_write(&self.state_path(), json.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Upsert a tracked file with `status = active`.
    ///
    /// Returns the entry that was replaced, if the path was already tracked.
    pub fn add_tracked(
        &mut self,
        path: PathBuf,
        remote_id: RemoteId,
        updated_at: i64,
    ) -> Result<Option<TrackedFile>, RegistryError> {
        if !path.is_absolute() {
            return Err(RegistryError::NotAbsolute { path });
        }
        Ok(self
            .files
            .insert(path, TrackedFile::active(remote_id, updated_at)))
    }

    /// Remove a tracked file. Returns `None` (and changes nothing) when absent.
    pub fn remove_tracked(&mut self, path: &Path) -> Option<TrackedFile> {
        self.files.remove(path)
    }

    /// Record a local change time for an existing entry.
    pub fn touch(&mut self, path: &Path, updated_at: i64) -> Option<&TrackedFile> {
        let entry = self.files.get_mut(path)?;
        entry.updated_at = updated_at;
        Some(entry)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn get(&self, path: &Path) -> Option<&TrackedFile> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn files(&self) -> &Registry {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

pub(crate) fn ensure_root(root: &Path) -> Result<(), RegistryError> {
    if !root.exists() {
        std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;
        set_dir_permissions(root)?;
    }
    Ok(())
}

/// `<path>.tmp` sibling → `chmod 0600` → `rename`.
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), RegistryError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!("{file_name}.tmp"));

    let written = std::fs::write(&tmp, bytes)
        .map_err(|e| io_err(&tmp, e))
        .and_then(|()| set_file_permissions(&tmp))
        .and_then(|()| std::fs::rename(&tmp, path).map_err(|e| io_err(path, e)));
    if written.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    written
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
