pub mod add;
pub mod list;
pub mod monitor;
pub mod remove;
pub mod status;
pub mod stop;

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use automagist_core::RegistryStore;

pub const RESTART_NOTE: &str = "Note: If 'gh-automagist monitor' is running, please restart it";

/// Store rooted at `--config-dir`, or at the default configuration directory.
pub fn open_store(config_dir: Option<PathBuf>) -> Result<RegistryStore> {
    match config_dir {
        Some(dir) => Ok(RegistryStore::new(dir)),
        None => RegistryStore::open_default().context("could not determine configuration directory"),
    }
}

/// Absolute form of a user-supplied path, matching the keys `add` stores.
///
/// Existing files are canonicalized. For a missing file the parent directory
/// is canonicalized and the file name re-attached, so a deleted file can still
/// be named through a symlinked directory. Without a parent on disk the path
/// is only cleaned lexically.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(path)
    };
    let cleaned = normalize_lexically(&absolute);

    if let (Some(parent), Some(name)) = (cleaned.parent(), cleaned.file_name()) {
        if let Ok(parent) = parent.canonicalize() {
            return Ok(parent.join(name));
        }
    }
    Ok(cleaned)
}

/// Drop `.` components and fold `..` into its parent without touching disk.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Local-time rendering of a unix timestamp for tables.
pub fn format_timestamp(unix: i64) -> String {
    DateTime::from_timestamp(unix, 0)
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| unix.to_string())
}

/// Load the registry, naming the state file when it cannot be read.
pub fn load_store(store: &mut RegistryStore) -> Result<()> {
    store
        .load()
        .with_context(|| format!("failed to load {}", store.state_path().display()))
}
