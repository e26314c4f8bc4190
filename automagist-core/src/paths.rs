//! File layout under the configuration root.
//!
//! ```text
//! ~/.config/gh-automagist/
//!   state.json     (registry, mode 0600)
//!   monitor.pid    (process marker)
//!   config.yaml    (optional settings)
//!   logs/
//!     monitor.log  (detached monitor output)
//! ```

use std::path::{Path, PathBuf};

use crate::error::RegistryError;

pub const APP_DIR: &str = "gh-automagist";
pub const STATE_FILE: &str = "state.json";
pub const MARKER_FILE: &str = "monitor.pid";
pub const SETTINGS_FILE: &str = "config.yaml";

/// `<home>/.config/gh-automagist`. Pure, no I/O.
pub fn config_root_at(home: &Path) -> PathBuf {
    home.join(".config").join(APP_DIR)
}

/// `config_root_at` convenience wrapper using `dirs::home_dir()`.
pub fn default_config_root() -> Result<PathBuf, RegistryError> {
    let home = dirs::home_dir().ok_or(RegistryError::HomeNotFound)?;
    Ok(config_root_at(&home))
}

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

pub fn marker_path(root: &Path) -> PathBuf {
    root.join(MARKER_FILE)
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

pub fn logs_dir(root: &Path) -> PathBuf {
    root.join("logs")
}
