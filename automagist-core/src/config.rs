//! Optional user settings read from `<root>/config.yaml`.
//!
//! Every field has a default, so a missing file or a partial file is fine:
//!
//! ```yaml
//! api_base_url: https://github.example.com/api/v3
//! public_by_default: true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, RegistryError};
use crate::paths::settings_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the gist REST API.
    pub api_base_url: String,
    /// Visibility of gists created by `add` without `--public`.
    pub public_by_default: bool,
    /// Prepended to the file name to form a new gist's description.
    pub description_prefix: String,
    pub request_timeout_secs: u64,
    /// How many times `monitor --daemon` checks for the process marker.
    pub startup_poll_attempts: u32,
    pub startup_poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            public_by_default: false,
            description_prefix: "Automagist: ".to_string(),
            request_timeout_secs: 30,
            startup_poll_attempts: 6,
            startup_poll_interval_ms: 500,
        }
    }
}

impl Settings {
    /// Load `<root>/config.yaml`, falling back to defaults when it is absent.
    pub fn load_at(root: &Path) -> Result<Self, RegistryError> {
        let path = settings_path(root);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(io_err(&path, err)),
        };
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| RegistryError::Settings { path, source })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn startup_poll_interval(&self) -> Duration {
        Duration::from_millis(self.startup_poll_interval_ms)
    }
}
