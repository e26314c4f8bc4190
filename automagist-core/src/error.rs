//! Error types for automagist-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from registry, marker and settings operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Underlying I/O failure, with the path that was being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry file exists but cannot be parsed. Never auto-repaired.
    #[error("corrupt registry state at {path}: {source}")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (save path).
    #[error("failed to encode registry: {0}")]
    Serialize(#[from] serde_json::Error),

    /// `config.yaml` exists but is malformed.
    #[error("failed to parse settings at {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`; cannot locate `~/.config/gh-automagist/`.
    #[error("cannot determine home directory; set $HOME or pass --config-dir")]
    HomeNotFound,

    /// Registry keys must be absolute paths.
    #[error("tracked path must be absolute: {path}")]
    NotAbsolute { path: PathBuf },
}

/// Convenience constructor for [`RegistryError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RegistryError {
    RegistryError::Io {
        path: path.into(),
        source,
    }
}
