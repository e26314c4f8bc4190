//! Error types for automagist-sync.

use std::path::PathBuf;

use thiserror::Error;

use automagist_core::error::RegistryError;

/// All errors that can arise from remote document and registration operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the registry.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport failure or non-2xx status from the gist API.
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// The gist API answered with a body we could not decode.
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// No token in `GH_TOKEN` / `GITHUB_TOKEN` and `gh auth token` gave nothing.
    #[error("no GitHub token found; set GH_TOKEN or run `gh auth login`")]
    MissingToken,
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
