//! Sync driver: push the current content of a changed file to its remote document.
//!
//! Every failure is logged and reported as a [`SyncOutcome`]; nothing here
//! returns an error, so one bad file can never stop the monitor loop.
//! Each event yields at most one upload attempt: no retry, no backoff.

use std::sync::Arc;

use automagist_core::ChangeEvent;

use crate::remote::{remote_file_name, RemoteDocuments};

/// Result of handling one change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Uploaded { bytes: usize },
    ReadFailed { error: String },
    UploadFailed { error: String },
}

impl SyncOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, SyncOutcome::Uploaded { .. })
    }
}

#[derive(Clone)]
pub struct SyncDriver {
    remote: Arc<dyn RemoteDocuments>,
}

impl SyncDriver {
    pub fn new(remote: Arc<dyn RemoteDocuments>) -> Self {
        Self { remote }
    }

    /// Read the file and upload it. Blocking: call from a blocking context.
    pub fn handle(&self, event: &ChangeEvent) -> SyncOutcome {
        let content = match std::fs::read(&event.path) {
            Ok(content) => content,
            Err(err) => {
                tracing::error!(
                    path = %event.path.display(),
                    error = %err,
                    "failed to read changed file",
                );
                return SyncOutcome::ReadFailed {
                    error: err.to_string(),
                };
            }
        };

        tracing::info!(
            file = %remote_file_name(&event.path),
            gist_id = %event.remote_id,
            "uploading",
        );

        match self
            .remote
            .update_document(&event.remote_id, &event.path, &content)
        {
            Ok(()) => {
                tracing::info!(gist_id = %event.remote_id, bytes = content.len(), "gist updated");
                SyncOutcome::Uploaded {
                    bytes: content.len(),
                }
            }
            Err(err) => {
                tracing::error!(gist_id = %event.remote_id, error = %err, "failed to update gist");
                SyncOutcome::UploadFailed {
                    error: err.to_string(),
                }
            }
        }
    }
}
