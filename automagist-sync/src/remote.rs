//! The remote-document capability consumed by registration and the sync driver.

use std::path::Path;

use automagist_core::RemoteId;

use crate::error::SyncError;

/// Create and patch hosted documents. Implemented by [`crate::GistClient`];
/// tests substitute recording fakes.
pub trait RemoteDocuments: Send + Sync {
    /// Create a new remote document holding the contents of `local_path`.
    fn create_document(
        &self,
        local_path: &Path,
        description: &str,
        public: bool,
    ) -> Result<RemoteId, SyncError>;

    /// Replace the file named after `local_path`'s base name inside `remote_id`.
    fn update_document(
        &self,
        remote_id: &RemoteId,
        local_path: &Path,
        content: &[u8],
    ) -> Result<(), SyncError>;
}

/// Remote-side file key for a local path: its base name.
pub fn remote_file_name(local_path: &Path) -> String {
    local_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| local_path.to_string_lossy().into_owned())
}
