//! Register / unregister entrypoints shared by the CLI.
//!
//! Each call is one load-mutate-save cycle against the registry file. A
//! running monitor does not see the result until it is restarted.

use std::path::{Path, PathBuf};

use automagist_core::{unix_now, RegistryStore, RemoteId, Settings, TrackedFile};

use crate::error::SyncError;
use crate::remote::{remote_file_name, RemoteDocuments};

/// How the remote document for a new registration is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteTarget {
    /// Create a fresh document; `public` overrides the settings default.
    Create { public: Option<bool> },
    /// Link to an existing document and push the current content to it.
    Existing(RemoteId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The local file does not exist; nothing was changed.
    Missing { path: PathBuf },
    Added {
        path: PathBuf,
        remote_id: RemoteId,
        linked: bool,
        /// Previous entry when the path was already tracked.
        replaced: Option<TrackedFile>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The path was not tracked; nothing was changed.
    NotTracked { path: PathBuf },
    Removed { path: PathBuf, entry: TrackedFile },
}

/// Register `path` (absolute) for synchronization and persist the registry.
pub fn register(
    store: &mut RegistryStore,
    remote: &dyn RemoteDocuments,
    settings: &Settings,
    path: &Path,
    target: RemoteTarget,
) -> Result<AddOutcome, SyncError> {
    if !path.exists() {
        return Ok(AddOutcome::Missing {
            path: path.to_path_buf(),
        });
    }

    store.load()?;

    let (remote_id, linked) = match target {
        RemoteTarget::Existing(remote_id) => {
            let content = std::fs::read(path).map_err(|e| crate::error::io_err(path, e))?;
            remote.update_document(&remote_id, path, &content)?;
            (remote_id, true)
        }
        RemoteTarget::Create { public } => {
            let description = format!("{}{}", settings.description_prefix, remote_file_name(path));
            let public = public.unwrap_or(settings.public_by_default);
            (remote.create_document(path, &description, public)?, false)
        }
    };

    let replaced = store.add_tracked(path.to_path_buf(), remote_id.clone(), unix_now())?;
    store.save()?;

    tracing::info!(path = %path.display(), gist_id = %remote_id, linked, "registered file");
    Ok(AddOutcome::Added {
        path: path.to_path_buf(),
        remote_id,
        linked,
        replaced,
    })
}

/// Stop tracking `path` and persist the registry. Untracked paths are a no-op.
pub fn unregister(store: &mut RegistryStore, path: &Path) -> Result<RemoveOutcome, SyncError> {
    store.load()?;
    let Some(entry) = store.remove_tracked(path) else {
        return Ok(RemoveOutcome::NotTracked {
            path: path.to_path_buf(),
        });
    };
    store.save()?;

    tracing::info!(path = %path.display(), gist_id = %entry.remote_id, "unregistered file");
    Ok(RemoveOutcome::Removed {
        path: path.to_path_buf(),
        entry,
    })
}
