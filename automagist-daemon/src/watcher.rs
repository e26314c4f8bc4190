//! Change watcher: turns filesystem notifications for tracked files into
//! [`ChangeEvent`]s.
//!
//! The set of tracked files is the registry snapshot taken at construction.
//! Each tracked file's parent directory is watched non-recursively (editors
//! commonly replace files through a rename, which a watch on the file itself
//! would lose). Only events whose exact path is a tracked key get through.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};

use automagist_core::{unix_now, ChangeEvent, Registry, RegistryStore};

use crate::error::DaemonError;

pub struct ChangeWatcher {
    store: RegistryStore,
    watched: BTreeSet<PathBuf>,
    events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    // Dropping the watcher ends the notification stream.
    _watcher: RecommendedWatcher,
}

impl ChangeWatcher {
    /// Subscribe to the parent directory of every file in `store`.
    ///
    /// `store` must already be loaded; its contents become the watch snapshot.
    /// A directory that cannot be watched is logged and skipped.
    pub fn new(store: RegistryStore) -> Result<Self, DaemonError> {
        let (event_tx, events) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher: RecommendedWatcher = recommended_watcher(move |event| {
            let _ = event_tx.send(event);
        })?;

        let mut watched = BTreeSet::new();
        for dir in watch_dirs(store.files()) {
            match watcher.watch(&dir, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    tracing::debug!(path = %dir.display(), "watching directory");
                    watched.insert(dir);
                }
                Err(err) => {
                    tracing::warn!(path = %dir.display(), error = %err, "cannot watch directory");
                }
            }
        }

        Ok(Self {
            store,
            watched,
            events,
            _watcher: watcher,
        })
    }

    /// Directories that were subscribed successfully.
    pub fn watched_dirs(&self) -> &BTreeSet<PathBuf> {
        &self.watched
    }

    /// Receive notifications until `shutdown` fires or the stream ends.
    ///
    /// Every accepted notification stamps the file, persists the registry and
    /// then sends one [`ChangeEvent`] on `changes`.
    pub async fn run(
        mut self,
        changes: mpsc::Sender<ChangeEvent>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), DaemonError> {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                event = self.events.recv() => {
                    let Some(event) = event else { break };
                    let event = match event {
                        Ok(event) => event,
                        Err(err) => {
                            tracing::warn!(error = %err, "watcher error");
                            continue;
                        }
                    };

                    for path in qualifying_paths(&event) {
                        let Some(change) = self.accept(path) else { continue };
                        changes
                            .send(change)
                            .await
                            .map_err(|_| DaemonError::ChannelClosed("change events"))?;
                    }
                }
            }
        }

        tracing::debug!("change watcher stopped");
        Ok(())
    }

    fn accept(&mut self, path: &Path) -> Option<ChangeEvent> {
        let updated_at = unix_now();
        let remote_id = self.store.touch(path, updated_at)?.remote_id.clone();

        tracing::info!(path = %path.display(), "detected change");
        if let Err(err) = self.store.save() {
            tracing::error!(path = %path.display(), error = %err, "failed to persist registry");
        }

        Some(ChangeEvent {
            path: path.to_path_buf(),
            remote_id,
            updated_at,
        })
    }
}

/// Distinct parent directories of the registry's keys.
pub fn watch_dirs(registry: &Registry) -> BTreeSet<PathBuf> {
    registry
        .keys()
        .filter_map(|path| path.parent())
        .map(Path::to_path_buf)
        .collect()
}

/// Paths of `event` that mean "content written" or "created".
///
/// A rename into the directory counts (editors save by renaming a temp file
/// over the target). `Name(Both)` is skipped because the same rename is also
/// reported as `Name(To)`; `Name(Any)` only counts when the path still exists.
pub fn qualifying_paths(event: &Event) -> Vec<&Path> {
    let paths = event.paths.iter().map(PathBuf::as_path);
    match event.kind {
        EventKind::Create(_)
        | EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => paths.collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => {
            paths.filter(|path| path.exists()).collect()
        }
        _ => Vec::new(),
    }
}
