//! `gh-automagist remove <path>`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use automagist_core::RegistryStore;
use automagist_sync::{unregister, RemoveOutcome};

use super::{resolve_path, RESTART_NOTE};

/// Stop tracking a file.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Tracked file to forget. Its gist is left untouched.
    pub path: PathBuf,
}

impl RemoveArgs {
    pub fn run(self, mut store: RegistryStore) -> Result<()> {
        let path = resolve_path(&self.path)?;
        let outcome = unregister(&mut store, &path)
            .with_context(|| format!("failed to remove '{}'", path.display()))?;

        match outcome {
            RemoveOutcome::NotTracked { .. } => {
                println!("File not monitored: {}", self.path.display());
            }
            RemoveOutcome::Removed { path, .. } => {
                println!("{} Removed {} from monitor.", "✓".green(), path.display());
                println!("{RESTART_NOTE}.");
            }
        }
        Ok(())
    }
}
