//! `gh-automagist add <path> [--gist-id ID] [--public]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use automagist_core::{RegistryStore, RemoteId, Settings};
use automagist_sync::{register, AddOutcome, GistClient, RemoteTarget};

use super::{resolve_path, RESTART_NOTE};

/// Start tracking a file.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// File to keep in sync.
    pub path: PathBuf,

    /// Link to an existing gist instead of creating a new one.
    #[arg(long, value_name = "ID")]
    pub gist_id: Option<String>,

    /// Create the new gist as public.
    #[arg(long, conflicts_with = "gist_id")]
    pub public: bool,
}

impl AddArgs {
    pub fn run(self, mut store: RegistryStore) -> Result<()> {
        let path = resolve_path(&self.path)?;
        if !path.exists() {
            println!("File not found: {}", self.path.display());
            return Ok(());
        }

        let settings = Settings::load_at(store.root()).context("failed to load settings")?;
        let client = GistClient::from_settings(&settings)
            .context("set GH_TOKEN or run `gh auth login` first")?;

        let target = match self.gist_id {
            Some(id) => {
                println!("Linking {} to Gist {}...", path.display(), id);
                RemoteTarget::Existing(RemoteId::from(id))
            }
            None => {
                println!("Creating Gist for {}...", path.display());
                RemoteTarget::Create {
                    public: self.public.then_some(true),
                }
            }
        };

        let outcome = register(&mut store, &client, &settings, &path, target)
            .with_context(|| format!("failed to add '{}'", path.display()))?;

        match outcome {
            AddOutcome::Missing { path } => {
                println!("File not found: {}", path.display());
            }
            AddOutcome::Added {
                path,
                remote_id,
                replaced,
                ..
            } => {
                if let Some(previous) = replaced {
                    println!(
                        "{} replaced previous Gist {}",
                        "!".yellow(),
                        previous.remote_id
                    );
                }
                println!(
                    "{} Added {} to monitor (Gist ID: {})",
                    "✓".green(),
                    path.display(),
                    remote_id
                );
                println!("{RESTART_NOTE} to pick up the new file.");
            }
        }
        Ok(())
    }
}
