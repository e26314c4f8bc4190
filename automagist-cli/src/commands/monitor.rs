//! `gh-automagist monitor [--daemon]`

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use automagist_core::{RegistryStore, Settings};
use automagist_daemon::{spawn_detached, start_blocking, wait_for_marker, MonitorExit};
use automagist_sync::GistClient;

use super::load_store;

/// Watch tracked files and upload every change.
#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Run in the background, detached from the terminal.
    #[arg(long, short = 'd')]
    pub daemon: bool,
}

impl MonitorArgs {
    pub fn run(self, mut store: RegistryStore) -> Result<()> {
        load_store(&mut store)?;
        if store.is_empty() {
            println!("No files are currently configured for monitoring.");
            println!("Use 'gh-automagist add' to start tracking files.");
            return Ok(());
        }

        let settings = Settings::load_at(store.root()).context("failed to load settings")?;
        if self.daemon {
            return run_detached(&store, &settings);
        }

        let client = GistClient::from_settings(&settings)
            .context("set GH_TOKEN or run `gh auth login` first")?;
        println!(
            "Monitoring {} files. Press Ctrl+C to stop.",
            store.len()
        );
        match start_blocking(store, Arc::new(client)).context("monitor exited with error")? {
            MonitorExit::NothingToWatch => {
                println!("No files are currently configured for monitoring.")
            }
            MonitorExit::Stopped => println!("Monitor stopped."),
        }
        Ok(())
    }
}

fn run_detached(store: &RegistryStore, settings: &Settings) -> Result<()> {
    spawn_detached(store.root()).context("failed to start monitor daemon")?;

    print!("Starting monitor daemon");
    let _ = std::io::stdout().flush();
    let started = wait_for_marker(
        store,
        settings.startup_poll_attempts,
        settings.startup_poll_interval(),
        |_| {
            print!(".");
            let _ = std::io::stdout().flush();
        },
    );

    match started {
        Some(pid) => println!(" started! (PID: {pid})"),
        None => println!(" (monitor may still be starting up)"),
    }
    Ok(())
}
