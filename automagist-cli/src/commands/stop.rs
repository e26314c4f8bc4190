//! `gh-automagist stop`

use anyhow::{Context, Result};

use automagist_core::RegistryStore;
use automagist_daemon::{stop, StopOutcome};

pub fn run(store: RegistryStore) -> Result<()> {
    match stop(&store).context("failed to stop monitor")? {
        StopOutcome::NotRunning => println!("Monitor is not running."),
        StopOutcome::Stale { pid } => {
            println!("Monitor process {pid} not found (stale PID file removed)")
        }
        StopOutcome::Stopped { pid } => println!("Stopped monitor (PID: {pid})"),
    }
    Ok(())
}
