//! `gh-automagist status [--json]`: monitor state plus registered files.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use automagist_core::RegistryStore;
use automagist_daemon::{monitor_status, MonitorStatus};

use super::{format_timestamp, load_store};

/// Show monitor state and tracked files.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson {
    monitor: MonitorStatus,
    files: Vec<RegisteredFileJson>,
}

#[derive(Serialize)]
struct RegisteredFileJson {
    path: String,
    gist_id: String,
    updated_at: i64,
}

impl StatusArgs {
    pub fn run(self, mut store: RegistryStore) -> Result<()> {
        let monitor = monitor_status(&store);
        load_store(&mut store)?;

        if self.json {
            let payload = StatusJson {
                monitor,
                files: store
                    .files()
                    .iter()
                    .map(|(path, file)| RegisteredFileJson {
                        path: path.display().to_string(),
                        gist_id: file.remote_id.to_string(),
                        updated_at: file.updated_at,
                    })
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        println!("Monitor Status: {}", monitor_label(monitor));
        println!();

        if store.is_empty() {
            println!("No files registered.");
            return Ok(());
        }

        println!("Registered Files ({}):", store.len());
        for (path, file) in store.files() {
            println!(
                "- {} (Gist ID: {}, last change {})",
                path.display(),
                file.remote_id,
                format_timestamp(file.updated_at).bright_black()
            );
        }
        Ok(())
    }
}

fn monitor_label(status: MonitorStatus) -> String {
    match status {
        MonitorStatus::Stopped => "STOPPED".red().to_string(),
        MonitorStatus::Stale { pid } => {
            format!("{} (stale PID file: {pid})", "STOPPED".red())
        }
        MonitorStatus::Suspended { pid } => format!("{} (PID: {pid})", "SUSPENDED".yellow()),
        MonitorStatus::Running { pid } => format!("{} (PID: {pid})", "RUNNING".green()),
    }
}
