//! `gh-automagist list [--json]`

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use automagist_core::{FileStatus, RegistryStore};

use super::{format_timestamp, load_store};

/// List tracked files.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct FileJson {
    path: String,
    gist_id: String,
    updated_at: i64,
    status: FileStatus,
}

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "file")]
    path: String,
    #[tabled(rename = "gist id")]
    gist_id: String,
    #[tabled(rename = "last change")]
    last_change: String,
}

impl ListArgs {
    pub fn run(self, mut store: RegistryStore) -> Result<()> {
        load_store(&mut store)?;

        if self.json {
            let files: Vec<FileJson> = store
                .files()
                .iter()
                .map(|(path, file)| FileJson {
                    path: path.display().to_string(),
                    gist_id: file.remote_id.to_string(),
                    updated_at: file.updated_at,
                    status: file.status,
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&files).context("failed to serialize file list")?
            );
            return Ok(());
        }

        if store.is_empty() {
            println!("No monitored files found.");
            return Ok(());
        }

        let rows: Vec<FileRow> = store
            .files()
            .iter()
            .map(|(path, file)| FileRow {
                path: path.display().to_string(),
                gist_id: file.remote_id.to_string(),
                last_change: format_timestamp(file.updated_at),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
