//! gh-automagist: keep local files in sync with GitHub gists.
//!
//! # Usage
//!
//! ```text
//! gh-automagist [--config-dir DIR] add <path> [--gist-id ID] [--public]
//! gh-automagist [--config-dir DIR] remove <path>
//! gh-automagist [--config-dir DIR] list [--json]
//! gh-automagist [--config-dir DIR] status [--json]
//! gh-automagist [--config-dir DIR] monitor [--daemon]
//! gh-automagist [--config-dir DIR] stop
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    add::AddArgs, list::ListArgs, monitor::MonitorArgs, remove::RemoveArgs, status::StatusArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "gh-automagist",
    version,
    about = "Watch local files and sync their changes to GitHub gists",
    long_about = None,
)]
struct Cli {
    /// Configuration directory (defaults to ~/.config/gh-automagist).
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start tracking a file, creating or linking its gist.
    Add(AddArgs),

    /// Stop tracking a file.
    Remove(RemoveArgs),

    /// List tracked files.
    List(ListArgs),

    /// Show monitor state and tracked files.
    Status(StatusArgs),

    /// Watch tracked files and upload every change.
    Monitor(MonitorArgs),

    /// Stop the running monitor.
    Stop,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let store = commands::open_store(cli.config_dir)?;
    match cli.command {
        Commands::Add(args) => args.run(store),
        Commands::Remove(args) => args.run(store),
        Commands::List(args) => args.run(store),
        Commands::Status(args) => args.run(store),
        Commands::Monitor(args) => args.run(store),
        Commands::Stop => commands::stop::run(store),
    }
}
