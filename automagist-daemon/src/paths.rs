use std::path::{Path, PathBuf};

use automagist_core::paths::logs_dir;

pub const MONITOR_LOG: &str = "monitor.log";

/// Subcommand the detached monitor re-invokes the binary with.
pub const MONITOR_SUBCOMMAND: &str = "monitor";

/// Capacity of the watcher → driver channel.
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

pub fn monitor_log_path(root: &Path) -> PathBuf {
    logs_dir(root).join(MONITOR_LOG)
}
