//! Monitor runtime: change watcher + sync driver + process control.

mod error;
pub mod log_rotation;
pub mod paths;
mod supervisor;
pub mod watcher;

pub use error::DaemonError;
pub use supervisor::{
    init_tracing, monitor_status, run, spawn_detached, start_blocking, stop, wait_for_marker,
    MonitorExit, MonitorStatus, StopOutcome,
};
pub use watcher::ChangeWatcher;
