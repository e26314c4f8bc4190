use std::fs::{self, OpenOptions};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};

use automagist_core::paths::logs_dir;
use automagist_core::{ChangeEvent, RegistryStore};
use automagist_sync::{RemoteDocuments, SyncDriver};

use crate::error::{io_err, DaemonError};
use crate::log_rotation::rotate_monitor_log;
use crate::paths::{monitor_log_path, CHANGE_CHANNEL_CAPACITY, MONITOR_SUBCOMMAND};
use crate::watcher::ChangeWatcher;

/// How a monitor run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
    /// The registry was empty; nothing was started and no marker was written.
    NothingToWatch,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    NotRunning,
    Stopped { pid: u32 },
    /// The marker named a process that no longer exists; the marker was removed.
    Stale { pid: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MonitorStatus {
    Stopped,
    Stale { pid: u32 },
    Suspended { pid: u32 },
    Running { pid: u32 },
}

impl MonitorStatus {
    pub fn pid(&self) -> Option<u32> {
        match self {
            MonitorStatus::Stopped => None,
            MonitorStatus::Stale { pid }
            | MonitorStatus::Suspended { pid }
            | MonitorStatus::Running { pid } => Some(*pid),
        }
    }
}

/// Removes the process marker when the monitor leaves `run`, however it leaves.
///
/// A marker naming another pid belongs to a successor monitor and is kept.
struct MarkerGuard {
    store: RegistryStore,
    pid: u32,
}

impl Drop for MarkerGuard {
    fn drop(&mut self) {
        match self.store.read_process_marker() {
            Some(pid) if pid == self.pid => {}
            Some(other) => {
                tracing::debug!(pid = other, "marker belongs to another monitor, leaving it");
                return;
            }
            None => return,
        }
        match self.store.delete_process_marker() {
            Ok(()) => tracing::debug!("process marker removed"),
            Err(err) => tracing::warn!(error = %err, "failed to remove process marker"),
        }
    }
}

// ---------------------------------------------------------------------------
// Foreground run
// ---------------------------------------------------------------------------

/// Initialise tracing, build the runtime and run the monitor until it stops.
pub fn start_blocking(
    store: RegistryStore,
    remote: Arc<dyn RemoteDocuments>,
) -> Result<MonitorExit, DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    let (shutdown, _) = broadcast::channel::<()>(16);
    runtime.block_on(run(store, remote, shutdown))
}

/// Run the monitor until `shutdown` fires, Ctrl-C or SIGTERM arrives, or the
/// watcher fails.
///
/// The marker holds this process's pid for as long as the monitor is running.
pub async fn run(
    mut store: RegistryStore,
    remote: Arc<dyn RemoteDocuments>,
    shutdown: broadcast::Sender<()>,
) -> Result<MonitorExit, DaemonError> {
    store.load()?;
    if store.is_empty() {
        tracing::info!("no files registered, nothing to monitor");
        return Ok(MonitorExit::NothingToWatch);
    }

    let watcher = ChangeWatcher::new(store.clone())?;
    let (change_tx, change_rx) = mpsc::channel::<ChangeEvent>(CHANGE_CHANNEL_CAPACITY);
    let watcher_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.subscribe();

    let pid = store.write_process_marker()?;
    let _marker = MarkerGuard {
        store: RegistryStore::new(store.root()),
        pid,
    };
    tracing::info!(
        pid,
        files = store.len(),
        directories = watcher.watched_dirs().len(),
        "monitor running",
    );

    let watcher_handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let result = watcher.run(change_tx, watcher_shutdown).await;
            let _ = shutdown.send(());
            result
        })
    };

    let driver_handle = {
        let shutdown = shutdown.clone();
        let driver = SyncDriver::new(remote);
        tokio::spawn(async move {
            let result = driver_task(driver, change_rx).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { signal_task(shutdown, signal_shutdown).await })
    };

    let (watcher_result, driver_result, signal_result) =
        tokio::join!(watcher_handle, driver_handle, signal_handle);

    handle_join("watcher", watcher_result)?;
    handle_join("sync_driver", driver_result)?;
    handle_join("signal_handler", signal_result)?;

    tracing::info!(pid, "monitor stopped");
    Ok(MonitorExit::Stopped)
}

/// Sole consumer of change events. Events are handled strictly one at a time;
/// queued events are drained after the watcher stops.
async fn driver_task(
    driver: SyncDriver,
    mut changes: mpsc::Receiver<ChangeEvent>,
) -> Result<(), DaemonError> {
    while let Some(event) = changes.recv().await {
        let driver = driver.clone();
        let path = event.path.clone();
        let outcome = tokio::task::spawn_blocking(move || driver.handle(&event))
            .await
            .map_err(|err| DaemonError::Runtime(format!("sync task join error: {err}")))?;
        tracing::debug!(path = %path.display(), ?outcome, "change handled");
    }
    Ok(())
}

async fn signal_task(
    shutdown: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    tokio::select! {
        _ = shutdown_rx.recv() => Ok(()),
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|e| io_err("ctrl-c handler", e))?;
            tracing::info!("received ctrl-c, stopping monitor");
            let _ = shutdown.send(());
            Ok(())
        }
        signal = terminate_signal() => {
            signal.map_err(|e| io_err("SIGTERM handler", e))?;
            tracing::info!("received SIGTERM, stopping monitor");
            let _ = shutdown.send(());
            Ok(())
        }
    }
}

#[cfg(unix)]
async fn terminate_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    signal(SignalKind::terminate())?.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn terminate_signal() -> std::io::Result<()> {
    std::future::pending().await
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Runtime(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

/// Install the `fmt` subscriber once. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

// ---------------------------------------------------------------------------
// Detached mode
// ---------------------------------------------------------------------------

/// Re-invoke the current executable as `--config-dir <root> monitor` in its own
/// session, with output appended to `<root>/logs/monitor.log`.
///
/// Returns the child's pid. Use [`wait_for_marker`] to confirm the monitor
/// actually came up.
pub fn spawn_detached(root: &Path) -> Result<u32, DaemonError> {
    let exe = std::env::current_exe().map_err(|e| io_err("current executable", e))?;

    let logs = logs_dir(root);
    fs::create_dir_all(&logs).map_err(|e| io_err(&logs, e))?;
    rotate_monitor_log(root);

    let log_path = monitor_log_path(root);
    let stdout = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| io_err(&log_path, e))?;
    let stderr = stdout.try_clone().map_err(|e| io_err(&log_path, e))?;

    let mut command = Command::new(&exe);
    command
        .arg("--config-dir")
        .arg(root)
        .arg(MONITOR_SUBCOMMAND)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));
    detach_session(&mut command);

    let child = command.spawn().map_err(|e| io_err(&exe, e))?;
    tracing::info!(pid = child.id(), log = %log_path.display(), "spawned detached monitor");
    Ok(child.id())
}

#[cfg(unix)]
fn detach_session(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    // New session: no controlling terminal, survives the parent shell.
    unsafe {
        command.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
fn detach_session(_command: &mut Command) {}

/// Poll for the process marker up to `attempts` times, sleeping `interval`
/// before each check. `on_tick` runs after every unsuccessful check.
pub fn wait_for_marker(
    store: &RegistryStore,
    attempts: u32,
    interval: Duration,
    mut on_tick: impl FnMut(u32),
) -> Option<u32> {
    for attempt in 1..=attempts {
        std::thread::sleep(interval);
        if let Some(pid) = store.read_process_marker() {
            return Some(pid);
        }
        on_tick(attempt);
    }
    None
}

// ---------------------------------------------------------------------------
// Stop / status
// ---------------------------------------------------------------------------

/// Ask the recorded monitor to stop and remove the marker.
///
/// The marker is deleted whatever the signal result; a vanished process is
/// reported as [`StopOutcome::Stale`], not as an error.
pub fn stop(store: &RegistryStore) -> Result<StopOutcome, DaemonError> {
    let Some(pid) = store.read_process_marker() else {
        return Ok(StopOutcome::NotRunning);
    };

    let signal = send_terminate(pid);
    store.delete_process_marker()?;

    match signal {
        Ok(()) => {
            tracing::info!(pid, "sent SIGTERM to monitor");
            Ok(StopOutcome::Stopped { pid })
        }
        Err(err) if is_no_such_process(&err) => {
            tracing::info!(pid, "monitor was not running, removed stale marker");
            Ok(StopOutcome::Stale { pid })
        }
        Err(source) => Err(DaemonError::Signal { pid, source }),
    }
}

/// Inspect the marker and the process it names.
pub fn monitor_status(store: &RegistryStore) -> MonitorStatus {
    let Some(pid) = store.read_process_marker() else {
        return MonitorStatus::Stopped;
    };
    if !process_alive(pid) {
        return MonitorStatus::Stale { pid };
    }
    if process_state(pid).is_some_and(|state| state.starts_with('T')) {
        return MonitorStatus::Suspended { pid };
    }
    MonitorStatus::Running { pid }
}

/// First column of `ps -o state=` for `pid`, if `ps` knows the process.
fn process_state(pid: u32) -> Option<String> {
    let output = Command::new("ps")
        .args(["-o", "state=", "-p", &pid.to_string()])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let state = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!state.is_empty()).then_some(state)
}

#[cfg(unix)]
fn send_terminate(pid: u32) -> std::io::Result<()> {
    signal_pid(pid, libc::SIGTERM)
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    match signal_pid(pid, 0) {
        Ok(()) => true,
        // Exists, owned by someone else.
        Err(err) => err.raw_os_error() == Some(libc::EPERM),
    }
}

#[cfg(unix)]
fn is_no_such_process(err: &std::io::Error) -> bool {
    err.raw_os_error() == Some(libc::ESRCH)
}

#[cfg(unix)]
fn signal_pid(pid: u32, signal: libc::c_int) -> std::io::Result<()> {
    let pid = libc::pid_t::try_from(pid).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "pid out of range")
    })?;
    let result = unsafe { libc::kill(pid, signal) };
    if result != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn send_terminate(_pid: u32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "signals are only supported on Unix",
    ))
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

#[cfg(not(unix))]
fn is_no_such_process(_err: &std::io::Error) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dead_pid() -> u32 {
        // Reaped child: its pid is free until the kernel recycles it.
        let mut child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        pid
    }

    #[test]
    fn marker_guard_removes_its_own_marker() {
        let root = TempDir::new().unwrap();
        let store = RegistryStore::new(root.path());
        let pid = store.write_process_marker().unwrap();

        drop(MarkerGuard {
            store: store.clone(),
            pid,
        });

        assert_eq!(store.read_process_marker(), None);
    }

    #[test]
    fn marker_guard_keeps_successor_marker() {
        let root = TempDir::new().unwrap();
        let store = RegistryStore::new(root.path());
        let pid = store.write_process_marker().unwrap();
        fs::write(store.marker_path(), "999999").unwrap();

        drop(MarkerGuard {
            store: store.clone(),
            pid,
        });

        assert_eq!(store.read_process_marker(), Some(999999));
    }

    #[test]
    fn status_without_marker_is_stopped() {
        let root = TempDir::new().unwrap();
        let store = RegistryStore::new(root.path());
        assert_eq!(monitor_status(&store), MonitorStatus::Stopped);
    }

    #[test]
    fn status_for_own_pid_is_running() {
        let root = TempDir::new().unwrap();
        let store = RegistryStore::new(root.path());
        let pid = store.write_process_marker().unwrap();
        assert_eq!(monitor_status(&store), MonitorStatus::Running { pid });
    }

    #[test]
    fn status_for_dead_pid_is_stale() {
        let root = TempDir::new().unwrap();
        let store = RegistryStore::new(root.path());
        let pid = dead_pid();
        fs::write(store.marker_path(), pid.to_string()).unwrap();
        assert_eq!(monitor_status(&store), MonitorStatus::Stale { pid });
    }

    #[test]
    fn stop_without_marker_is_not_running() {
        let root = TempDir::new().unwrap();
        let store = RegistryStore::new(root.path());
        assert_eq!(stop(&store).unwrap(), StopOutcome::NotRunning);
    }

    #[test]
    fn status_serializes_with_state_tag() {
        assert_eq!(
            serde_json::to_string(&MonitorStatus::Running { pid: 42 }).unwrap(),
            r#"{"state":"running","pid":42}"#
        );
        assert_eq!(
            serde_json::to_string(&MonitorStatus::Stopped).unwrap(),
            r#"{"state":"stopped"}"#
        );
    }

    #[test]
    fn wait_for_marker_gives_up_after_attempts() {
        let root = TempDir::new().unwrap();
        let store = RegistryStore::new(root.path());
        let mut ticks = Vec::new();

        let found = wait_for_marker(&store, 3, Duration::from_millis(1), |n| ticks.push(n));

        assert_eq!(found, None);
        assert_eq!(ticks, vec![1, 2, 3]);
    }

    #[test]
    fn wait_for_marker_returns_recorded_pid() {
        let root = TempDir::new().unwrap();
        let store = RegistryStore::new(root.path());
        let pid = store.write_process_marker().unwrap();

        let found = wait_for_marker(&store, 3, Duration::from_millis(1), |_| {});

        assert_eq!(found, Some(pid));
    }
}
