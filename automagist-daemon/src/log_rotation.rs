//! Size-based rotation for the detached monitor's log.
//!
//! `monitor.log` is rotated before each detached start once it reaches
//! 5 MiB; at most 3 numbered copies are kept (`monitor.log.1` is newest).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::paths::monitor_log_path;

pub const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;

pub const MAX_ROTATED_FILES: usize = 3;

/// Rotate `log_path` when it is at least `max_bytes` long.
///
/// `<name>.<max_files>` is dropped, every `<name>.<n>` moves to `<name>.<n+1>`
/// and the live file becomes `<name>.1`. Returns whether a rotation happened;
/// a missing log is not an error.
pub fn rotate_if_needed(log_path: &Path, max_bytes: u64, max_files: usize) -> io::Result<bool> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    if size < max_bytes || max_files == 0 {
        return Ok(false);
    }

    match fs::remove_file(numbered_path(log_path, max_files)) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    for n in (1..max_files).rev() {
        let src = numbered_path(log_path, n);
        if src.exists() {
            fs::rename(&src, numbered_path(log_path, n + 1))?;
        }
    }

    fs::rename(log_path, numbered_path(log_path, 1))?;
    Ok(true)
}

/// Rotate `<root>/logs/monitor.log`. Failures are logged, never raised.
pub fn rotate_monitor_log(root: &Path) {
    let log_path = monitor_log_path(root);
    match rotate_if_needed(&log_path, MAX_LOG_BYTES, MAX_ROTATED_FILES) {
        Ok(true) => tracing::info!(path = %log_path.display(), "monitor log rotated"),
        Ok(false) => {}
        Err(err) => {
            tracing::warn!(path = %log_path.display(), error = %err, "monitor log rotation failed")
        }
    }
}

fn numbered_path(base: &Path, n: usize) -> PathBuf {
    let name = base
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("monitor.log");
    base.with_file_name(format!("{name}.{n}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SMALL_LIMIT: u64 = 16;

    fn write_log(path: &Path, len: usize) {
        fs::write(path, vec![b'x'; len]).unwrap();
    }

    #[test]
    fn under_threshold_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("monitor.log");
        write_log(&log, 4);

        assert!(!rotate_if_needed(&log, SMALL_LIMIT, 3).unwrap());
        assert!(log.exists());
        assert!(!numbered_path(&log, 1).exists());
    }

    #[test]
    fn missing_log_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("monitor.log");
        assert!(!rotate_if_needed(&log, SMALL_LIMIT, 3).unwrap());
    }

    #[test]
    fn oversized_log_moves_to_first_slot() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("monitor.log");
        write_log(&log, 32);

        assert!(rotate_if_needed(&log, SMALL_LIMIT, 3).unwrap());
        assert!(!log.exists(), "the next writer recreates the live log");
        assert_eq!(fs::metadata(numbered_path(&log, 1)).unwrap().len(), 32);
    }

    #[test]
    fn rotations_shift_and_cap_copies() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("monitor.log");

        for round in 1..=5u8 {
            fs::write(&log, vec![b'0' + round; 32]).unwrap();
            rotate_if_needed(&log, SMALL_LIMIT, 3).unwrap();
        }

        assert_eq!(fs::read(numbered_path(&log, 1)).unwrap()[0], b'5');
        assert_eq!(fs::read(numbered_path(&log, 3)).unwrap()[0], b'3');
        assert!(!numbered_path(&log, 4).exists());
    }

    #[test]
    fn rotate_monitor_log_targets_logs_dir() {
        let root = TempDir::new().unwrap();
        let log = monitor_log_path(root.path());
        fs::create_dir_all(log.parent().unwrap()).unwrap();
        write_log(&log, MAX_LOG_BYTES as usize);

        rotate_monitor_log(root.path());

        assert!(numbered_path(&log, 1).exists());
    }
}
