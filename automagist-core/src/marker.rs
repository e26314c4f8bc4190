//! Process marker: the pid of the running monitor, stored as plain decimal text.
//!
//! Presence means a monitor is *believed* to be running. The referenced
//! process may have exited without cleanup (a stale marker); callers that
//! care about liveness must check the process themselves.

use crate::error::{io_err, RegistryError};
use crate::registry::{atomic_write, ensure_root, RegistryStore};

impl RegistryStore {
    /// Record the current process as the active monitor. Returns the pid written.
    pub fn write_process_marker(&self) -> Result<u32, RegistryError> {
        let pid = std::process::id();
        ensure_root(self.root())?;
        atomic_write(&self.marker_path(), pid.to_string().as_bytes())?;
        Ok(pid)
    }

    /// Pid recorded in the marker; `None` when absent, unreadable or unparsable.
    pub fn read_process_marker(&self) -> Option<u32> {
        let contents = std::fs::read_to_string(self.marker_path()).ok()?;
        contents.trim().parse::<u32>().ok().filter(|pid| *pid != 0)
    }

    /// Remove the marker. A missing marker is not an error.
    pub fn delete_process_marker(&self) -> Result<(), RegistryError> {
        let path = self.marker_path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_err(&path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn absent_marker_reads_none() {
        let root = TempDir::new().unwrap();
        let store = RegistryStore::new(root.path());
        assert_eq!(store.read_process_marker(), None);
    }

    #[test]
    fn write_read_delete_cycle() {
        let root = TempDir::new().unwrap();
        let store = RegistryStore::new(root.path().join("fresh"));

        let pid = store.write_process_marker().unwrap();
        assert_eq!(pid, std::process::id());
        assert_eq!(store.read_process_marker(), Some(pid));

        store.delete_process_marker().unwrap();
        assert_eq!(store.read_process_marker(), None);
        // second delete is a no-op
        store.delete_process_marker().unwrap();
    }

    #[test]
    fn garbage_marker_reads_none() {
        let root = TempDir::new().unwrap();
        let store = RegistryStore::new(root.path());
        std::fs::write(store.marker_path(), "not-a-pid").unwrap();
        assert_eq!(store.read_process_marker(), None);
        std::fs::write(store.marker_path(), "0").unwrap();
        assert_eq!(store.read_process_marker(), None);
    }

    #[test]
    fn marker_tolerates_trailing_newline() {
        let root = TempDir::new().unwrap();
        let store = RegistryStore::new(root.path());
        std::fs::write(store.marker_path(), "4242\n").unwrap();
        assert_eq!(store.read_process_marker(), Some(4242));
    }
}
