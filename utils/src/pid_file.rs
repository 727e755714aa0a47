//! Process-identity file.
//!
//! Holds the current process id as a single decimal integer so external
//! tooling can recognize a previously started instance. The file is written
//! at startup and removed when the guard is dropped at clean exit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::atomic_write::atomic_write;

/// Parse the contents of a pid file. Surrounding whitespace is ignored.
#[must_use]
pub fn parse_pid(contents: &str) -> Option<u32> {
    contents.trim().parse().ok()
}

/// Guard for a written pid file; removes the file on drop.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Read the pid recorded by a previous instance, if any.
    ///
    /// A missing file is `Ok(None)`; unreadable contents are `InvalidData`.
    pub fn read_existing(path: &Path) -> io::Result<Option<u32>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        parse_pid(&contents).map(Some).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("pid file {} does not hold a process id", path.display()),
            )
        })
    }

    /// Write `pid`, replacing any previous file.
    pub fn create(path: impl Into<PathBuf>, pid: u32) -> io::Result<Self> {
        let path = path.into();
        atomic_write(&path, pid.to_string().as_bytes())?;
        tracing::debug!(path = %path.display(), pid, "Wrote pid file");
        Ok(Self { path })
    }

    /// Write the id of the running process.
    pub fn create_for_current_process(path: impl Into<PathBuf>) -> io::Result<Self> {
        Self::create(path, std::process::id())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed pid file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                "Failed to remove pid file: {e}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pid_accepts_trailing_newline() {
        assert_eq!(parse_pid("9496\n"), Some(9496));
        assert_eq!(parse_pid(" 12 "), Some(12));
        assert_eq!(parse_pid("abc"), None);
        assert_eq!(parse_pid(""), None);
    }

    #[test]
    fn create_writes_decimal_and_drop_removes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jhost.pid");

        let guard = PidFile::create(&path, 4242).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "4242");
        assert_eq!(PidFile::read_existing(&path).unwrap(), Some(4242));

        drop(guard);
        assert!(!path.exists());
    }

    #[test]
    fn create_replaces_previous_instance_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jhost.pid");
        fs::write(&path, "17").unwrap();

        let _guard = PidFile::create(&path, 18).unwrap();
        assert_eq!(PidFile::read_existing(&path).unwrap(), Some(18));
    }

    #[test]
    fn create_in_missing_directory_fails_without_guard() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run").join("jhost.pid");
        assert!(PidFile::create(&path, 7).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn read_existing_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.pid");
        assert_eq!(PidFile::read_existing(&path).unwrap(), None);
    }

    #[test]
    fn read_existing_garbage_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pid");
        fs::write(&path, "not-a-pid").unwrap();
        let err = PidFile::read_existing(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn drop_tolerates_already_removed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jhost.pid");
        let guard = PidFile::create_for_current_process(&path).unwrap();
        assert_eq!(
            PidFile::read_existing(guard.path()).unwrap(),
            Some(std::process::id())
        );
        fs::remove_file(&path).unwrap();
        drop(guard);
    }
}
