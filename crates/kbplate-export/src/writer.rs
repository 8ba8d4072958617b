//! Scoped, atomic file writes.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
#[error("gave up after {attempts} attempt(s): {source}")]
pub struct WriteError {
    pub attempts: u32,
    #[source]
    pub source: io::Error,
}

/// Write `bytes` to `path` through a temporary file in the same directory, retrying up to
/// `attempts` times. The temporary file never outlives a failed attempt.
pub fn write_atomic(path: &Path, bytes: &[u8], attempts: u32) -> Result<(), WriteError> {
    let attempts = attempts.max(1);
    let mut last = None;
    for attempt in 1..=attempts {
        match write_once(path, bytes) {
            Ok(()) => {
                debug!(path = %path.display(), bytes = bytes.len(), attempt, "wrote file");
                return Ok(());
            }
            Err(e) => {
                warn!(path = %path.display(), attempt, error = %e, "write failed");
                last = Some(e);
            }
        }
    }
    Err(WriteError {
        attempts,
        source: last.unwrap_or_else(|| io::Error::other("no write attempted")),
    })
}

fn write_once(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_atomic(&path, b"one", 2).unwrap();
        write_atomic(&path, b"two", 2).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"two");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_writes_leave_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();
        let err = write_atomic(&path, b"data", 3).unwrap_err();
        assert_eq!(err.attempts, 3);
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("taken")]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.txt");
        assert!(write_atomic(&path, b"x", 1).is_err());
    }
}
