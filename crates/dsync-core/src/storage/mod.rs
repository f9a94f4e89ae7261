//! File handles and file lifecycle.
//!
//! The source is opened read-only with its size captured once. The destination
//! is created exclusively with synchronous writes and is removed by
//! [`RemoveOnDrop`] unless the transfer verified successfully.

mod destination;
mod source;

pub use destination::DestinationFile;
pub use source::SourceFile;

use std::path::{Path, PathBuf};

/// Deletes a file when dropped unless [`disarm`](Self::disarm) was called.
#[derive(Debug)]
pub struct RemoveOnDrop {
    path: PathBuf,
    armed: bool,
}

impl RemoveOnDrop {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: true,
        }
    }

    /// Keep the file.
    pub fn disarm(mut self) {
        self.armed = false;
    }

    /// Delete the file now. `Ok(false)` if it was already gone.
    pub fn remove(mut self) -> std::io::Result<bool> {
        self.armed = false;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed incomplete destination"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                "could not remove incomplete destination: {}",
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn guard_removes_when_armed() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("partial.bin");
        std::fs::write(&p, b"half").unwrap();
        {
            let _guard = RemoveOnDrop::new(&p);
        }
        assert!(!p.exists());
    }

    #[test]
    fn guard_keeps_when_disarmed() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("done.bin");
        std::fs::write(&p, b"whole").unwrap();
        let guard = RemoveOnDrop::new(&p);
        assert_eq!(guard.path(), p.as_path());
        guard.disarm();
        assert!(p.exists());
    }

    #[test]
    fn explicit_remove_reports_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("partial.bin");
        std::fs::write(&p, b"half").unwrap();
        assert!(RemoveOnDrop::new(&p).remove().unwrap());
        assert!(!p.exists());
        assert!(!RemoveOnDrop::new(&p).remove().unwrap());
    }

    #[test]
    fn guard_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let _guard = RemoveOnDrop::new(&dir.path().join("never-created"));
    }

    #[test]
    fn create_write_close_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let src_path = dir.path().join("in.bin");
        std::fs::write(&src_path, b"hello world").unwrap();

        let mut src = SourceFile::open(&src_path).unwrap();
        assert_eq!(src.len(), 11);
        assert_eq!(src.path(), src_path.as_path());
        let mut body = Vec::new();
        src.read_to_end(&mut body).unwrap();
        src.close().unwrap();

        let dst_path = dir.path().join("out.bin");
        let mut dst = DestinationFile::create(&dst_path).unwrap();
        assert_eq!(dst.path(), dst_path.as_path());
        dst.write_all(&body).unwrap();
        dst.close().unwrap();

        assert_eq!(std::fs::read(&dst_path).unwrap(), b"hello world");
    }

    #[test]
    fn create_refuses_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("taken.bin");
        std::fs::write(&p, b"keep me").unwrap();
        let err = DestinationFile::create(&p).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(&p).unwrap(), b"keep me");
    }

    #[test]
    fn open_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceFile::open(&dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
