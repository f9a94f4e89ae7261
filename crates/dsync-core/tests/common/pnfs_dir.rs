//! A temp directory that stands in for a pnfs mount.
//!
//! dCache serves `.(get)(B)(checksum)` and `.(id)(B)` itself; here the test
//! writes them as plain files before the transfer reads them.

use dsync_core::attributes::{checksum_sidecar, id_sidecar};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct FakePnfs {
    dir: TempDir,
}

impl FakePnfs {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Publish the checksum pseudo-file for `file` with the given contents.
    pub fn publish_checksum_file(&self, file: &Path, contents: &str) {
        std::fs::write(checksum_sidecar(file).unwrap(), contents).unwrap();
    }

    /// Publish `ADLER32:<value>` plus an unrelated line, the way dCache lists several types.
    pub fn publish_adler32(&self, file: &Path, value: &str) {
        self.publish_checksum_file(file, &format!("MD5_TYPE:d41d8cd98f00b204\nADLER32:{value}\n"));
    }

    pub fn publish_id(&self, file: &Path, id: &str) {
        std::fs::write(id_sidecar(file).unwrap(), format!("{id}\n")).unwrap();
    }
}
