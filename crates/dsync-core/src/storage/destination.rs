//! Exclusive, synchronous destination file.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Destination file. Created with `O_CREAT | O_EXCL` so an existing path is
/// never overwritten, and with `O_SYNC` on Unix so every write is durable on
/// return.
#[derive(Debug)]
pub struct DestinationFile {
    file: File,
    path: PathBuf,
}

impl DestinationFile {
    /// Create `path`. Fails with `AlreadyExists` if anything is already there.
    pub fn create(path: &Path) -> io::Result<Self> {
        let mut opts = File::options();
        opts.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600).custom_flags(libc::O_SYNC);
        }
        let file = opts.open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the handle. On network filesystems `close` is where deferred
    /// write errors surface, so the result is reported rather than dropped.
    pub fn close(self) -> io::Result<()> {
        #[cfg(not(unix))]
        self.file.sync_all()?;
        close_file(self.file)
    }
}

impl Write for DestinationFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(unix)]
pub(super) fn close_file(file: File) -> io::Result<()> {
    use std::os::unix::io::IntoRawFd;
    let fd = file.into_raw_fd();
    let r = unsafe { libc::close(fd) };
    if r == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
pub(super) fn close_file(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}
