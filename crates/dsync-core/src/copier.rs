//! Streaming copy with inline Adler-32.
//!
//! Each block is folded into the checksum and then written whole. A write
//! that accepts fewer bytes than the block is a hard failure; the copier never
//! retries or pads.

use std::io::{self, ErrorKind, Read, Write};
use thiserror::Error;

use crate::checksum::Adler32;
use crate::control::CancelToken;

/// Default read/write block size (1 MiB).
pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("read from source failed")]
    Read(#[source] io::Error),
    #[error("write to destination failed")]
    Write(#[source] io::Error),
    /// The destination accepted fewer bytes than the block held.
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    #[error("copy cancelled")]
    Cancelled,
}

/// Result of a completed copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    /// Finalized Adler-32 as 8 lowercase hex digits.
    pub checksum: String,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct Copier {
    block_size: usize,
    cancel: CancelToken,
}

impl Default for Copier {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

impl Copier {
    /// A zero block size is bumped to 1 byte.
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Copy `src` into `dst` until end of stream, returning the checksum of
    /// everything read.
    pub fn copy<R, W>(&self, src: &mut R, dst: &mut W) -> Result<CopyOutcome, CopyError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut buf = vec![0u8; self.block_size];
        let mut sum = Adler32::new();
        let mut bytes = 0u64;
        loop {
            if self.cancel.is_cancelled() {
                return Err(CopyError::Cancelled);
            }
            let n = match src.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(CopyError::Read(e)),
            };
            let block = &buf[..n];
            sum.update(block);
            let written = dst.write(block).map_err(CopyError::Write)?;
            if written != n {
                return Err(CopyError::ShortWrite {
                    written,
                    expected: n,
                });
            }
            bytes += n as u64;
        }
        Ok(CopyOutcome {
            checksum: sum.finalize(),
            bytes,
        })
    }
}
