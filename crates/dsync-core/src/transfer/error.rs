//! Transfer stages and their failures.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::copier::CopyError;
use crate::wait::WaitError;

/// Orchestrator stage. Each terminal failure belongs to exactly one stage,
/// and each stage has its own process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    OpenSource,
    CreateDestination,
    Copy,
    CloseDestination,
    WaitForSize,
    Metadata,
    Verify,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::OpenSource,
        Stage::CreateDestination,
        Stage::Copy,
        Stage::CloseDestination,
        Stage::WaitForSize,
        Stage::Metadata,
        Stage::Verify,
    ];

    /// Process exit status for a failure in this stage.
    pub fn exit_code(self) -> i32 {
        match self {
            Stage::OpenSource => 2,
            Stage::CreateDestination => 3,
            Stage::Copy => 4,
            Stage::CloseDestination => 5,
            Stage::Verify => 6,
            Stage::WaitForSize => 7,
            Stage::Metadata => 8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::OpenSource => "open-source",
            Stage::CreateDestination => "create-destination",
            Stage::Copy => "copy",
            Stage::CloseDestination => "close-destination",
            Stage::WaitForSize => "wait-for-size",
            Stage::Metadata => "metadata",
            Stage::Verify => "checksum-mismatch",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to open source file {}", .path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Includes the case where the destination already exists.
    #[error("failed to create destination file {}", .path.display())]
    DestinationCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy into {}", .path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: CopyError,
    },

    #[error("failed to close destination {}", .path.display())]
    DestinationClose {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("remote copy of {} never reached its expected size", .path.display())]
    Wait {
        path: PathBuf,
        #[source]
        source: WaitError,
    },

    #[error("failed to read remote metadata for {}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The checksum pseudo-file had no `ADLER32:` entry.
    #[error("remote checksum unavailable for {} (local {local})", .path.display())]
    ChecksumUnavailable { path: PathBuf, local: String },

    #[error("checksum mismatch: <expected/actual> {expected}/{actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl TransferError {
    pub fn stage(&self) -> Stage {
        match self {
            TransferError::SourceOpen { .. } => Stage::OpenSource,
            TransferError::DestinationCreate { .. } => Stage::CreateDestination,
            TransferError::Copy { .. } => Stage::Copy,
            TransferError::DestinationClose { .. } => Stage::CloseDestination,
            TransferError::Wait { .. } => Stage::WaitForSize,
            TransferError::Metadata { .. } => Stage::Metadata,
            TransferError::ChecksumUnavailable { .. } | TransferError::ChecksumMismatch { .. } => {
                Stage::Verify
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.stage().exit_code()
    }

    /// Message with the full source chain, e.g. for one-line error output.
    pub fn chain_message(&self) -> String {
        let mut msg = self.to_string();
        let mut cur = std::error::Error::source(self);
        while let Some(err) = cur {
            msg.push_str(": ");
            msg.push_str(&err.to_string());
            cur = err.source();
        }
        msg
    }
}
