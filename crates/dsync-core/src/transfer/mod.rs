//! Copy-compute-verify orchestration.
//!
//! Stages run strictly in order: open source, create destination, copy with
//! inline Adler-32, close, wait for the remote size, fetch remote attributes,
//! compare checksums. Any failure after the destination exists removes it.

mod error;
mod record;

pub use error::{Stage, TransferError};
pub use record::{format_elapsed, human_size, TransferRecord};

use std::path::Path;
use std::time::Instant;

use crate::attributes::AttributeStore;
use crate::config::DsyncConfig;
use crate::control::CancelToken;
use crate::copier::{Copier, CopyOutcome, DEFAULT_BLOCK_SIZE};
use crate::observer::{TransferEvent, TransferObserver};
use crate::storage::{DestinationFile, RemoveOnDrop, SourceFile};
use crate::wait::{self, WaitPolicy};

/// Tunables for one transfer.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub block_size: usize,
    pub wait: WaitPolicy,
    pub cancel: CancelToken,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            wait: WaitPolicy::default(),
            cancel: CancelToken::new(),
        }
    }
}

impl TransferOptions {
    pub fn from_config(cfg: &DsyncConfig) -> Self {
        Self {
            block_size: cfg.block_size,
            wait: cfg.wait.policy(),
            cancel: CancelToken::new(),
        }
    }
}

/// Runs a single verified copy against an attribute store.
pub struct Transfer<'a> {
    store: &'a dyn AttributeStore,
    observer: &'a dyn TransferObserver,
    options: TransferOptions,
}

impl<'a> Transfer<'a> {
    pub fn new(
        store: &'a dyn AttributeStore,
        observer: &'a dyn TransferObserver,
        options: TransferOptions,
    ) -> Self {
        Self {
            store,
            observer,
            options,
        }
    }

    /// Copy `source` to `destination` and verify it against the store.
    pub fn run(&self, source: &Path, destination: &Path) -> Result<TransferRecord, TransferError> {
        let result = self.run_stages(source, destination);
        match &result {
            Ok(record) => self.observer.event(&TransferEvent::Completed(record.clone())),
            Err(e) => self.observer.event(&TransferEvent::Failed {
                stage: e.stage(),
                message: e.chain_message(),
            }),
        }
        result
    }

    fn stage(&self, stage: Stage) {
        self.observer.event(&TransferEvent::StageStarted(stage));
    }

    fn run_stages(&self, source: &Path, destination: &Path) -> Result<TransferRecord, TransferError> {
        let start = Instant::now();

        self.stage(Stage::OpenSource);
        let src = SourceFile::open(source).map_err(|e| TransferError::SourceOpen {
            path: source.to_path_buf(),
            source: e,
        })?;

        self.stage(Stage::CreateDestination);
        let dst = DestinationFile::create(destination).map_err(|e| {
            TransferError::DestinationCreate {
                path: destination.to_path_buf(),
                source: e,
            }
        })?;
        let guard = RemoveOnDrop::new(destination);

        match self.copy_and_verify(src, dst, start) {
            Ok(record) => {
                guard.disarm();
                Ok(record)
            }
            Err(e) => {
                self.discard(guard);
                Err(e)
            }
        }
    }

    /// Everything after the destination exists. Both handles are consumed
    /// here, so they are closed before the caller decides on cleanup.
    fn copy_and_verify(
        &self,
        mut src: SourceFile,
        mut dst: DestinationFile,
        start: Instant,
    ) -> Result<TransferRecord, TransferError> {
        let destination = dst.path().to_path_buf();
        let expected = src.len();

        self.stage(Stage::Copy);
        let copier = Copier::new(self.options.block_size).with_cancel(self.options.cancel.clone());
        let CopyOutcome { checksum, .. } =
            copier
                .copy(&mut src, &mut dst)
                .map_err(|e| TransferError::Copy {
                    path: destination.clone(),
                    source: e,
                })?;

        let source_path = src.path().to_path_buf();
        if let Err(e) = src.close() {
            self.observer.event(&TransferEvent::SourceCloseFailed {
                path: source_path.clone(),
                error: e.to_string(),
            });
        }

        self.stage(Stage::CloseDestination);
        dst.close().map_err(|e| TransferError::DestinationClose {
            path: destination.clone(),
            source: e,
        })?;

        self.stage(Stage::WaitForSize);
        wait::wait_for_size(
            self.store,
            &destination,
            expected,
            &self.options.wait,
            &self.options.cancel,
            self.observer,
        )
        .map_err(|e| TransferError::Wait {
            path: destination.clone(),
            source: e,
        })?;

        self.stage(Stage::Metadata);
        let metadata_err = |e| TransferError::Metadata {
            path: destination.clone(),
            source: e,
        };
        let remote_checksum = self.store.checksum(&destination).map_err(metadata_err)?;
        let remote_id = self.store.identifier(&destination).map_err(metadata_err)?;

        self.stage(Stage::Verify);
        let remote_checksum = remote_checksum.ok_or_else(|| TransferError::ChecksumUnavailable {
            path: destination.clone(),
            local: checksum.clone(),
        })?;
        if !checksums_match(&checksum, &remote_checksum) {
            return Err(TransferError::ChecksumMismatch {
                path: destination,
                expected: checksum,
                actual: remote_checksum,
            });
        }

        let source = std::fs::canonicalize(&source_path).unwrap_or(source_path);
        Ok(TransferRecord {
            source,
            destination,
            remote_id,
            checksum,
            remote_checksum,
            size: expected,
            elapsed: start.elapsed(),
        })
    }

    fn discard(&self, guard: RemoveOnDrop) {
        let path = guard.path().to_path_buf();
        match guard.remove() {
            Ok(true) => self
                .observer
                .event(&TransferEvent::DestinationRemoved { path }),
            Ok(false) => {}
            Err(e) => self.observer.event(&TransferEvent::CleanupFailed {
                path,
                error: e.to_string(),
            }),
        }
    }
}

/// Compare two Adler-32 renderings as numbers, so case, a `0x` prefix, and
/// missing leading zeros do not matter. Unparseable values never match.
pub fn checksums_match(local: &str, remote: &str) -> bool {
    match (parse_checksum_value(local), parse_checksum_value(remote)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn parse_checksum_value(s: &str) -> Option<u32> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() || digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
