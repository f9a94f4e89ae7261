//! Transfer progress reporting.
//!
//! The orchestrator never logs through ambient state; it reports events to
//! the [`TransferObserver`] it was given. The CLI passes [`TracingObserver`];
//! tests pass [`RecordingObserver`] and assert on what was captured.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::transfer::{Stage, TransferRecord};

/// Something that happened during a transfer.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    /// A stage is about to run.
    StageStarted(Stage),
    /// The remote size did not match yet; another check follows after `retry_in`.
    SizeNotReady {
        observed: u64,
        expected: u64,
        attempt: u32,
        retry_in: Duration,
    },
    /// Closing the fully read source failed. Not fatal.
    SourceCloseFailed { path: PathBuf, error: String },
    /// A failed transfer's destination was deleted.
    DestinationRemoved { path: PathBuf },
    /// A failed transfer's destination could not be deleted.
    CleanupFailed { path: PathBuf, error: String },
    Completed(TransferRecord),
    Failed { stage: Stage, message: String },
}

pub trait TransferObserver {
    fn event(&self, event: &TransferEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TransferObserver for TracingObserver {
    fn event(&self, event: &TransferEvent) {
        match event {
            TransferEvent::StageStarted(stage) => tracing::debug!(%stage, "stage started"),
            TransferEvent::SizeNotReady {
                observed,
                expected,
                attempt,
                retry_in,
            } => tracing::info!(
                observed,
                expected,
                attempt,
                "file size is not ready yet, retrying in {:?}",
                retry_in
            ),
            TransferEvent::SourceCloseFailed { path, error } => {
                tracing::warn!(path = %path.display(), "failed to close source: {}", error)
            }
            TransferEvent::DestinationRemoved { path } => {
                tracing::info!(path = %path.display(), "removed destination after failure")
            }
            TransferEvent::CleanupFailed { path, error } => tracing::error!(
                path = %path.display(),
                "could not remove destination after failure: {}",
                error
            ),
            TransferEvent::Completed(record) => tracing::info!("{}", record),
            TransferEvent::Failed { stage, message } => {
                tracing::error!(%stage, "transfer failed: {}", message)
            }
        }
    }
}

/// Captures events in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<TransferEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything observed so far.
    pub fn events(&self) -> Vec<TransferEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stages in the order they started.
    pub fn stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TransferEvent::StageStarted(s) => Some(s),
                _ => None,
            })
            .collect()
    }
}

impl TransferObserver for RecordingObserver {
    fn event(&self, event: &TransferEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
