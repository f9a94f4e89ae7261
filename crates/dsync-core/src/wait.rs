//! Bounded wait for the remote copy to reach its expected size.
//!
//! dCache may report a short size for a while after the local close. The
//! waiter polls the store's size until it matches, sleeping between checks,
//! and gives up once the policy's time or attempt budget is spent.

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::attributes::AttributeStore;
use crate::control::CancelToken;
use crate::observer::{TransferEvent, TransferObserver};

/// How often cancellation is checked while sleeping.
const CANCEL_SLICE: Duration = Duration::from_millis(100);

/// Polling bounds for [`wait_for_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Pause between size checks.
    pub interval: Duration,
    /// Give up once this much time has passed since the first check.
    pub max_wait: Duration,
    /// Optional cap on the number of size checks (including the first).
    pub max_attempts: Option<u32>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_wait: Duration::from_secs(3600),
            max_attempts: None,
        }
    }
}

/// What to do after a check that did not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitDecision {
    GiveUp,
    RetryAfter(Duration),
}

impl WaitPolicy {
    /// `attempt` is 1-based; `elapsed` is measured from the first check.
    /// The last sleep is shortened so the final check lands on the deadline.
    pub fn decide(&self, attempt: u32, elapsed: Duration) -> WaitDecision {
        if let Some(max) = self.max_attempts {
            if attempt >= max {
                return WaitDecision::GiveUp;
            }
        }
        if elapsed >= self.max_wait {
            return WaitDecision::GiveUp;
        }
        let left = self.max_wait - elapsed;
        WaitDecision::RetryAfter(self.interval.min(left))
    }
}

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("remote size is {observed} of {expected} bytes after {attempts} checks over {waited:?}")]
    TimedOut {
        expected: u64,
        observed: u64,
        attempts: u32,
        waited: Duration,
    },
    #[error("wait for remote size cancelled")]
    Cancelled,
    #[error("could not read remote size")]
    Stat(#[source] io::Error),
}

/// Returned when the size matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    pub attempts: u32,
    pub waited: Duration,
}

/// Block until `store` reports `expected` bytes for `path`.
pub fn wait_for_size(
    store: &dyn AttributeStore,
    path: &Path,
    expected: u64,
    policy: &WaitPolicy,
    cancel: &CancelToken,
    observer: &dyn TransferObserver,
) -> Result<WaitOutcome, WaitError> {
    let start = Instant::now();
    let mut attempt = 1u32;
    loop {
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }
        let observed = store.size(path).map_err(WaitError::Stat)?;
        if observed == expected {
            return Ok(WaitOutcome {
                attempts: attempt,
                waited: start.elapsed(),
            });
        }
        match policy.decide(attempt, start.elapsed()) {
            WaitDecision::GiveUp => {
                return Err(WaitError::TimedOut {
                    expected,
                    observed,
                    attempts: attempt,
                    waited: start.elapsed(),
                });
            }
            WaitDecision::RetryAfter(delay) => {
                observer.event(&TransferEvent::SizeNotReady {
                    observed,
                    expected,
                    attempt,
                    retry_in: delay,
                });
                sleep_unless_cancelled(delay, cancel)?;
                attempt += 1;
            }
        }
    }
}

fn sleep_unless_cancelled(total: Duration, cancel: &CancelToken) -> Result<(), WaitError> {
    let deadline = Instant::now() + total;
    loop {
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        std::thread::sleep((deadline - now).min(CANCEL_SLICE));
    }
}
