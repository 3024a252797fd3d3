//! Bounded polling for delayed detection results.
//!
//! Attempts run strictly one after another. Only an empty result is retried;
//! any fetch error ends the loop at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::detect::DetectionResult;
use crate::error::{PipelineError, Result};

pub const DEFAULT_POLL_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 600;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total fetch invocations, including the first.
    pub max_attempts: u32,
    /// Pause between an empty result and the next attempt.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_POLL_ATTEMPTS,
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// Suspends the polling flow between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Parks the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Cooperative stop flag checked before each retry.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Invoke `fetch_one` until it yields at least one box or the attempt budget
/// runs out.
///
/// An exhausted budget is a success carrying the last (empty) result. A zero
/// budget still makes one attempt.
pub fn poll<F>(
    mut fetch_one: F,
    policy: PollPolicy,
    sleeper: &dyn Sleeper,
    cancel: Option<&CancelToken>,
) -> Result<DetectionResult>
where
    F: FnMut() -> Result<DetectionResult>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = fetch_one()?;
        log::debug!(
            "poll attempt {}/{}: {} detection(s)",
            attempt,
            max_attempts,
            result.total()
        );
        if result.has_detections() || attempt >= max_attempts {
            if !result.has_detections() {
                log::info!("no detections after {} attempt(s)", attempt);
            }
            return Ok(result);
        }
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(PipelineError::Cancelled { attempts: attempt });
        }
        sleeper.sleep(policy.interval);
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(PipelineError::Cancelled { attempts: attempt });
        }
    }
}
