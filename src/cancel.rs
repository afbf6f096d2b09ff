//! Cooperative cancellation for suite bodies.
//!
//! The runner never kills a suite thread. When the watchdog fires it flips the
//! run's [`CancelToken`]; a body that polls the token can leave its loop early,
//! a body that doesn't is simply abandoned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Returned by [`CancelToken::checkpoint`] once cancellation was requested.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("run cancelled by the watchdog")]
pub struct Cancelled;

/// Shared cancellation flag, cheap to clone across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    requested: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Yield point for long-running bodies: `t.checkpoint()?`.
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
