//! One-shot watchdog timer.
//!
//! [`Watchdog::start`] arms a detached timer thread that sleeps for the whole
//! timeout and then invokes the callback, unless [`Watchdog::cancel`] was called
//! in the meantime. The sleep is never interrupted: cancellation only suppresses
//! the callback, and the timer thread ends on its own once the sleep is over.
//!
//! The cancelled flag is checked twice, before sleeping and right before firing.
//! This narrows the window between "check" and "fire" but does not close it; a
//! caller that needs a hard guarantee must ignore late effects itself (the
//! runner does, see [`crate::runner`]).
//!
//! All timers armed by one instance share its flag. Re-arming resets the flag to
//! `false`, so callers must cancel, or let fire, the previous timer first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::errors::RunnerError;

const TIMER_THREAD_NAME: &str = "dogwatch-watchdog";

#[derive(Debug)]
pub struct Watchdog {
    timeout: Duration,
    cancelled: Arc<AtomicBool>,
}

impl Watchdog {
    /// Creates a disarmed watchdog. A timeout of `0` disables it entirely.
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_enabled(&self) -> bool {
        !self.timeout.is_zero()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Arms the timer. Does nothing (and never calls `callback`) when disabled.
    pub fn start<F>(&self, callback: F) -> Result<(), RunnerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancelled.store(false, Ordering::Release);
        if !self.is_enabled() {
            trace!("watchdog disabled, not armed");
            return Ok(());
        }

        let cancelled = Arc::clone(&self.cancelled);
        let timeout = self.timeout;
        debug!(timeout_ms = timeout.as_millis() as u64, "arming watchdog");

        // The JoinHandle is dropped on purpose: the timer thread is detached.
        thread::Builder::new()
            .name(TIMER_THREAD_NAME.to_string())
            .spawn(move || {
                if cancelled.load(Ordering::Acquire) {
                    return;
                }
                thread::sleep(timeout);
                if cancelled.load(Ordering::Acquire) {
                    trace!("watchdog expired after cancellation, ignoring");
                    return;
                }
                debug!(timeout_ms = timeout.as_millis() as u64, "watchdog fired");
                callback();
            })
            .map_err(|source| RunnerError::spawn("watchdog", source))?;
        Ok(())
    }

    /// Suppresses the pending callback. Non-blocking; does not join the timer.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        debug!("watchdog cancelled");
    }
}
