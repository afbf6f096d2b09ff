//! Wall-clock stopwatch used to time a whole run.

use std::time::Instant;

/// Simple chronometer: `start`, then `stop`, then read `elapsed_millis`.
#[derive(Debug, Clone, Copy)]
pub struct Chrono {
    started: Instant,
    stopped: Instant,
}

impl Chrono {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            stopped: now,
        }
    }

    /// Records the start of the measure.
    pub fn start(&mut self) {
        self.started = Instant::now();
    }

    /// Records the end of the measure.
    pub fn stop(&mut self) {
        self.stopped = Instant::now();
    }

    /// Milliseconds between the last `start` and the last `stop`.
    ///
    /// Never negative: a `stop` older than `start` reads as zero.
    pub fn elapsed_millis(&self) -> f64 {
        self.stopped.saturating_duration_since(self.started).as_secs_f64() * 1000.0
    }
}

impl Default for Chrono {
    fn default() -> Self {
        Self::new()
    }
}
