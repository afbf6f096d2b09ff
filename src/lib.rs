//! Dogwatch: a minimal assertion-based test runner.
//!
//! A [`Suite`] performs assertions through a [`TestContext`]; the
//! [`TestRunner`] executes it on its own thread, guarded by a [`Watchdog`], and
//! writes a line-oriented report to a [`ReportSink`].
//!
//! ```rust,no_run
//! use dogwatch::{suite_fn, OutputBuffer, TestRunner};
//!
//! let suite = suite_fn("arithmetic", |t| {
//!     t.assert_equal(4, 2 + 2, "addition");
//!     t.assert_equal_within(0.3, 0.1 + 0.2, 1e-9, "floats");
//!     Ok(())
//! });
//! let report = TestRunner::new(suite, OutputBuffer::new())
//!     .with_timeout(1_000)
//!     .run();
//! assert!(!report.has_failures());
//! ```

pub mod cancel;
pub mod chrono;
pub mod cli;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod output;
pub mod report;
pub mod runner;
pub mod sample;
pub mod watchdog;

pub use crate::cancel::{CancelToken, Cancelled};
pub use crate::chrono::Chrono;
pub use crate::config::RunnerConfig;
pub use crate::errors::{ConfigError, RunnerError};
pub use crate::ledger::Ledger;
pub use crate::output::{
    shared_sink, ConsoleSink, JsonLinesSink, NullSink, OutputBuffer, ReportSink, SharedSink,
    WriterSink,
};
pub use crate::report::{CheckRecord, Outcome, ReportEvent, RunReport, RunState};
pub use crate::runner::{suite_fn, FnSuite, Suite, SuiteResult, TestContext, TestRunner};
pub use crate::watchdog::Watchdog;
