//! Test runner: one suite, one watchdog, one report per `run()`.
//!
//! ## Protocol
//!
//! 1. Reset: a fresh [`Ledger`] is created, the header is emitted, the
//!    chronometer starts and the watchdog is armed with a callback that raises
//!    `aborted` and cancels the run's [`CancelToken`].
//! 2. The suite body runs on its own thread while the orchestrator polls
//!    `testing` / `aborted` every `poll_interval_ms`. This is a cooperative
//!    busy-wait, not an event-driven wake-up.
//! 3. If the body finished, the run is `Completed` and the watchdog is
//!    cancelled. Otherwise the watchdog fired: the run is `TimedOut` and one
//!    synthetic failed check is recorded.
//! 4. The body thread is detached in both cases. A body stuck in a loop that
//!    never polls its token keeps running in the background.
//! 5. The ledger is sealed, the chronometer stops and the summary is emitted.
//!
//! When both flags flip within the same poll interval, normal completion wins.
//! A body that leaves through `t.checkpoint()?` after the watchdog fired has
//! not completed: the run is reported as timed out.
//!
//! Failures inside the body never escape: an `Err` return or a panic becomes
//! one synthetic failed check, and the body counts as finished.

use std::any::Any;
use std::error::Error;
use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::cancel::{CancelToken, Cancelled};
use crate::chrono::Chrono;
use crate::config::RunnerConfig;
use crate::errors::RunnerError;
use crate::ledger::Ledger;
use crate::output::{lock_sink, shared_sink, ReportSink, SharedSink};
use crate::report::{CheckRecord, Outcome, ReportEvent, RunReport, RunState};
use crate::watchdog::Watchdog;

pub const TIMEOUT_CHECK: &str = "*** timeout: the test does not respond ***";
pub const UNEXPECTED_FAILURE_CHECK: &str = "*** unexpected failure ***";
pub const RUNNER_FAILURE_CHECK: &str = "*** runner failure ***";

const BODY_THREAD_NAME: &str = "dogwatch-suite";

/// What a suite body returns. Any error counts as an unexpected failure.
pub type SuiteResult = Result<(), Box<dyn Error + Send + Sync>>;

// ============================================================================
// SUITE CONTRACT
// ============================================================================

/// A unit of test code, executed once per run on its own thread.
pub trait Suite: Send + Sync + 'static {
    /// Performs the assertions. Returning an error, or panicking, is recorded
    /// as one failed check.
    fn test_code(&self, t: &TestContext) -> SuiteResult;

    fn name(&self) -> &str {
        "suite"
    }
}

/// A [`Suite`] made from a closure, see [`suite_fn`].
pub struct FnSuite<F> {
    name: String,
    body: F,
}

/// Wraps a closure as a named suite.
pub fn suite_fn<F>(name: impl Into<String>, body: F) -> FnSuite<F>
where
    F: Fn(&TestContext) -> SuiteResult + Send + Sync + 'static,
{
    FnSuite {
        name: name.into(),
        body,
    }
}

impl<F> Suite for FnSuite<F>
where
    F: Fn(&TestContext) -> SuiteResult + Send + Sync + 'static,
{
    fn test_code(&self, t: &TestContext) -> SuiteResult {
        (self.body)(t)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Handle given to a suite body: the run's ledger plus its cancel token.
///
/// Derefs to [`Ledger`], so assertions read `t.assert_true(..)`.
pub struct TestContext {
    ledger: Arc<Ledger>,
    token: CancelToken,
}

impl TestContext {
    /// True once the watchdog fired for this run.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        self.token.checkpoint()
    }
}

impl Deref for TestContext {
    type Target = Ledger;

    fn deref(&self) -> &Ledger {
        &self.ledger
    }
}

// ============================================================================
// RUNNER
// ============================================================================

pub struct TestRunner<S: Suite> {
    suite: Arc<S>,
    sink: SharedSink,
    config: RunnerConfig,
    watchdog: Watchdog,
    chrono: Chrono,
    state: RunState,
    ledger: Option<Arc<Ledger>>,
    last_report: Option<RunReport>,
}

impl<S: Suite> TestRunner<S> {
    /// Runner with the default configuration (30 s timeout, 50 ms polling).
    pub fn new(suite: S, sink: impl ReportSink + 'static) -> Self {
        let config = RunnerConfig::default();
        Self {
            suite: Arc::new(suite),
            sink: shared_sink(sink),
            watchdog: Watchdog::new(config.timeout_ms),
            config,
            chrono: Chrono::new(),
            state: RunState::Idle,
            ledger: None,
            last_report: None,
        }
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.watchdog = Watchdog::new(config.timeout_ms);
        self.config = config;
        self
    }

    /// `0` disables the watchdog.
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self.watchdog = Watchdog::new(timeout_ms);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.config.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    /// Passed checks of the current (or last) run.
    pub fn passed(&self) -> usize {
        self.ledger.as_ref().map_or(0, |ledger| ledger.passed())
    }

    /// Failed checks of the current (or last) run.
    pub fn failed(&self) -> usize {
        self.ledger.as_ref().map_or(0, |ledger| ledger.failed())
    }

    /// Executes the suite once and emits the full report to the sink.
    pub fn run(&mut self) -> RunReport {
        self.state = RunState::Idle;
        let ledger = Arc::new(Ledger::new(Arc::clone(&self.sink)));
        self.ledger = Some(Arc::clone(&ledger));

        lock_sink(&self.sink).emit(&ReportEvent::Started);
        info!(
            suite = self.suite.name(),
            timeout_ms = self.config.timeout_ms,
            "starting run"
        );
        self.chrono.start();
        self.state = RunState::Running;

        let token = CancelToken::new();
        let aborted = Arc::new(AtomicBool::new(false));
        // Raised before the body thread exists so the first poll cannot miss it.
        let testing = Arc::new(AtomicBool::new(true));

        let armed = {
            let aborted = Arc::clone(&aborted);
            let token = token.clone();
            self.watchdog.start(move || {
                aborted.store(true, Ordering::Release);
                token.cancel();
            })
        };
        if let Err(err) = armed {
            record_runner_failure(&ledger, &err);
        }

        let context = TestContext {
            ledger: Arc::clone(&ledger),
            token,
        };
        let body = spawn_body(Arc::clone(&self.suite), context, Arc::clone(&testing));
        if let Err(err) = &body {
            record_runner_failure(&ledger, err);
            testing.store(false, Ordering::Release);
        }

        let poll_interval = self.config.poll_interval();
        loop {
            thread::sleep(poll_interval);
            if !testing.load(Ordering::Acquire) || aborted.load(Ordering::Acquire) {
                break;
            }
        }

        let outcome = if !testing.load(Ordering::Acquire) {
            self.watchdog.cancel();
            Outcome::Completed
        } else {
            warn!(
                suite = self.suite.name(),
                timeout_ms = self.config.timeout_ms,
                "suite did not respond, abandoning its thread"
            );
            ledger.record(CheckRecord::synthetic(
                TIMEOUT_CHECK,
                Some(format!("no response within {} ms", self.config.timeout_ms)),
            ));
            Outcome::TimedOut
        };

        // Detach: the body thread is never joined nor killed.
        drop(body);
        ledger.seal();
        self.chrono.stop();

        let (passed, failed) = ledger.counts();
        let report = RunReport {
            outcome,
            passed,
            failed,
            elapsed_ms: self.chrono.elapsed_millis(),
        };
        lock_sink(&self.sink).emit(&ReportEvent::Finished(&report));
        info!(
            suite = self.suite.name(),
            ?outcome,
            passed,
            failed,
            elapsed_ms = report.elapsed_ms,
            "run finished"
        );

        self.state = outcome.into();
        self.last_report = Some(report.clone());
        report
    }
}

// ============================================================================
// BODY EXECUTION
// ============================================================================

/// How the suite body ended, as seen from the execution boundary.
enum BodyOutcome {
    Returned,
    /// Left through `checkpoint()?` after the watchdog fired.
    Cancelled,
    Failed(Box<dyn Error + Send + Sync>),
    Panicked(String),
}

impl BodyOutcome {
    /// `Cancelled` only counts as a cooperative exit when this run's token was
    /// cancelled; a stray `Cancelled` is an ordinary failure.
    fn capture(body: impl FnOnce() -> SuiteResult, token: &CancelToken) -> Self {
        match panic::catch_unwind(AssertUnwindSafe(body)) {
            Ok(Ok(())) => BodyOutcome::Returned,
            Ok(Err(err)) if err.is::<Cancelled>() && token.is_cancelled() => {
                BodyOutcome::Cancelled
            }
            Ok(Err(err)) => BodyOutcome::Failed(err),
            Err(payload) => BodyOutcome::Panicked(panic_message(payload.as_ref())),
        }
    }

    fn failure_reason(&self) -> Option<String> {
        match self {
            BodyOutcome::Returned | BodyOutcome::Cancelled => None,
            BodyOutcome::Failed(err) => Some(format!("error: {}", err)),
            BodyOutcome::Panicked(message) => Some(format!("panic: {}", message)),
        }
    }
}

fn spawn_body<S: Suite>(
    suite: Arc<S>,
    context: TestContext,
    testing: Arc<AtomicBool>,
) -> Result<JoinHandle<()>, RunnerError> {
    thread::Builder::new()
        .name(BODY_THREAD_NAME.to_string())
        .spawn(move || {
            let outcome = BodyOutcome::capture(|| suite.test_code(&context), &context.token);
            if let Some(reason) = outcome.failure_reason() {
                debug!(suite = suite.name(), %reason, "suite body failed unexpectedly");
                context.ledger.record(CheckRecord::synthetic(
                    UNEXPECTED_FAILURE_CHECK,
                    Some(reason),
                ));
            }
            // A cancelled body did not finish: leave `testing` up so the
            // orchestrator reports the timeout.
            if !matches!(outcome, BodyOutcome::Cancelled) {
                testing.store(false, Ordering::Release);
            }
        })
        .map_err(|source| RunnerError::spawn("suite", source))
}

fn record_runner_failure(ledger: &Ledger, err: &RunnerError) {
    warn!(error = %err, "runner failure");
    ledger.record(CheckRecord::synthetic(
        RUNNER_FAILURE_CHECK,
        Some(err.to_string()),
    ));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
