//! Assertion ledger.
//!
//! The ledger owns the pass/fail counters of one run and the semantics of every
//! assertion primitive. Each primitive increments exactly one counter by one and
//! emits exactly one check line; both happen under the sink lock so a check is
//! never half-recorded.
//!
//! Names are optional in spirit: pass `""` and the line simply has an empty
//! name field.
//!
//! ## Primitives
//!
//! | primitive                   | passes when                                   |
//! |-----------------------------|-----------------------------------------------|
//! | `assert_true` / `_false`    | the value is `true` / `false`                 |
//! | `assert_equal`              | `expected == actual`                          |
//! | `assert_not_equal`          | `expected != actual`                          |
//! | `assert_equal_within`       | `|expected - actual| < precision`             |
//! | `assert_not_equal_within`   | `|expected - actual| > precision`             |
//! | `assert_throws::<K>`        | the closure fails with exactly `K`            |
//! | `assert_contains`           | a linear scan finds the value                 |
//! | `assert_not_contains`       | a linear scan does not find the value         |
//! | `assert_collection_equals`  | same length, equal elements in order          |
//! | `assert_null` / `_not_null` | the option is `None` / `Some`                 |
//! | `assert_same_type` / `_not` | the static types are / are not identical      |
//! | `pass` / `fail`             | always / never                                |

use std::any::{type_name, TypeId};
use std::cell::Cell;
use std::error::Error;
use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Once;
use std::thread;

use tracing::trace;

use crate::output::{lock_sink, SharedSink};
use crate::report::{CheckRecord, ReportEvent};
use crate::runner::SuiteResult;

pub struct Ledger {
    passed: AtomicUsize,
    failed: AtomicUsize,
    sealed: AtomicBool,
    sink: SharedSink,
}

impl Ledger {
    pub fn new(sink: SharedSink) -> Self {
        Self {
            passed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            sealed: AtomicBool::new(false),
            sink,
        }
    }

    pub fn passed(&self) -> usize {
        self.passed.load(Ordering::Acquire)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Acquire)
    }

    /// `(passed, failed)`
    pub fn counts(&self) -> (usize, usize) {
        let _sink = lock_sink(&self.sink);
        (self.passed(), self.failed())
    }

    /// Closes the ledger: later checks are neither counted nor emitted.
    pub fn seal(&self) {
        let _sink = lock_sink(&self.sink);
        self.sealed.store(true, Ordering::Release);
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Counts and emits one check. Returns `check.passed`.
    pub fn record(&self, check: CheckRecord) -> bool {
        let mut sink = lock_sink(&self.sink);
        if self.sealed.load(Ordering::Acquire) {
            trace!(name = %check.name, "ledger sealed, dropping late check");
            return check.passed;
        }
        let counter = if check.passed {
            &self.passed
        } else {
            &self.failed
        };
        counter.fetch_add(1, Ordering::AcqRel);
        sink.emit(&ReportEvent::Check(&check));
        check.passed
    }

    fn check(&self, name: &str, pass: bool, diagnostic: impl FnOnce() -> String) -> bool {
        let diagnostic = if pass { None } else { Some(diagnostic()) };
        self.record(CheckRecord::new(name, pass, diagnostic))
    }

    // ------------------------------------------------------------------------
    // Unconditional
    // ------------------------------------------------------------------------

    pub fn pass(&self, name: &str) -> bool {
        self.record(CheckRecord::new(name, true, None))
    }

    pub fn fail(&self, name: &str) -> bool {
        self.record(CheckRecord::new(name, false, None))
    }

    // ------------------------------------------------------------------------
    // Booleans
    // ------------------------------------------------------------------------

    pub fn assert_true(&self, value: bool, name: &str) -> bool {
        self.check(name, value, || expected_but_got(&true, &value))
    }

    pub fn assert_false(&self, value: bool, name: &str) -> bool {
        self.check(name, !value, || expected_but_got(&false, &value))
    }

    // ------------------------------------------------------------------------
    // Equality
    // ------------------------------------------------------------------------

    pub fn assert_equal<T: PartialEq + Debug>(&self, expected: T, actual: T, name: &str) -> bool {
        self.check(name, expected == actual, || {
            expected_but_got(&expected, &actual)
        })
    }

    pub fn assert_not_equal<T: PartialEq + Debug>(
        &self,
        not_expected: T,
        actual: T,
        name: &str,
    ) -> bool {
        self.check(name, not_expected != actual, || {
            format!("{:?} was not expected", actual)
        })
    }

    /// Strict: a delta exactly equal to `precision` fails.
    pub fn assert_equal_within(&self, expected: f64, actual: f64, precision: f64, name: &str) -> bool {
        let delta = (expected - actual).abs();
        self.check(name, delta < precision, || {
            format!("{} (precision {})", expected_but_got(&expected, &actual), precision)
        })
    }

    /// Strict: a delta exactly equal to `precision` fails here too.
    pub fn assert_not_equal_within(
        &self,
        not_expected: f64,
        actual: f64,
        precision: f64,
        name: &str,
    ) -> bool {
        let delta = (not_expected - actual).abs();
        self.check(name, delta > precision, || {
            format!("{:?} was not expected (precision {})", actual, precision)
        })
    }

    // ------------------------------------------------------------------------
    // Failures
    // ------------------------------------------------------------------------

    /// Passes iff `f` fails with exactly `K`, either returned as the error or
    /// raised as a panic payload. Success, another error type or another panic
    /// all fail the check.
    pub fn assert_throws<K>(&self, f: impl FnOnce() -> SuiteResult, name: &str) -> bool
    where
        K: Error + 'static,
    {
        let outcome = catch_quietly(f);
        let (pass, diagnostic) = match outcome {
            Ok(Ok(())) => (false, "nothing was raised".to_string()),
            Ok(Err(err)) if err.downcast_ref::<K>().is_some() => (true, String::new()),
            Ok(Err(err)) => (false, format!("unexpected error: {}", err)),
            Err(payload) if payload.downcast_ref::<K>().is_some() => (true, String::new()),
            Err(_) => (false, "unexpected panic".to_string()),
        };
        self.check(name, pass, || {
            format!("{} expected but {}", type_name::<K>(), diagnostic)
        })
    }

    // ------------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------------

    pub fn assert_contains<'a, T, I>(&self, seq: I, value: &T, name: &str) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: PartialEq + 'a,
    {
        let found = seq.into_iter().any(|item| item == value);
        self.check(name, found, || "element not found".to_string())
    }

    pub fn assert_not_contains<'a, T, I>(&self, seq: I, value: &T, name: &str) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: PartialEq + 'a,
    {
        let found = seq.into_iter().any(|item| item == value);
        self.check(name, !found, || "element found".to_string())
    }

    /// Element-wise comparison that stops at the first difference. The two
    /// sides may come from different containers.
    pub fn assert_collection_equals<'a, 'b, T, A, B>(&self, left: A, right: B, name: &str) -> bool
    where
        A: IntoIterator<Item = &'a T>,
        B: IntoIterator<Item = &'b T>,
        T: PartialEq + 'a + 'b,
    {
        let mut left = left.into_iter();
        let mut right = right.into_iter();
        let mut index = 0usize;
        let mismatch = loop {
            match (left.next(), right.next()) {
                (None, None) => break None,
                (Some(l), Some(r)) if l == r => index += 1,
                (Some(_), Some(_)) => break Some(format!("collections differ at index {}", index)),
                _ => break Some(format!("collections differ in length after {} elements", index)),
            }
        };
        let pass = mismatch.is_none();
        self.check(name, pass, || mismatch.unwrap_or_default())
    }

    // ------------------------------------------------------------------------
    // Presence
    // ------------------------------------------------------------------------

    pub fn assert_null<T>(&self, value: &Option<T>, name: &str) -> bool {
        self.check(name, value.is_none(), || "value is not null".to_string())
    }

    pub fn assert_not_null<T>(&self, value: &Option<T>, name: &str) -> bool {
        self.check(name, value.is_some(), || "value is null".to_string())
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    pub fn assert_same_type<A, B>(&self, _left: &A, _right: &B, name: &str) -> bool
    where
        A: ?Sized + 'static,
        B: ?Sized + 'static,
    {
        let same = TypeId::of::<A>() == TypeId::of::<B>();
        self.check(name, same, || {
            format!("not the same type ({} vs {})", type_name::<A>(), type_name::<B>())
        })
    }

    pub fn assert_not_same_type<A, B>(&self, _left: &A, _right: &B, name: &str) -> bool
    where
        A: ?Sized + 'static,
        B: ?Sized + 'static,
    {
        let same = TypeId::of::<A>() == TypeId::of::<B>();
        self.check(name, !same, || format!("the same type ({})", type_name::<A>()))
    }
}

fn expected_but_got<T: Debug + ?Sized>(expected: &T, actual: &T) -> String {
    format!("expected {:?} but got {:?}", expected, actual)
}

// ============================================================================
// QUIET PANICS
// ============================================================================

thread_local! {
    static EXPECTING_PANIC: Cell<bool> = Cell::new(false);
}

static QUIET_HOOK: Once = Once::new();

/// `catch_unwind` without the panic hook's stderr report. Only panics raised
/// on this thread while `f` runs are silenced; every other panic still goes
/// through the previously installed hook.
fn catch_quietly<R>(f: impl FnOnce() -> R) -> thread::Result<R> {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !EXPECTING_PANIC.with(Cell::get) {
                previous(info);
            }
        }));
    });
    let was_expecting = EXPECTING_PANIC.with(|flag| flag.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    EXPECTING_PANIC.with(|flag| flag.set(was_expecting));
    outcome
}
