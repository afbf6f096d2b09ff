//! Report model shared by the ledger, the runner and the sinks.
//!
//! The `Display` implementations here define the canonical line-oriented text
//! report. It is meant for humans; use the JSON sink for tooling.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};

// ============================================================================
// OUTCOMES & STATES
// ============================================================================

/// Terminal outcome of a single `run()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The suite body returned (or failed unexpectedly) before the watchdog fired.
    Completed,
    /// The watchdog fired first; the body was abandoned.
    TimedOut,
}

/// Runner state machine: `Idle -> Running -> {Completed, TimedOut}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    TimedOut,
}

impl From<Outcome> for RunState {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Completed => RunState::Completed,
            Outcome::TimedOut => RunState::TimedOut,
        }
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// One pass/fail record in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckRecord {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    /// Injected by the runner (timeout, unexpected failure) rather than the suite.
    pub synthetic: bool,
}

impl CheckRecord {
    pub fn new(name: impl Into<String>, passed: bool, diagnostic: Option<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            diagnostic,
            synthetic: false,
        }
    }

    pub fn synthetic(name: impl Into<String>, diagnostic: Option<String>) -> Self {
        Self {
            synthetic: true,
            ..Self::new(name, false, diagnostic)
        }
    }
}

impl Display for CheckRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.passed {
            return write!(f, "\ttest {} passed.", self.name);
        }
        write!(f, "\ttest {} failed", self.name)?;
        if let Some(diagnostic) = &self.diagnostic {
            write!(f, " {}", diagnostic)?;
        }
        Ok(())
    }
}

/// Summary of one run, also returned to embedding callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub outcome: Outcome,
    pub passed: usize,
    pub failed: usize,
    pub elapsed_ms: f64,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.passed as f64 / self.total() as f64) * 100.0
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Tests ended. {} tests passed and {} failed.",
            self.passed, self.failed
        )?;
        write!(f, "Total test time is {:.3} ms.", self.elapsed_ms)
    }
}

// ============================================================================
// EVENTS
// ============================================================================

/// Everything a sink can be asked to render, in emission order:
/// one `Started`, any number of `Check`, one `Finished`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportEvent<'a> {
    Started,
    Check(&'a CheckRecord),
    Finished(&'a RunReport),
}

impl Display for ReportEvent<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ReportEvent::Started => write!(f, "Start of unit tests."),
            ReportEvent::Check(check) => check.fmt(f),
            ReportEvent::Finished(report) => report.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_check_lines() {
        let ok = CheckRecord::new("create", true, None);
        assert_eq!(ok.to_string(), "\ttest create passed.");

        let ko = CheckRecord::new("add", false, Some("expected 1 but got 2".into()));
        assert_eq!(ko.to_string(), "\ttest add failed expected 1 but got 2");

        let bare = CheckRecord::new("", false, None);
        assert_eq!(bare.to_string(), "\ttest  failed");
    }

    #[test]
    fn renders_summary() {
        let report = RunReport {
            outcome: Outcome::Completed,
            passed: 3,
            failed: 1,
            elapsed_ms: 12.5,
        };
        assert_eq!(
            ReportEvent::Finished(&report).to_string(),
            "Tests ended. 3 tests passed and 1 failed.\nTotal test time is 12.500 ms."
        );
        assert_eq!(report.total(), 4);
        assert!(report.has_failures());
        assert_eq!(report.success_rate(), 75.0);
    }

    #[test]
    fn events_serialize_with_a_tag() {
        let check = CheckRecord::synthetic("boom", None);
        let json = serde_json::to_value(ReportEvent::Check(&check)).unwrap();
        assert_eq!(json["event"], "check");
        assert_eq!(json["name"], "boom");
        assert_eq!(json["synthetic"], true);
        assert!(json.get("diagnostic").is_none());

        let started = serde_json::to_value(ReportEvent::Started).unwrap();
        assert_eq!(started["event"], "started");
    }
}
