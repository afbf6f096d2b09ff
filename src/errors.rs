//! Dogwatch Error Handling
//!
//! Failures that happen *around* a suite (spawning a concurrency unit, loading
//! configuration) are typed here. Failures *inside* a suite never surface as
//! errors: the runner converts them into failed checks.

use miette::Diagnostic;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// RUNNER ERRORS
// ============================================================================

/// Errors raised while orchestrating a run.
#[derive(Error, Diagnostic, Debug)]
pub enum RunnerError {
    #[error("could not spawn the {unit} thread")]
    #[diagnostic(
        code(dogwatch::runner::spawn),
        help("the operating system refused to create a new thread")
    )]
    Spawn {
        unit: &'static str,
        #[source]
        source: io::Error,
    },
}

impl RunnerError {
    pub(crate) fn spawn(unit: &'static str, source: io::Error) -> Self {
        Self::Spawn { unit, source }
    }
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

/// Errors raised while loading or validating a [`crate::config::RunnerConfig`].
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("could not read configuration file '{}'", .path.display())]
    #[diagnostic(code(dogwatch::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in {origin}")]
    #[diagnostic(
        code(dogwatch::config::parse),
        help("expected a YAML mapping with optional `timeout_ms` and `poll_interval_ms` keys")
    )]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("poll interval must be at least 1 ms")]
    #[diagnostic(
        code(dogwatch::config::poll_interval),
        help("use `timeout_ms: 0` to disable the watchdog instead")
    )]
    InvalidPollInterval,
}
