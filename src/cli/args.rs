//! Defines the command-line arguments and subcommands for the Dogwatch CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "dogwatch",
    version,
    about = "Runs assertion-based test suites under a watchdog timeout."
)]
pub struct DogwatchArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the sample Ratio suite.
    Ratio {
        #[command(flatten)]
        options: RunOptions,
    },
    /// Run a well-behaved suite, then one that loops until the watchdog fires.
    Demo {
        #[command(flatten)]
        options: RunOptions,
        /// Watchdog timeout of the looping suite, in milliseconds.
        #[arg(long, default_value_t = 3000)]
        loop_timeout_ms: u64,
    },
    /// Arm a bare watchdog and report whether its callback ran.
    Watchdog {
        /// Watchdog timeout in milliseconds (0 disables it).
        #[arg(long, default_value_t = 3000)]
        timeout_ms: u64,
        /// Cancel the watchdog after this many milliseconds.
        #[arg(long)]
        cancel_after_ms: Option<u64>,
    },
}

/// Options shared by every subcommand that runs a suite.
#[derive(Debug, Args)]
pub struct RunOptions {
    /// Watchdog timeout in milliseconds (0 disables it).
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Interval between completion checks, in milliseconds.
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,
    /// YAML file with `timeout_ms` / `poll_interval_ms` defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
    /// When to color the text report.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}
