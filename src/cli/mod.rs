//! The Dogwatch Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and wires the
//! sample suites to the runner.

use crate::cli::args::{ColorMode, Command, DogwatchArgs, Format, RunOptions};
use crate::config::RunnerConfig;
use crate::errors::ConfigError;
use crate::output::{ConsoleSink, JsonLinesSink, ReportSink};
use crate::runner::{Suite, TestRunner};
use crate::sample::{LoopingSuite, RatioSuite, SleepySuite};
use crate::watchdog::Watchdog;
use clap::Parser;
use std::sync::mpsc;
use std::time::Duration;
use std::{io, process, thread};
use termcolor::ColorChoice;

pub mod args;

/// How long the sleepy half of `demo` pauses.
const DEMO_PAUSE: Duration = Duration::from_millis(1000);
/// Extra wait past the deadline before `watchdog` concludes nothing fired.
const WATCHDOG_GRACE: Duration = Duration::from_millis(500);

/// The main entry point for the CLI.
pub fn run() {
    let args = DogwatchArgs::parse();

    // Dispatch to the appropriate subcommand handler.
    let result = match args.command {
        Command::Ratio { options } => handle_ratio(&options),
        Command::Demo {
            options,
            loop_timeout_ms,
        } => handle_demo(&options, loop_timeout_ms),
        Command::Watchdog {
            timeout_ms,
            cancel_after_ms,
        } => handle_watchdog(timeout_ms, cancel_after_ms),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(report) => {
            eprintln!("{:?}", report);
            process::exit(1);
        }
    }
}

/// Handles the `ratio` subcommand.
fn handle_ratio(options: &RunOptions) -> miette::Result<bool> {
    let config = resolve_config(options)?;
    Ok(run_suite(RatioSuite, config, options))
}

/// Handles the `demo` subcommand.
fn handle_demo(options: &RunOptions, loop_timeout_ms: u64) -> miette::Result<bool> {
    let config = resolve_config(options)?;
    let looping_config = RunnerConfig {
        timeout_ms: loop_timeout_ms,
        ..config.clone()
    };

    banner(options, "Test good one");
    let good = run_suite(SleepySuite::new(DEMO_PAUSE), config, options);
    banner(options, "Test bad one");
    let bad = run_suite(LoopingSuite::new(false), looping_config, options);
    Ok(good && bad)
}

/// Handles the `watchdog` subcommand.
fn handle_watchdog(timeout_ms: u64, cancel_after_ms: Option<u64>) -> miette::Result<bool> {
    let watchdog = Watchdog::new(timeout_ms);
    let (fired_tx, fired_rx) = mpsc::channel();
    watchdog.start(move || {
        let _ = fired_tx.send(());
    })?;

    if !watchdog.is_enabled() {
        println!("watchdog disabled");
        return Ok(true);
    }
    println!("watchdog armed for {} ms", timeout_ms);

    if let Some(delay) = cancel_after_ms {
        thread::sleep(Duration::from_millis(delay));
        watchdog.cancel();
    }

    // A cancelled timer drops its callback, which disconnects the channel.
    match fired_rx.recv_timeout(watchdog.timeout() + WATCHDOG_GRACE) {
        Ok(()) => println!("watchdog fired"),
        Err(_) => println!("watchdog cancelled"),
    }
    Ok(true)
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn resolve_config(options: &RunOptions) -> Result<RunnerConfig, ConfigError> {
    let mut config = match &options.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    if let Some(timeout_ms) = options.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(poll_interval_ms) = options.poll_interval_ms {
        config.poll_interval_ms = poll_interval_ms;
    }
    config.validate()?;
    Ok(config)
}

fn run_suite<S: Suite>(suite: S, config: RunnerConfig, options: &RunOptions) -> bool {
    let mut runner = TestRunner::new(suite, make_sink(options)).with_config(config);
    !runner.run().has_failures()
}

fn make_sink(options: &RunOptions) -> Box<dyn ReportSink> {
    match options.format {
        Format::Json => Box::new(JsonLinesSink::new(io::stdout())),
        Format::Text => Box::new(ConsoleSink::new(color_choice(options.color))),
    }
}

fn color_choice(mode: ColorMode) -> ColorChoice {
    match mode {
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto if atty::is(atty::Stream::Stdout) => ColorChoice::Auto,
        ColorMode::Auto => ColorChoice::Never,
    }
}

fn banner(options: &RunOptions, text: &str) {
    if options.format == Format::Text {
        println!("{}", text);
    }
}
