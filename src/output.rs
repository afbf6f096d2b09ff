//! Report sinks.
//!
//! A run writes its report through a single [`SharedSink`]. The orchestrating
//! thread emits the header and summary, the suite thread emits check lines;
//! the mutex keeps every event whole.
//!
//! Sinks swallow I/O errors: a broken pipe must not turn into a failed run.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::report::ReportEvent;

// ============================================================================
// SINK TRAIT
// ============================================================================

/// Destination for report events.
pub trait ReportSink: Send {
    fn emit(&mut self, event: &ReportEvent<'_>);
}

/// A sink shared between the orchestrator and the suite thread.
pub type SharedSink = Arc<Mutex<Box<dyn ReportSink>>>;

impl<T: ReportSink + ?Sized> ReportSink for Box<T> {
    fn emit(&mut self, event: &ReportEvent<'_>) {
        (**self).emit(event);
    }
}

pub fn shared_sink(sink: impl ReportSink + 'static) -> SharedSink {
    Arc::new(Mutex::new(Box::new(sink)))
}

/// Locks a shared sink, recovering it if a previous holder panicked.
pub(crate) fn lock_sink(sink: &SharedSink) -> MutexGuard<'_, Box<dyn ReportSink>> {
    sink.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// OUTPUT SINKS
// ============================================================================

/// Discards everything.
pub struct NullSink;

impl ReportSink for NullSink {
    fn emit(&mut self, _event: &ReportEvent<'_>) {}
}

/// OutputBuffer: collects the text report for tests or programmatic capture.
///
/// Clones share the same buffer, so keep one clone and hand the other to the runner.
#[derive(Clone, Default)]
pub struct OutputBuffer {
    buffer: Arc<Mutex<String>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ReportSink for OutputBuffer {
    fn emit(&mut self, event: &ReportEvent<'_>) {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.push_str(&event.to_string());
        buffer.push('\n');
    }
}

/// Plain text report to any writer.
pub struct WriterSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ReportSink for WriterSink<W> {
    fn emit(&mut self, event: &ReportEvent<'_>) {
        let _ = writeln!(self.writer, "{}", event);
        let _ = self.writer.flush();
    }
}

/// Colored text report on stdout.
pub struct ConsoleSink {
    stream: StandardStream,
}

impl ConsoleSink {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stream: StandardStream::stdout(choice),
        }
    }

    fn emit_status(&mut self, word: &str, color: Color) {
        let _ = self
            .stream
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(self.stream, "{}", word);
        let _ = self.stream.reset();
    }
}

impl ReportSink for ConsoleSink {
    fn emit(&mut self, event: &ReportEvent<'_>) {
        match event {
            ReportEvent::Check(check) => {
                let _ = write!(self.stream, "\ttest {} ", check.name);
                if check.passed {
                    self.emit_status("passed.", Color::Green);
                } else {
                    self.emit_status("failed", Color::Red);
                    if let Some(diagnostic) = &check.diagnostic {
                        let _ = write!(self.stream, " {}", diagnostic);
                    }
                }
                let _ = writeln!(self.stream);
            }
            ReportEvent::Finished(report) => {
                let color = if report.has_failures() {
                    Color::Red
                } else {
                    Color::Green
                };
                let _ = self.stream.set_color(ColorSpec::new().set_fg(Some(color)));
                let _ = writeln!(self.stream, "{}", event);
                let _ = self.stream.reset();
            }
            ReportEvent::Started => {
                let _ = writeln!(self.stream, "{}", event);
            }
        }
        let _ = self.stream.flush();
    }
}

/// One JSON object per event, one event per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ReportSink for JsonLinesSink<W> {
    fn emit(&mut self, event: &ReportEvent<'_>) {
        if serde_json::to_writer(&mut self.writer, event).is_ok() {
            let _ = writeln!(self.writer);
        }
        let _ = self.writer.flush();
    }
}
