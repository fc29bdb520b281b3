//! Report renderers
//!
//! Each renderer is a [`ReportSink`] writing to any `io::Write`; the binary
//! points them at stdout. Failed runs always go to stderr, whatever the
//! format.

pub mod console;
pub mod csv;
pub mod json;

pub use console::ConsoleReporter;
pub use csv::CsvReporter;
pub use json::JsonReporter;

use colored::Colorize;
use contend_core::{BenchError, Combination, ReportSink};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// One row per run, for plotting scalability curves
    Csv,
    /// One JSON object per run (JSON Lines)
    Json,
}

/// Renderer for `format`, writing to stdout
pub fn sink_for(format: OutputFormat) -> Box<dyn ReportSink> {
    let stdout = io::stdout();
    match format {
        OutputFormat::Text => Box::new(ConsoleReporter::new(stdout)),
        OutputFormat::Csv => Box::new(CsvReporter::new(stdout)),
        OutputFormat::Json => Box::new(JsonReporter::new(stdout)),
    }
}

/// Print a failed run to stderr
pub fn report_failure(iteration: usize, combo: Combination, error: &BenchError) {
    eprintln!(
        "{} iteration {}: {} aborted: {}",
        "✗".bright_red(),
        iteration,
        combo,
        error
    );
}

/// Output handle that remembers the first write error instead of panicking
///
/// A closed stdout (e.g. piping into `head`) must not abort the suite.
pub(crate) struct Output<W: Write> {
    inner: W,
    failed: bool,
}

impl<W: Write> Output<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self {
            inner,
            failed: false,
        }
    }

    pub(crate) fn emit(&mut self, write: impl FnOnce(&mut W) -> io::Result<()>) {
        if self.failed {
            return;
        }
        if let Err(e) = write(&mut self.inner).and_then(|_| self.inner.flush()) {
            tracing::warn!("report output failed, further output dropped: {}", e);
            self.failed = true;
        }
    }

    pub(crate) fn into_inner(self) -> W {
        self.inner
    }
}
