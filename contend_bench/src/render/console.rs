// Human-readable, coloured report
use super::{report_failure, Output};
use colored::Colorize;
use contend_core::memory::{cpu_count, platform_name};
use contend_core::{
    BenchConfig, BenchError, Combination, ReportSink, SuiteSummary, SyncMode, TestReport,
    WorkerKind,
};
use std::io::Write;

const SEPARATOR_WIDTH: usize = 50;

pub struct ConsoleReporter<W: Write> {
    out: Output<W>,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Output::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

fn kind_label(kind: WorkerKind) -> &'static str {
    match kind {
        WorkerKind::Process => "PROCESSES",
        WorkerKind::Thread => "THREADS",
    }
}

fn title(report: &TestReport) -> String {
    let mode = match report.mode {
        SyncMode::Synchronized => "WITH SYNCHRONIZATION",
        SyncMode::Unsynchronized => "WITHOUT SYNCHRONIZATION",
    };
    format!("=== {} ({}) ===", kind_label(report.kind), mode)
}

impl<W: Write> ReportSink for ConsoleReporter<W> {
    fn suite_started(&mut self, config: &BenchConfig) {
        self.out.emit(|w| {
            writeln!(w, "{}", "=== PROCESSES vs THREADS ===".bright_cyan().bold())?;
            writeln!(w, "{}", "Configuration:".bright_yellow())?;
            writeln!(
                w,
                "  • Workers: {}",
                config.workers.to_string().bright_green()
            )?;
            writeln!(
                w,
                "  • Increments per worker: {}",
                config.increments.to_string().bright_green()
            )?;
            writeln!(
                w,
                "  • Test iterations: {}",
                config.iterations.to_string().bright_green()
            )?;
            writeln!(w, "  • Host: {} with {} CPUs", platform_name(), cpu_count())?;
            writeln!(w)
        });
    }

    fn iteration_started(&mut self, iteration: usize, total: usize) {
        let header = format!(">>> ITERATION {}/{} <<<", iteration, total);
        let header = header.bright_white().bold();
        self.out.emit(|w| writeln!(w, "{}", header));
    }

    fn run_finished(&mut self, _iteration: usize, report: &TestReport) {
        let verdict = if report.is_correct() {
            "YES".bright_green().bold()
        } else {
            format!("NO ({} lost updates)", report.lost_updates())
                .bright_red()
                .bold()
        };

        self.out.emit(|w| {
            writeln!(w)?;
            writeln!(w, "{}", title(report).bright_blue().bold())?;
            writeln!(w, "Workers: {}", report.worker_count)?;
            writeln!(w, "Increments per worker: {}", report.increments_per_worker)?;
            writeln!(w, "Expected total: {}", report.expected_total)?;
            writeln!(w, "Final counter: {}", report.observed_total)?;
            writeln!(w, "Correct result: {}", verdict)?;
            writeln!(w, "Execution time: {:.2} ms", report.elapsed_wall_ms)?;
            writeln!(w, "Throughput: {:.2} ops/ms", report.throughput_ops_per_ms())?;
            writeln!(
                w,
                "CPU time: {:.4} s (user {:.4} s, sys {:.4} s)",
                report.cpu_time_s(),
                report.cpu_user_s,
                report.cpu_system_s
            )?;
            writeln!(w, "CPU utilization: {:.2}%", report.cpu_utilization_percent())
        });
    }

    fn run_failed(&mut self, iteration: usize, combo: Combination, error: &BenchError) {
        report_failure(iteration, combo, error);
    }

    fn iteration_finished(&mut self, _iteration: usize, _total: usize) {
        self.out.emit(|w| {
            writeln!(w)?;
            writeln!(w, "{}", "=".repeat(SEPARATOR_WIDTH))
        });
    }

    fn suite_finished(&mut self, summary: &SuiteSummary) {
        let incorrect = match summary.incorrect() {
            0 => "0".bright_green(),
            n => n.to_string().bright_red(),
        };
        self.out.emit(|w| {
            writeln!(w)?;
            writeln!(w, "{}", "Summary:".bright_yellow())?;
            writeln!(w, "  • Runs: {}", summary.runs())?;
            writeln!(w, "  • Incorrect results: {}", incorrect)?;
            writeln!(w, "  • Failed runs: {}", summary.failures)
        });
    }
}
