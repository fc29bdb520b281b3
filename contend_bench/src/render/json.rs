// JSON Lines output, one object per run
use super::{report_failure, Output};
use contend_core::{BenchError, Combination, ReportSink, TestReport};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct RunRecord<'a> {
    iteration: usize,
    #[serde(flatten)]
    report: &'a TestReport,
    correct: bool,
    lost_updates: u64,
    cpu_time_s: f64,
    throughput_ops_ms: f64,
    cpu_utilization_percent: f64,
}

impl<'a> RunRecord<'a> {
    fn new(iteration: usize, report: &'a TestReport) -> Self {
        Self {
            iteration,
            report,
            correct: report.is_correct(),
            lost_updates: report.lost_updates(),
            cpu_time_s: report.cpu_time_s(),
            throughput_ops_ms: report.throughput_ops_per_ms(),
            cpu_utilization_percent: report.cpu_utilization_percent(),
        }
    }
}

pub struct JsonReporter<W: Write> {
    out: Output<W>,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Output::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> ReportSink for JsonReporter<W> {
    fn run_finished(&mut self, iteration: usize, report: &TestReport) {
        let record = RunRecord::new(iteration, report);
        self.out.emit(|w| {
            serde_json::to_writer(&mut *w, &record)?;
            writeln!(w)
        });
    }

    fn run_failed(&mut self, iteration: usize, combo: Combination, error: &BenchError) {
        report_failure(iteration, combo, error);
    }
}
