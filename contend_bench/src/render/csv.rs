// CSV rows in the column layout read by the scalability plotting script
use super::{report_failure, Output};
use contend_core::{
    BenchConfig, BenchError, Combination, ReportSink, SyncMode, TestReport, WorkerKind,
};
use std::io::Write;

pub const COLUMNS: [&str; 12] = [
    "iteration",
    "test_type",
    "sync_type",
    "num_threads",
    "increments_per_worker",
    "expected_counter",
    "final_counter",
    "is_correct",
    "execution_time_ms",
    "throughput_ops_ms",
    "cpu_time_s",
    "cpu_utilization_percent",
];

pub struct CsvReporter<W: Write> {
    out: Output<W>,
}

impl<W: Write> CsvReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Output::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

/// `test_type` value; the plots filter on these exact strings
pub fn test_type(kind: WorkerKind) -> &'static str {
    match kind {
        WorkerKind::Process => "PROCESOS",
        WorkerKind::Thread => "HILOS",
    }
}

/// `sync_type` value; the plots filter on these exact strings
pub fn sync_type(mode: SyncMode) -> &'static str {
    match mode {
        SyncMode::Synchronized => "CON_SYNC",
        SyncMode::Unsynchronized => "SIN_SYNC",
    }
}

pub fn header() -> String {
    COLUMNS.join(",")
}

pub fn row(iteration: usize, report: &TestReport) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{:.3},{:.3},{:.6},{:.2}",
        iteration,
        test_type(report.kind),
        sync_type(report.mode),
        report.worker_count,
        report.increments_per_worker,
        report.expected_total,
        report.observed_total,
        report.is_correct(),
        report.elapsed_wall_ms,
        report.throughput_ops_per_ms(),
        report.cpu_time_s(),
        report.cpu_utilization_percent(),
    )
}

impl<W: Write> ReportSink for CsvReporter<W> {
    fn suite_started(&mut self, _config: &BenchConfig) {
        self.out.emit(|w| writeln!(w, "{}", header()));
    }

    fn run_finished(&mut self, iteration: usize, report: &TestReport) {
        self.out.emit(|w| writeln!(w, "{}", row(iteration, report)));
    }

    fn run_failed(&mut self, iteration: usize, combo: Combination, error: &BenchError) {
        report_failure(iteration, combo, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(kind: WorkerKind, mode: SyncMode, observed: u64) -> TestReport {
        TestReport {
            kind,
            mode,
            worker_count: 2,
            increments_per_worker: 500,
            expected_total: 1_000,
            observed_total: observed,
            elapsed_wall_ms: 4.0,
            cpu_user_s: 0.006,
            cpu_system_s: 0.002,
        }
    }

    #[test]
    fn test_header_then_rows() {
        let mut reporter = CsvReporter::new(Vec::new());
        reporter.suite_started(&BenchConfig::default());
        let lossy = report(WorkerKind::Thread, SyncMode::Unsynchronized, 750);
        reporter.run_finished(3, &lossy);
        let text = String::from_utf8(reporter.into_inner()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], header());
        let expected = "3,HILOS,SIN_SYNC,2,500,1000,750,false,4.000,250.000,0.008000,200.00";
        assert_eq!(lines[1], expected);
        assert_eq!(lines[0].split(',').count(), lines[1].split(',').count());
    }

    #[test]
    fn test_header_has_plotted_columns() {
        let header = header();
        let columns: Vec<&str> = header.split(',').collect();
        for wanted in [
            "test_type",
            "sync_type",
            "num_threads",
            "execution_time_ms",
            "throughput_ops_ms",
            "cpu_utilization_percent",
            "is_correct",
            "expected_counter",
            "final_counter",
        ] {
            assert!(columns.contains(&wanted), "missing column {}", wanted);
        }
    }

    #[test]
    fn test_row_labels_match_plot_filters() {
        let synced = report(WorkerKind::Process, SyncMode::Synchronized, 1_000);
        let process_sync = row(1, &synced);
        let fields: Vec<&str> = process_sync.split(',').collect();
        assert_eq!(fields[1], "PROCESOS");
        assert_eq!(fields[2], "CON_SYNC");
        assert_eq!(fields[7], "true");

        let lossy = report(WorkerKind::Thread, SyncMode::Unsynchronized, 900);
        let thread_unsync = row(1, &lossy);
        let fields: Vec<&str> = thread_unsync.split(',').collect();
        assert_eq!(fields[1], "HILOS");
        assert_eq!(fields[2], "SIN_SYNC");
        assert_eq!(fields[7], "false");
    }
}
