//! Benchmark orchestrator
//!
//! Runs `iterations` rounds of the selected combinations in the fixed order
//! process+sync, process+unsync, thread+sync, thread+unsync. Every run gets a
//! fresh counter; nothing carries over between runs or iterations. A failed
//! run is reported and skipped, never retried.
//!
//! Presentation is delegated to a [`ReportSink`], so the suite itself only
//! produces [`TestReport`]s.

use crate::config::{BenchConfig, Combination};
use crate::driver::{driver_for, TestDriver};
use crate::error::{BenchError, BenchResult};
use crate::report::TestReport;

/// Receives suite progress and results
///
/// Every callback has an empty default so sinks only implement what they
/// render.
pub trait ReportSink {
    fn suite_started(&mut self, _config: &BenchConfig) {}

    fn iteration_started(&mut self, _iteration: usize, _total: usize) {}

    /// Called right before a run starts
    fn run_started(&mut self, _iteration: usize, _combo: Combination) {}

    fn run_finished(&mut self, iteration: usize, report: &TestReport);

    fn run_failed(&mut self, iteration: usize, combo: Combination, error: &BenchError);

    /// Called between iterations, not after the last one
    fn iteration_finished(&mut self, _iteration: usize, _total: usize) {}

    fn suite_finished(&mut self, _summary: &SuiteSummary) {}
}

/// Everything a suite produced
#[derive(Debug, Clone, Default)]
pub struct SuiteSummary {
    pub reports: Vec<TestReport>,
    pub failures: usize,
}

impl SuiteSummary {
    /// Runs whose observed total differs from the expected total
    pub fn incorrect(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_correct()).count()
    }

    pub fn runs(&self) -> usize {
        self.reports.len() + self.failures
    }
}

/// A validated configuration ready to run
pub struct Suite {
    config: BenchConfig,
    drivers: Vec<(Combination, &'static dyn TestDriver)>,
}

impl Suite {
    pub fn new(config: BenchConfig) -> BenchResult<Self> {
        config.validate()?;

        let drivers: Vec<_> = config
            .filter
            .selected()
            .into_iter()
            .map(|combo| (combo, driver_for(combo.kind)))
            .collect();

        if drivers.is_empty() {
            tracing::warn!(filter = ?config.filter, "test filter selects no combination");
        }

        Ok(Self { config, drivers })
    }

    /// Combinations each iteration executes, in order
    pub fn combinations(&self) -> Vec<Combination> {
        self.drivers.iter().map(|(combo, _)| *combo).collect()
    }

    pub fn run(&self, sink: &mut dyn ReportSink) -> SuiteSummary {
        let BenchConfig {
            workers,
            increments,
            iterations,
            ..
        } = self.config;
        let mut summary = SuiteSummary::default();

        sink.suite_started(&self.config);

        for iteration in 1..=iterations {
            sink.iteration_started(iteration, iterations);

            for &(combo, driver) in &self.drivers {
                tracing::info!(iteration, workers, increments, "running {}", combo);
                sink.run_started(iteration, combo);

                match driver.run(workers, increments, combo.mode) {
                    Ok(report) => {
                        tracing::info!(
                            observed = report.observed_total,
                            expected = report.expected_total,
                            elapsed_ms = report.elapsed_wall_ms,
                            "{} finished",
                            combo
                        );
                        sink.run_finished(iteration, &report);
                        summary.reports.push(report);
                    }
                    Err(e) => {
                        tracing::debug!("{} aborted: {}", combo, e);
                        sink.run_failed(iteration, combo, &e);
                        summary.failures += 1;
                    }
                }
            }

            if iteration < iterations {
                sink.iteration_finished(iteration, iterations);
            }
        }

        sink.suite_finished(&summary);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SyncMode, TestFilter, WorkerKind};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ReportSink for Recorder {
        fn iteration_started(&mut self, iteration: usize, total: usize) {
            self.events.push(format!("start {}/{}", iteration, total));
        }

        fn run_finished(&mut self, _iteration: usize, report: &TestReport) {
            self.events.push(format!("run {}", report.combination()));
        }

        fn run_failed(&mut self, _iteration: usize, combo: Combination, _error: &BenchError) {
            self.events.push(format!("fail {}", combo));
        }

        fn iteration_finished(&mut self, iteration: usize, _total: usize) {
            self.events.push(format!("separator {}", iteration));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BenchConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(Suite::new(config).is_err());
    }

    #[test]
    fn test_thread_only_suite_order_and_separators() {
        let config = BenchConfig {
            workers: 2,
            increments: 1_000,
            iterations: 2,
            filter: TestFilter {
                threads_only: true,
                ..Default::default()
            },
        };
        let suite = Suite::new(config).unwrap();
        let mut recorder = Recorder::default();
        let summary = suite.run(&mut recorder);

        let sync = Combination {
            kind: WorkerKind::Thread,
            mode: SyncMode::Synchronized,
        };
        let unsync = Combination {
            kind: WorkerKind::Thread,
            mode: SyncMode::Unsynchronized,
        };
        assert_eq!(
            recorder.events,
            vec![
                "start 1/2".to_string(),
                format!("run {}", sync),
                format!("run {}", unsync),
                "separator 1".to_string(),
                "start 2/2".to_string(),
                format!("run {}", sync),
                format!("run {}", unsync),
            ]
        );
        assert_eq!(summary.reports.len(), 4);
        assert_eq!(summary.failures, 0);
        assert_eq!(summary.runs(), 4);
    }

    #[test]
    fn test_empty_selection_runs_nothing() {
        let config = BenchConfig {
            iterations: 2,
            filter: TestFilter {
                sync_only: true,
                unsync_only: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let suite = Suite::new(config).unwrap();
        assert!(suite.combinations().is_empty());

        let mut recorder = Recorder::default();
        let summary = suite.run(&mut recorder);
        assert_eq!(summary.runs(), 0);
        assert_eq!(
            recorder.events,
            vec!["start 1/2", "separator 1", "start 2/2"]
        );
    }
}
