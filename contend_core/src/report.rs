//! Results of a single test run
//!
//! A [`TestReport`] is plain data computed after every worker has finished.
//! Rendering lives in the binary crate; nothing here formats for a console.

use crate::config::{Combination, SyncMode, WorkerKind};
use crate::sampler::Measurement;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub kind: WorkerKind,
    pub mode: SyncMode,
    pub worker_count: usize,
    pub increments_per_worker: u64,
    pub expected_total: u64,
    pub observed_total: u64,
    pub elapsed_wall_ms: f64,
    pub cpu_user_s: f64,
    pub cpu_system_s: f64,
}

impl TestReport {
    /// `expected_total` saturates at `u64::MAX` for unvalidated sizes
    pub fn new(
        combo: Combination,
        worker_count: usize,
        increments_per_worker: u64,
        observed_total: u64,
        measurement: &Measurement,
    ) -> Self {
        Self {
            kind: combo.kind,
            mode: combo.mode,
            worker_count,
            increments_per_worker,
            expected_total: (worker_count as u64).saturating_mul(increments_per_worker),
            observed_total,
            elapsed_wall_ms: measurement.wall.as_secs_f64() * 1_000.0,
            cpu_user_s: measurement.cpu.user.as_secs_f64(),
            cpu_system_s: measurement.cpu.system.as_secs_f64(),
        }
    }

    pub fn combination(&self) -> Combination {
        Combination {
            kind: self.kind,
            mode: self.mode,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.observed_total == self.expected_total
    }

    /// Increments overwritten by concurrent unsynchronized workers
    pub fn lost_updates(&self) -> u64 {
        self.expected_total.saturating_sub(self.observed_total)
    }

    /// User plus system CPU seconds
    pub fn cpu_time_s(&self) -> f64 {
        self.cpu_user_s + self.cpu_system_s
    }

    /// Issued increments per wall-clock millisecond (0 for a zero-length run)
    pub fn throughput_ops_per_ms(&self) -> f64 {
        if self.elapsed_wall_ms > 0.0 {
            self.expected_total as f64 / self.elapsed_wall_ms
        } else {
            0.0
        }
    }

    /// CPU time over wall time, in percent; above 100 means several CPUs
    pub fn cpu_utilization_percent(&self) -> f64 {
        if self.elapsed_wall_ms > 0.0 {
            self.cpu_time_s() * 1_000.0 / self.elapsed_wall_ms * 100.0
        } else {
            0.0
        }
    }
}
