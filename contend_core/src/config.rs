//! Benchmark configuration and test selection

use crate::error::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_INCREMENTS: u64 = 1_000_000;
pub const DEFAULT_ITERATIONS: usize = 3;

/// Execution unit used by a test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    Process,
    Thread,
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerKind::Process => write!(f, "processes"),
            WorkerKind::Thread => write!(f, "threads"),
        }
    }
}

/// Whether increments are guarded by a lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Synchronized,
    Unsynchronized,
}

impl SyncMode {
    pub fn is_synchronized(self) -> bool {
        matches!(self, SyncMode::Synchronized)
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Synchronized => write!(f, "with synchronization"),
            SyncMode::Unsynchronized => write!(f, "without synchronization"),
        }
    }
}

/// One cell of the process/thread x sync/unsync grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combination {
    pub kind: WorkerKind,
    pub mode: SyncMode,
}

impl Combination {
    /// All four combinations in execution order
    pub const ALL: [Combination; 4] = [
        Combination {
            kind: WorkerKind::Process,
            mode: SyncMode::Synchronized,
        },
        Combination {
            kind: WorkerKind::Process,
            mode: SyncMode::Unsynchronized,
        },
        Combination {
            kind: WorkerKind::Thread,
            mode: SyncMode::Synchronized,
        },
        Combination {
            kind: WorkerKind::Thread,
            mode: SyncMode::Unsynchronized,
        },
    ];
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.mode)
    }
}

/// Restriction flags; each one suppresses part of the grid
///
/// `processes_only` drops thread tests, `threads_only` drops process tests,
/// `sync_only` drops unsynchronized tests and `unsync_only` drops
/// synchronized tests. Contradictory pairs leave nothing selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFilter {
    pub processes_only: bool,
    pub threads_only: bool,
    pub sync_only: bool,
    pub unsync_only: bool,
}

impl TestFilter {
    pub fn allows(&self, combo: Combination) -> bool {
        let kind_ok = match combo.kind {
            WorkerKind::Process => !self.threads_only,
            WorkerKind::Thread => !self.processes_only,
        };
        let mode_ok = match combo.mode {
            SyncMode::Synchronized => !self.unsync_only,
            SyncMode::Unsynchronized => !self.sync_only,
        };
        kind_ok && mode_ok
    }

    /// Selected combinations, in execution order
    pub fn selected(&self) -> Vec<Combination> {
        Combination::ALL
            .into_iter()
            .filter(|combo| self.allows(*combo))
            .collect()
    }
}

/// Parameters for a full benchmark suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    pub workers: usize,
    pub increments: u64,
    pub iterations: usize,
    #[serde(default)]
    pub filter: TestFilter,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            increments: DEFAULT_INCREMENTS,
            iterations: DEFAULT_ITERATIONS,
            filter: TestFilter::default(),
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> BenchResult<()> {
        if self.workers == 0 {
            return Err(positive("workers"));
        }
        if self.increments == 0 {
            return Err(positive("increments"));
        }
        if self.iterations == 0 {
            return Err(positive("iterations"));
        }
        if (self.workers as u64).checked_mul(self.increments).is_none() {
            return Err(BenchError::InvalidConfig {
                field: "increments",
                reason: format!(
                    "{} workers x {} increments overflows the counter",
                    self.workers, self.increments
                ),
            });
        }
        Ok(())
    }

    /// Total increments a correct run must observe
    pub fn expected_total(&self) -> u64 {
        self.workers as u64 * self.increments
    }
}

fn positive(field: &'static str) -> BenchError {
    BenchError::InvalidConfig {
        field,
        reason: "must be a positive integer".to_string(),
    }
}
