//! Error types for benchmark runs
//!
//! Only [`BenchError::InvalidConfig`] is fatal to the whole program; every
//! other variant aborts the current test run and lets the suite move on.

use std::io;

/// Errors raised while configuring or executing a benchmark run
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("shared memory mapping failed: {0}")]
    SharedMemory(#[source] io::Error),

    #[error("lock initialisation failed: {0}")]
    LockInit(#[source] io::Error),

    #[error("lock operation failed: {0}")]
    Lock(#[source] io::Error),

    #[error("synchronized increment requested on a counter created without a lock")]
    LockNotConfigured,

    #[error("fork failed for worker {worker}: {source}")]
    ProcessSpawn {
        worker: usize,
        #[source]
        source: nix::Error,
    },

    #[error("thread creation failed for worker {worker}: {source}")]
    ThreadSpawn {
        worker: usize,
        #[source]
        source: io::Error,
    },

    #[error("waiting on child {pid} failed: {source}")]
    Wait {
        pid: i32,
        #[source]
        source: nix::Error,
    },

    #[error("worker {worker} failed: {reason}")]
    WorkerFailed { worker: usize, reason: String },

    #[error("resource usage query failed: {0}")]
    ResourceUsage(#[source] io::Error),
}

impl BenchError {
    /// True for errors that must stop the program before any test runs
    pub fn is_config(&self) -> bool {
        matches!(self, BenchError::InvalidConfig { .. })
    }
}

/// Result alias used throughout the crate
pub type BenchResult<T> = Result<T, BenchError>;
