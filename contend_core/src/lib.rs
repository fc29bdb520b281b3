//! # Contend Core
//!
//! The measurement engine behind the `contend` benchmark: OS processes sharing
//! an explicitly mapped counter versus OS threads sharing one address space,
//! each incrementing with and without mutual exclusion.
//!
//! - **Memory**: anonymous `MAP_SHARED` regions that survive `fork()`
//! - **Sync**: process-shared pthread mutexes and in-process locks
//! - **Counter**: the shared counter both drivers hammer on
//! - **Drivers**: process (fork/wait) and thread (spawn/join) test runs
//! - **Suite**: iterations over the selected process/thread x sync/unsync grid
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contend_core::{SyncMode, TestDriver, ThreadDriver};
//!
//! let report = ThreadDriver.run(4, 100_000, SyncMode::Synchronized)?;
//! assert!(report.is_correct());
//! # Ok::<(), contend_core::BenchError>(())
//! ```

#[cfg(not(unix))]
compile_error!("contend_core requires a Unix platform (fork, pthread, getrusage)");

pub mod config;
pub mod counter;
pub mod driver;
pub mod error;
pub mod memory;
pub mod report;
pub mod sampler;
pub mod suite;
pub mod sync;
pub mod worker;

// Re-export commonly used types for easy access
pub use config::{BenchConfig, Combination, SyncMode, TestFilter, WorkerKind};
pub use counter::{SharedCounter, Sharing};
pub use driver::{ProcessDriver, TestDriver, ThreadDriver};
pub use error::{BenchError, BenchResult};
pub use report::TestReport;
pub use suite::{ReportSink, Suite, SuiteSummary};
