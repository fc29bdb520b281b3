//! Test drivers: spawn workers, wait for them, measure, report
//!
//! Both drivers follow the same sequence: allocate a fresh counter, take the
//! start sample, spawn `workers` workers, block until every one of them has
//! terminated, take the end sample, read the counter and destroy it. There
//! is no timeout; a hung worker hangs the run.

pub mod process;
pub mod thread;

pub use process::ProcessDriver;
pub use thread::ThreadDriver;

use crate::config::{SyncMode, WorkerKind};
use crate::error::BenchResult;
use crate::report::TestReport;
use std::any::Any;

/// A way of running `workers` concurrent incrementers against one counter
pub trait TestDriver {
    fn kind(&self) -> WorkerKind;

    /// Execute one test run; any error aborts this run only
    fn run(&self, workers: usize, increments: u64, mode: SyncMode) -> BenchResult<TestReport>;
}

/// Driver for a worker kind
pub fn driver_for(kind: WorkerKind) -> &'static dyn TestDriver {
    match kind {
        WorkerKind::Process => &ProcessDriver,
        WorkerKind::Thread => &ThreadDriver,
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_for_kind() {
        assert_eq!(driver_for(WorkerKind::Process).kind(), WorkerKind::Process);
        assert_eq!(driver_for(WorkerKind::Thread).kind(), WorkerKind::Thread);
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(7u32);
        assert_eq!(panic_message(payload.as_ref()), "panicked");
    }
}
