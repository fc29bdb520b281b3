//! Locks guarding the shared counter
//!
//! - **ProcessMutex**: `pthread_mutex_t` living in shared memory, attributed
//!   `PTHREAD_PROCESS_SHARED` so forked children can contend on it
//! - **CounterLock**: the lock a counter carries, either process-shared or a
//!   `parking_lot` mutex for workers inside one address space

pub mod process_mutex;

pub use process_mutex::{ProcessMutex, ProcessMutexGuard, RawProcessMutex};

use crate::error::BenchResult;

/// Lock attached to a synchronized counter
#[derive(Debug)]
pub enum CounterLock {
    ProcessShared(ProcessMutex),
    InProcess(parking_lot::Mutex<()>),
}

/// Held while a synchronized increment runs; unlocks on drop
#[must_use = "the lock is released as soon as the guard is dropped"]
pub enum CounterGuard<'a> {
    ProcessShared(ProcessMutexGuard<'a>),
    InProcess(parking_lot::MutexGuard<'a, ()>),
}

impl CounterLock {
    pub fn lock(&self) -> BenchResult<CounterGuard<'_>> {
        match self {
            CounterLock::ProcessShared(mutex) => Ok(CounterGuard::ProcessShared(mutex.lock()?)),
            CounterLock::InProcess(mutex) => Ok(CounterGuard::InProcess(mutex.lock())),
        }
    }

    pub fn is_process_shared(&self) -> bool {
        matches!(self, CounterLock::ProcessShared(_))
    }
}
