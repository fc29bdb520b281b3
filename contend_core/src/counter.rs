//! The shared counter every worker increments
//!
//! A counter is created fresh for each test run, starts at zero and is
//! destroyed by the driver once every worker has terminated. Where it lives
//! depends on who shares it:
//!
//! - [`Sharing::CrossProcess`]: inside a [`SharedRegion`] together with a
//!   process-shared pthread mutex, so forked children mutate the parent's
//!   pages instead of private copies
//! - [`Sharing::InProcess`]: on the heap, guarded by a `parking_lot` mutex,
//!   shared with threads by reference
//!
//! Both modes perform the same read-modify-write. The lock is the only
//! difference between a synchronized and an unsynchronized increment, so the
//! lost updates of an unsynchronized run come from the missing lock alone.

use crate::config::SyncMode;
use crate::error::{BenchError, BenchResult};
use crate::memory::SharedRegion;
use crate::sync::{CounterLock, ProcessMutex, RawProcessMutex};
use bytemuck::Zeroable;
use std::sync::atomic::{AtomicU64, Ordering};

/// Who the counter must be visible to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sharing {
    /// Parent and forked children
    CrossProcess,
    /// Threads of the current process
    InProcess,
}

/// Layout of the shared region backing a cross-process counter
#[repr(C)]
struct CrossProcessCell {
    value: AtomicU64,
    mutex: RawProcessMutex,
}

unsafe impl Zeroable for CrossProcessCell {}

enum Storage {
    Region(SharedRegion<CrossProcessCell>),
    Heap(Box<AtomicU64>),
}

/// Counter value plus the optional lock guarding it
pub struct SharedCounter {
    // Declared before `storage` so the lock is torn down before its memory
    lock: Option<CounterLock>,
    storage: Storage,
    sharing: Sharing,
}

impl SharedCounter {
    /// Allocate a zeroed counter; a lock is attached only for synchronized runs
    pub fn create(sharing: Sharing, mode: SyncMode) -> BenchResult<Self> {
        let (storage, lock) = match sharing {
            Sharing::CrossProcess => {
                let region =
                    SharedRegion::<CrossProcessCell>::new().map_err(BenchError::SharedMemory)?;
                let lock = if mode.is_synchronized() {
                    // The mutex lives in the region, which outlives it (field order)
                    let mutex = unsafe { ProcessMutex::init(&region.get().mutex)? };
                    Some(CounterLock::ProcessShared(mutex))
                } else {
                    None
                };
                (Storage::Region(region), lock)
            }
            Sharing::InProcess => {
                let lock = mode
                    .is_synchronized()
                    .then(|| CounterLock::InProcess(parking_lot::Mutex::new(())));
                (Storage::Heap(Box::new(AtomicU64::new(0))), lock)
            }
        };

        tracing::debug!(?sharing, %mode, "created shared counter");

        Ok(Self {
            lock,
            storage,
            sharing,
        })
    }

    /// Add one to the counter
    ///
    /// `Synchronized` brackets the read-modify-write with the counter's lock
    /// and fails with [`BenchError::LockNotConfigured`] if the counter was
    /// created without one. `Unsynchronized` runs it bare and may lose
    /// updates to concurrent workers.
    #[inline]
    pub fn increment(&self, mode: SyncMode) -> BenchResult<()> {
        match mode {
            SyncMode::Synchronized => {
                let lock = self.lock.as_ref().ok_or(BenchError::LockNotConfigured)?;
                let _guard = lock.lock()?;
                self.bump();
            }
            SyncMode::Unsynchronized => self.bump(),
        }
        Ok(())
    }

    #[inline(always)]
    fn bump(&self) {
        let value = self.value();
        // Load and store are separate operations: another worker's store can
        // land in between and be overwritten.
        let current = value.load(Ordering::Relaxed);
        value.store(current.wrapping_add(1), Ordering::Relaxed);
    }

    /// Current value; exact only once every worker has terminated
    pub fn read(&self) -> u64 {
        self.value().load(Ordering::SeqCst)
    }

    pub fn sharing(&self) -> Sharing {
        self.sharing
    }

    pub fn is_synchronized(&self) -> bool {
        self.lock.is_some()
    }

    /// Destroy the lock (if any) and release the storage
    ///
    /// Must run after all workers have terminated. Forked children never
    /// reach this: they leave with `_exit`, so teardown happens once, in the
    /// parent.
    pub fn destroy(self) -> BenchResult<()> {
        let SharedCounter { lock, storage, .. } = self;

        match lock {
            Some(CounterLock::ProcessShared(mutex)) => mutex.destroy()?,
            Some(CounterLock::InProcess(_)) | None => {}
        }

        match storage {
            Storage::Region(region) => region.unmap().map_err(BenchError::SharedMemory)?,
            Storage::Heap(_) => {}
        }

        tracing::debug!("destroyed shared counter");
        Ok(())
    }

    #[inline(always)]
    fn value(&self) -> &AtomicU64 {
        match &self.storage {
            Storage::Region(region) => &region.get().value,
            Storage::Heap(value) => &**value,
        }
    }
}

impl std::fmt::Debug for SharedCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCounter")
            .field("sharing", &self.sharing)
            .field("synchronized", &self.is_synchronized())
            .field("value", &self.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_starts_at_zero() {
        for sharing in [Sharing::CrossProcess, Sharing::InProcess] {
            for mode in [SyncMode::Synchronized, SyncMode::Unsynchronized] {
                let counter = SharedCounter::create(sharing, mode).unwrap();
                assert_eq!(counter.read(), 0);
                assert_eq!(counter.sharing(), sharing);
                assert_eq!(counter.is_synchronized(), mode.is_synchronized());
                counter.destroy().unwrap();
            }
        }
    }

    #[test]
    fn test_single_worker_increments_are_exact() {
        for sharing in [Sharing::CrossProcess, Sharing::InProcess] {
            for mode in [SyncMode::Synchronized, SyncMode::Unsynchronized] {
                let counter = SharedCounter::create(sharing, mode).unwrap();
                for _ in 0..1_000 {
                    counter.increment(mode).unwrap();
                }
                assert_eq!(counter.read(), 1_000);
                counter.destroy().unwrap();
            }
        }
    }

    #[test]
    fn test_synchronized_increment_requires_lock() {
        let counter = SharedCounter::create(Sharing::InProcess, SyncMode::Unsynchronized).unwrap();
        assert!(matches!(
            counter.increment(SyncMode::Synchronized),
            Err(BenchError::LockNotConfigured)
        ));
        assert_eq!(counter.read(), 0);
    }

    #[test]
    fn test_lock_kind_follows_sharing() {
        let counter = SharedCounter::create(Sharing::CrossProcess, SyncMode::Synchronized).unwrap();
        assert!(counter.lock.as_ref().unwrap().is_process_shared());

        let counter = SharedCounter::create(Sharing::InProcess, SyncMode::Synchronized).unwrap();
        assert!(!counter.lock.as_ref().unwrap().is_process_shared());
    }

    #[test]
    fn test_threads_share_synchronized_counter() {
        let counter = SharedCounter::create(Sharing::InProcess, SyncMode::Synchronized).unwrap();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..10_000 {
                        counter.increment(SyncMode::Synchronized).unwrap();
                    }
                });
            }
        });
        assert_eq!(counter.read(), 40_000);
    }
}
