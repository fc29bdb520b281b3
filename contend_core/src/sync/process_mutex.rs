// pthread mutex usable across fork()
use crate::error::{BenchError, BenchResult};
use bytemuck::Zeroable;
use std::cell::UnsafeCell;
use std::io;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr::NonNull;

/// Storage for a `pthread_mutex_t`, meant to be embedded in a shared region
#[repr(transparent)]
pub struct RawProcessMutex(UnsafeCell<libc::pthread_mutex_t>);

// Zeroed bytes are only storage; ProcessMutex::init runs pthread_mutex_init
// before the mutex is ever locked.
unsafe impl Zeroable for RawProcessMutex {}
unsafe impl Sync for RawProcessMutex {}
unsafe impl Send for RawProcessMutex {}

/// Initialised, process-shared handle onto a [`RawProcessMutex`]
///
/// A mutex created with default (thread-only) attributes is undefined
/// behaviour when locked from another process, so `init` always sets
/// `PTHREAD_PROCESS_SHARED`. The handle destroys the mutex exactly once,
/// either through [`ProcessMutex::destroy`] or on drop.
pub struct ProcessMutex {
    raw: Option<NonNull<libc::pthread_mutex_t>>,
}

/// RAII guard returned by [`ProcessMutex::lock`]
#[must_use = "the mutex is unlocked as soon as the guard is dropped"]
pub struct ProcessMutexGuard<'a> {
    raw: NonNull<libc::pthread_mutex_t>,
    _mutex: PhantomData<&'a ProcessMutex>,
}

impl ProcessMutex {
    /// Initialise `slot` as a process-shared mutex
    ///
    /// # Safety
    ///
    /// `slot` must stay mapped for as long as the returned handle (and any
    /// process that inherited it through `fork()`) uses it, and must not be
    /// initialised twice.
    pub unsafe fn init(slot: &RawProcessMutex) -> BenchResult<Self> {
        let mut storage = MaybeUninit::<libc::pthread_mutexattr_t>::uninit();
        let attr = storage.as_mut_ptr();
        check(libc::pthread_mutexattr_init(attr)).map_err(BenchError::LockInit)?;

        let shared = libc::PTHREAD_PROCESS_SHARED;
        let result = check(libc::pthread_mutexattr_setpshared(attr, shared))
            .and_then(|_| check(libc::pthread_mutex_init(slot.0.get(), attr)));

        libc::pthread_mutexattr_destroy(attr);
        result.map_err(BenchError::LockInit)?;

        Ok(Self {
            raw: NonNull::new(slot.0.get()),
        })
    }

    pub fn lock(&self) -> BenchResult<ProcessMutexGuard<'_>> {
        let raw = self.raw()?;
        check(unsafe { libc::pthread_mutex_lock(raw.as_ptr()) }).map_err(BenchError::Lock)?;
        Ok(ProcessMutexGuard {
            raw,
            _mutex: PhantomData,
        })
    }

    /// Destroy the mutex, reporting failures such as `EBUSY`
    pub fn destroy(mut self) -> BenchResult<()> {
        self.release().map_err(BenchError::Lock)
    }

    fn raw(&self) -> BenchResult<NonNull<libc::pthread_mutex_t>> {
        self.raw.ok_or_else(|| {
            BenchError::Lock(io::Error::new(
                io::ErrorKind::Other,
                "process mutex already destroyed",
            ))
        })
    }

    fn release(&mut self) -> io::Result<()> {
        match self.raw.take() {
            Some(raw) => check(unsafe { libc::pthread_mutex_destroy(raw.as_ptr()) }),
            None => Ok(()),
        }
    }
}

impl Drop for ProcessMutex {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!("failed to destroy process mutex: {}", e);
        }
    }
}

impl std::fmt::Debug for ProcessMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessMutex")
            .field("raw", &self.raw)
            .finish()
    }
}

impl Drop for ProcessMutexGuard<'_> {
    fn drop(&mut self) {
        let rc = unsafe { libc::pthread_mutex_unlock(self.raw.as_ptr()) };
        if let Err(e) = check(rc) {
            tracing::warn!("failed to unlock process mutex: {}", e);
        }
    }
}

// The pthread mutex is designed to be shared; the handle only points at it
unsafe impl Send for ProcessMutex {}
unsafe impl Sync for ProcessMutex {}

/// pthread functions return the error number instead of setting errno
fn check(rc: libc::c_int) -> io::Result<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::from_raw_os_error(rc))
    }
}
