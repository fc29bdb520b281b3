// Anonymous shared mapping that survives fork()
use bytemuck::Zeroable;
use std::io;
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

/// Typed region of `MAP_SHARED | MAP_ANON` memory
///
/// The kernel zero-fills the mapping, hence the `Zeroable` bound: the region
/// holds a valid `T` from the moment it is mapped. Children created by
/// `fork()` after `new` share the same physical pages with the parent.
pub struct SharedRegion<T: Zeroable> {
    ptr: Option<NonNull<T>>,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Zeroable> SharedRegion<T> {
    /// Map a fresh, zeroed region large enough for one `T`
    pub fn new() -> io::Result<Self> {
        let len = mem::size_of::<T>().max(1);

        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED | libc::MAP_ANON,
                -1,
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        // mmap returns page-aligned addresses, which covers any T alignment
        debug_assert_eq!(addr as usize % mem::align_of::<T>(), 0);

        tracing::trace!(len, addr = ?addr, "mapped shared region");

        Ok(Self {
            ptr: NonNull::new(addr.cast::<T>()),
            len,
            _marker: PhantomData,
        })
    }

    pub fn get(&self) -> &T {
        match self.ptr {
            // Mapped, zero-initialised and valid until unmapped
            Some(ptr) => unsafe { ptr.as_ref() },
            None => unreachable!("shared region accessed after unmap"),
        }
    }

    /// Release the mapping, reporting `munmap` failures
    pub fn unmap(mut self) -> io::Result<()> {
        self.release()
    }

    fn release(&mut self) -> io::Result<()> {
        let Some(ptr) = self.ptr.take() else {
            return Ok(());
        };
        let rc = unsafe { libc::munmap(ptr.as_ptr().cast(), self.len) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        tracing::trace!(len = self.len, "unmapped shared region");
        Ok(())
    }
}

impl<T: Zeroable> std::fmt::Debug for SharedRegion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRegion")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

impl<T: Zeroable> Drop for SharedRegion<T> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!("failed to unmap shared region: {}", e);
        }
    }
}

// The region is plain memory; synchronising access to T is the caller's job
unsafe impl<T: Zeroable + Send> Send for SharedRegion<T> {}
unsafe impl<T: Zeroable + Sync> Sync for SharedRegion<T> {}
