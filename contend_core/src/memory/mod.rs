//! # Shared memory for cross-process workers
//!
//! Memory that forked children and their parent see as one allocation:
//!
//! - **SharedRegion**: typed anonymous `MAP_SHARED` mapping with an explicit
//!   lifetime (mapped by `new`, released by `unmap` or drop)
//! - **platform**: host facts reported alongside results
//!
//! Ordinary heap or stack memory is copy-on-write after `fork()`, so every
//! child would increment its own private copy. Anything a process worker
//! mutates must live in a `SharedRegion`.

pub mod platform;
pub mod shm_region;

pub use platform::*;
pub use shm_region::SharedRegion;
