//! Wall-clock and CPU-time snapshots around a test run
//!
//! Wall time comes from [`Instant`], which is monotonic, so an elapsed value
//! can never be negative. CPU time comes from `getrusage`; the scope decides
//! whose time is counted:
//!
//! - [`UsageScope::Children`]: terminated *and reaped* children, used by the
//!   process driver (so the end sample must follow the last `waitpid`)
//! - [`UsageScope::CurrentProcess`]: every thread of the calling process,
//!   used by the thread driver

use crate::error::{BenchError, BenchResult};
use std::mem::MaybeUninit;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageScope {
    Children,
    CurrentProcess,
}

impl UsageScope {
    fn who(self) -> libc::c_int {
        match self {
            UsageScope::Children => libc::RUSAGE_CHILDREN,
            UsageScope::CurrentProcess => libc::RUSAGE_SELF,
        }
    }
}

/// User and system CPU time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTime {
    pub user: Duration,
    pub system: Duration,
}

impl CpuTime {
    pub fn total(&self) -> Duration {
        self.user + self.system
    }

    /// Time consumed since `earlier`, clamped at zero
    pub fn since(&self, earlier: &CpuTime) -> CpuTime {
        CpuTime {
            user: self.user.saturating_sub(earlier.user),
            system: self.system.saturating_sub(earlier.system),
        }
    }

    /// Cumulative CPU time for `scope`
    pub fn query(scope: UsageScope) -> BenchResult<Self> {
        let mut usage = MaybeUninit::<libc::rusage>::zeroed();
        let rc = unsafe { libc::getrusage(scope.who(), usage.as_mut_ptr()) };
        if rc != 0 {
            return Err(BenchError::ResourceUsage(std::io::Error::last_os_error()));
        }
        let usage = unsafe { usage.assume_init() };

        Ok(Self {
            user: timeval_to_duration(usage.ru_utime),
            system: timeval_to_duration(usage.ru_stime),
        })
    }
}

fn timeval_to_duration(tv: libc::timeval) -> Duration {
    Duration::from_secs(tv.tv_sec.max(0) as u64) + Duration::from_micros(tv.tv_usec.max(0) as u64)
}

/// Elapsed wall time and CPU time of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub wall: Duration,
    pub cpu: CpuTime,
}

/// Start snapshot, turned into a [`Measurement`] by [`Sampler::finish`]
#[derive(Debug)]
pub struct Sampler {
    scope: UsageScope,
    cpu_start: CpuTime,
    wall_start: Instant,
}

impl Sampler {
    /// Take the start snapshot (CPU first, then wall clock)
    pub fn start(scope: UsageScope) -> BenchResult<Self> {
        let cpu_start = CpuTime::query(scope)?;
        let wall_start = Instant::now();
        Ok(Self {
            scope,
            cpu_start,
            wall_start,
        })
    }

    /// Take the end snapshot (wall clock first, then CPU)
    pub fn finish(self) -> BenchResult<Measurement> {
        let wall = self.wall_start.elapsed();
        let cpu_end = CpuTime::query(self.scope)?;
        Ok(Measurement {
            wall,
            cpu: cpu_end.since(&self.cpu_start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_time_since_clamps() {
        let earlier = CpuTime {
            user: Duration::from_millis(50),
            system: Duration::from_millis(10),
        };
        let later = CpuTime {
            user: Duration::from_millis(80),
            system: Duration::from_millis(5),
        };
        let delta = later.since(&earlier);
        assert_eq!(delta.user, Duration::from_millis(30));
        assert_eq!(delta.system, Duration::ZERO);
        assert_eq!(delta.total(), Duration::from_millis(30));
    }

    #[test]
    fn test_timeval_conversion() {
        let tv = libc::timeval {
            tv_sec: 2,
            tv_usec: 500_000,
        };
        assert_eq!(timeval_to_duration(tv), Duration::from_millis(2_500));
    }

    #[test]
    fn test_self_usage_grows_with_work() {
        let sampler = Sampler::start(UsageScope::CurrentProcess).unwrap();

        let mut acc = 0u64;
        for i in 0..5_000_000u64 {
            acc = std::hint::black_box(acc.wrapping_add(i));
        }

        let m = sampler.finish().unwrap();
        assert!(m.wall > Duration::ZERO);
        assert!(m.cpu.total() >= Duration::ZERO);
    }

    #[test]
    fn test_children_usage_is_queryable() {
        assert!(CpuTime::query(UsageScope::Children).is_ok());
    }
}
