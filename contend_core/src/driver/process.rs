// fork()/waitpid() driver over a cross-process counter
use super::{panic_message, TestDriver};
use crate::config::{Combination, SyncMode, WorkerKind};
use crate::counter::{SharedCounter, Sharing};
use crate::error::{BenchError, BenchResult};
use crate::report::TestReport;
use crate::sampler::{Sampler, UsageScope};
use crate::worker::WorkerTask;
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};
use std::panic::{self, AssertUnwindSafe};

const EXIT_OK: i32 = 0;
const EXIT_WORKER_ERROR: i32 = 2;
const EXIT_PANIC: i32 = 101;

/// Workers are forked children incrementing a counter in a shared region
///
/// The unsynchronized variant still increments the one shared mapping, not
/// per-child copies: it races across process boundaries exactly like the
/// thread variant races across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessDriver;

impl TestDriver for ProcessDriver {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Process
    }

    fn run(&self, workers: usize, increments: u64, mode: SyncMode) -> BenchResult<TestReport> {
        let combo = Combination {
            kind: WorkerKind::Process,
            mode,
        };
        let counter = SharedCounter::create(Sharing::CrossProcess, mode)?;
        let sampler = Sampler::start(UsageScope::Children)?;

        let mut children: Vec<(usize, Pid)> = Vec::with_capacity(workers);
        for id in 0..workers {
            let task = WorkerTask::new(id, WorkerKind::Process, increments, &counter, mode);

            match unsafe { fork() } {
                Ok(ForkResult::Child) => run_child(task),
                Ok(ForkResult::Parent { child }) => children.push((id, child)),
                Err(source) => {
                    tracing::debug!("fork failed for worker {}: {}", id, source);
                    // Children already running still touch the region
                    if let Err(e) = reap_all(&children) {
                        tracing::warn!("while aborting run: {}", e);
                    }
                    return Err(BenchError::ProcessSpawn { worker: id, source });
                }
            }
        }
        tracing::debug!(workers = children.len(), "spawned process workers");

        let reaped = reap_all(&children);
        let measurement = sampler.finish()?;
        reaped?;

        let observed = counter.read();
        counter.destroy()?;

        Ok(TestReport::new(
            combo,
            workers,
            increments,
            observed,
            &measurement,
        ))
    }
}

/// Body of a forked child; never returns
///
/// Leaves through `_exit` so no destructor runs in the child: the counter's
/// lock and mapping belong to the parent.
fn run_child(task: WorkerTask<'_>) -> ! {
    let code = match panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
        Ok(Ok(_)) => EXIT_OK,
        Ok(Err(e)) => {
            tracing::warn!(worker = task.id, "process worker failed: {}", e);
            EXIT_WORKER_ERROR
        }
        Err(payload) => {
            tracing::warn!(
                worker = task.id,
                "process worker panicked: {}",
                panic_message(payload.as_ref())
            );
            EXIT_PANIC
        }
    };
    unsafe { libc::_exit(code) }
}

/// Wait for every child, in spawn order, even after one of them failed
///
/// Returns the first failure seen.
fn reap_all(children: &[(usize, Pid)]) -> BenchResult<()> {
    let mut first_error = None;
    for &(worker, pid) in children {
        if let Err(e) = reap(worker, pid) {
            tracing::debug!("{}", e);
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

fn reap(worker: usize, pid: Pid) -> BenchResult<()> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, EXIT_OK)) => return Ok(()),
            Ok(WaitStatus::Exited(_, code)) => {
                return Err(BenchError::WorkerFailed {
                    worker,
                    reason: format!("exited with status {}", code),
                })
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                return Err(BenchError::WorkerFailed {
                    worker,
                    reason: format!("killed by {:?}", signal),
                })
            }
            // Stop/continue notifications; keep waiting for termination
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(source) => {
                return Err(BenchError::Wait {
                    pid: pid.as_raw(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synchronized_processes_are_exact() {
        let report = ProcessDriver
            .run(3, 20_000, SyncMode::Synchronized)
            .unwrap();
        assert_eq!(report.kind, WorkerKind::Process);
        assert_eq!(report.expected_total, 60_000);
        assert_eq!(report.observed_total, 60_000);
        assert!(report.is_correct());
    }

    #[test]
    fn test_single_unsynchronized_process_writes_shared_memory() {
        // A private copy-on-write counter would leave the parent at zero
        let report = ProcessDriver
            .run(1, 5_000, SyncMode::Unsynchronized)
            .unwrap();
        assert_eq!(report.observed_total, 5_000);
    }

    #[test]
    fn test_reaping_unknown_child_is_an_error() {
        // pid 1 is never our child
        let err = reap(0, Pid::from_raw(1)).unwrap_err();
        assert!(matches!(err, BenchError::Wait { pid: 1, .. }));
    }

    #[test]
    fn test_failing_child_is_reported() {
        match unsafe { fork() }.unwrap() {
            ForkResult::Child => unsafe { libc::_exit(EXIT_WORKER_ERROR) },
            ForkResult::Parent { child } => {
                let err = reap_all(&[(5, child)]).unwrap_err();
                match err {
                    BenchError::WorkerFailed { worker, reason } => {
                        assert_eq!(worker, 5);
                        assert!(reason.contains("status 2"));
                    }
                    other => panic!("unexpected error: {other}"),
                }
            }
        }
    }
}
