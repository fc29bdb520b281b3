// Scoped-thread driver over an in-process counter
use super::{panic_message, TestDriver};
use crate::config::{Combination, SyncMode, WorkerKind};
use crate::counter::{SharedCounter, Sharing};
use crate::error::{BenchError, BenchResult};
use crate::report::TestReport;
use crate::sampler::{Sampler, UsageScope};
use crate::worker::WorkerTask;
use std::thread::{self, ScopedJoinHandle};

/// Workers are named threads sharing one counter by reference
///
/// CPU time is sampled for the whole process, so it includes every thread
/// of the caller, not just the workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDriver;

impl TestDriver for ThreadDriver {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Thread
    }

    fn run(&self, workers: usize, increments: u64, mode: SyncMode) -> BenchResult<TestReport> {
        let combo = Combination {
            kind: WorkerKind::Thread,
            mode,
        };
        let counter = SharedCounter::create(Sharing::InProcess, mode)?;
        let sampler = Sampler::start(UsageScope::CurrentProcess)?;

        let joined = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for id in 0..workers {
                let task = WorkerTask::new(id, WorkerKind::Thread, increments, &counter, mode);
                let spawned = thread::Builder::new()
                    .name(format!("worker-{}", id))
                    .spawn_scoped(scope, move || task.run());

                match spawned {
                    Ok(handle) => handles.push((id, handle)),
                    Err(source) => {
                        tracing::debug!(
                            "thread creation failed for worker {}: {}",
                            id,
                            source
                        );
                        if let Err(e) = join_all(handles) {
                            tracing::warn!("while aborting run: {}", e);
                        }
                        return Err(BenchError::ThreadSpawn { worker: id, source });
                    }
                }
            }
            tracing::debug!(workers = handles.len(), "spawned thread workers");
            join_all(handles)
        });

        let measurement = sampler.finish()?;
        joined?;

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

/// Join every worker, returning the first failure seen
fn join_all(handles: Vec<(usize, ScopedJoinHandle<'_, BenchResult<u64>>)>) -> BenchResult<()> {
    let mut first_error = None;
    for (worker, handle) in handles {
        let failure = match handle.join() {
            Ok(Ok(_)) => continue,
            Ok(Err(e)) => BenchError::WorkerFailed {
                worker,
                reason: e.to_string(),
            },
            Err(payload) => BenchError::WorkerFailed {
                worker,
                reason: format!("panicked: {}", panic_message(payload.as_ref())),
            },
        };
        tracing::debug!("{}", failure);
        first_error.get_or_insert(failure);
    }
    first_error.map_or(Ok(()), Err)
}
