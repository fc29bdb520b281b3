// Per-worker increment loop
use crate::config::{SyncMode, WorkerKind};
use crate::counter::SharedCounter;
use crate::error::BenchResult;

/// Work handed to one process or thread
///
/// Built by a driver right before the worker is spawned and consumed inside
/// the worker; nothing of it outlives the worker.
#[derive(Debug, Clone, Copy)]
pub struct WorkerTask<'a> {
    pub id: usize,
    pub kind: WorkerKind,
    pub increments: u64,
    pub counter: &'a SharedCounter,
    pub mode: SyncMode,
}

impl<'a> WorkerTask<'a> {
    pub fn new(
        id: usize,
        kind: WorkerKind,
        increments: u64,
        counter: &'a SharedCounter,
        mode: SyncMode,
    ) -> Self {
        Self {
            id,
            kind,
            increments,
            counter,
            mode,
        }
    }

    /// Run the increment loop, returning how many increments were issued
    pub fn run(&self) -> BenchResult<u64> {
        self.log_start();

        for _ in 0..self.increments {
            self.counter.increment(self.mode)?;
        }

        tracing::debug!(
            worker = self.id,
            local_view = self.counter.read(),
            "{} worker {} done",
            self.kind,
            self.id
        );
        Ok(self.increments)
    }

    fn log_start(&self) {
        match self.kind {
            WorkerKind::Process => tracing::debug!(
                worker = self.id,
                pid = nix::unistd::getpid().as_raw(),
                ppid = nix::unistd::getppid().as_raw(),
                "process worker starting {} increments {}",
                self.increments,
                self.mode
            ),
            WorkerKind::Thread => {
                let current = std::thread::current();
                tracing::debug!(
                    worker = self.id,
                    thread = current.name().unwrap_or("unnamed"),
                    pid = std::process::id(),
                    "thread worker starting {} increments {}",
                    self.increments,
                    self.mode
                )
            }
        }
    }
}
