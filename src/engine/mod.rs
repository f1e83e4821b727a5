//! Batch Orchestrator.
//!
//! A job is pre-flighted synchronously, then run on one dedicated worker thread that processes
//! items and variants strictly in order. Cancellation is cooperative and checked before each
//! item and before each variant, so an operator that has started always finishes. Per-unit
//! failures are recorded and skipped; only structural problems end a job as
//! [`JobStatus::Failed`].

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc,
};
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::catalog::Catalog;
use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::job::Job;
use crate::ops::OperatorRegistry;

mod observer;
mod run;
mod state;

pub use observer::{JobObserver, LogObserver, NoopObserver};
pub use run::{Preview, execute, preflight, preview, run_job};
pub use state::{ExecutionState, JobReport, JobStatus, OutputRecord, Progress, UnitError};

/// Catalog plus operator bindings, with at most one job running at a time.
#[derive(Clone, Debug)]
pub struct Engine {
    catalog: Arc<Catalog>,
    registry: Arc<OperatorRegistry>,
    running: Arc<AtomicBool>,
}

impl Engine {
    pub fn new(catalog: Catalog, registry: OperatorRegistry) -> Self {
        Self {
            catalog: Arc::new(catalog),
            registry: Arc::new(registry),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Built-in catalog with the built-in operator implementations.
    pub fn builtin() -> Self {
        Self::new(Catalog::builtin(), OperatorRegistry::builtin())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Pre-flight `job`, then run it on a worker thread.
    ///
    /// Fails with [`AugsweepError::JobAlreadyRunning`] while another job from this engine (or a
    /// clone of it) is running. Pre-flight errors are returned here and nothing is written.
    pub fn start(&self, job: Job, observer: Arc<dyn JobObserver>) -> AugsweepResult<JobHandle> {
        let guard = self.claim()?;
        let items = run::preflight(&self.catalog, &self.registry, &job)?;

        let state = Arc::new(ExecutionState::new());
        let (catalog, registry, worker_state) = (
            Arc::clone(&self.catalog),
            Arc::clone(&self.registry),
            Arc::clone(&state),
        );
        let (done_tx, done_rx) = mpsc::channel();
        let worker = std::thread::Builder::new()
            .name("augsweep-job".to_string())
            .spawn(move || {
                let _guard = guard;
                let report = run::execute(
                    &catalog,
                    &registry,
                    &job,
                    &items,
                    &worker_state,
                    observer.as_ref(),
                );
                let _ = done_tx.send(());
                report
            })
            .context("spawn job worker thread")?;

        Ok(JobHandle {
            state,
            worker,
            done: done_rx,
        })
    }

    /// Run `job` on the calling thread. `state` may be reused across jobs: its counters are
    /// reset and any earlier cancellation is cleared once pre-flight passes.
    pub fn run_blocking(
        &self,
        job: &Job,
        state: &ExecutionState,
        observer: &dyn JobObserver,
    ) -> AugsweepResult<JobReport> {
        let _guard = self.claim()?;
        run::run_job(&self.catalog, &self.registry, job, state, observer)
    }

    /// See [`preview`].
    pub fn preview(&self, job: &Job, item_index: usize) -> AugsweepResult<Preview> {
        run::preview(&self.catalog, &self.registry, job, item_index)
    }

    fn claim(&self) -> AugsweepResult<RunningGuard> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| AugsweepError::JobAlreadyRunning)?;
        Ok(RunningGuard(Arc::clone(&self.running)))
    }
}

/// Clears the engine's running flag when the job ends, however it ends.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Handle to a job running on its worker thread.
#[derive(Debug)]
pub struct JobHandle {
    state: Arc<ExecutionState>,
    worker: JoinHandle<JobReport>,
    done: mpsc::Receiver<()>,
}

impl JobHandle {
    /// Ask the worker to stop before its next item or variant.
    pub fn cancel(&self) {
        self.state.cancel();
    }

    pub fn progress(&self) -> Progress {
        self.state.progress()
    }

    /// Shared state, for observers that want to cancel or poll.
    pub fn state(&self) -> Arc<ExecutionState> {
        Arc::clone(&self.state)
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Block until the worker signals completion or `timeout` elapses. Returns whether it finished.
    pub fn wait_timeout(&self, timeout: std::time::Duration) -> bool {
        match self.done.recv_timeout(timeout) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => true,
            Err(mpsc::RecvTimeoutError::Timeout) => false,
        }
    }

    /// Wait for the worker and take its report.
    pub fn join(self) -> AugsweepResult<JobReport> {
        self.worker
            .join()
            .map_err(|_| AugsweepError::Other(anyhow::anyhow!("job worker thread panicked")))
    }
}
