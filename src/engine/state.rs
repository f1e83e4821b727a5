use std::path::PathBuf;
use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use crate::compose::AppliedOperator;
use crate::foundation::error::{AugsweepError, AugsweepResult, ErrorKind};

/// Lifecycle of one job: `Idle → Running → {Completed | Cancelled | Failed}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// A recorded per-unit failure. `variant` is `None` when the item itself failed to load or save.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UnitError {
    pub item_id: String,
    pub variant: Option<u32>,
    pub kind: ErrorKind,
    pub message: String,
}

impl UnitError {
    pub fn new(item_id: impl Into<String>, variant: Option<u32>, err: &AugsweepError) -> Self {
        Self {
            item_id: item_id.into(),
            variant,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// One written file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutputRecord {
    pub source_item_id: String,
    pub variant_index: u32,
    pub family: String,
    pub label: String,
    pub applied_operators: Vec<AppliedOperator>,
    pub destination_path: PathBuf,
}

/// Point-in-time view of the counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: bool,
}

impl Progress {
    /// `completed / total`, or 0 before any units are known.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Progress and error state shared between the job worker and its observers.
///
/// Counters are plain atomics so readers never block the worker; the error list is behind a
/// mutex that is only held to append or copy.
#[derive(Debug, Default)]
pub struct ExecutionState {
    total: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicBool,
    errors: Mutex<Vec<UnitError>>,
}

impl ExecutionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the counters and errors and set the unit total. A pending cancellation is kept.
    pub fn reset(&self, total: u64) {
        self.total.store(total, Ordering::SeqCst);
        self.completed.store(0, Ordering::SeqCst);
        self.failed.store(0, Ordering::SeqCst);
        self.errors_mut().clear();
    }

    /// Request cooperative cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Withdraw a cancellation request, so the state can drive another job.
    pub fn clear_cancel(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_failed(&self, units: u64) {
        self.failed.fetch_add(units, Ordering::SeqCst);
    }

    pub fn push_error(&self, err: UnitError) {
        self.errors_mut().push(err);
    }

    pub fn progress(&self) -> Progress {
        Progress {
            total: self.total.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            cancelled: self.is_cancelled(),
        }
    }

    /// Copy of the recorded errors, in the order they happened.
    pub fn errors(&self) -> Vec<UnitError> {
        self.errors_mut().clone()
    }

    fn errors_mut(&self) -> MutexGuard<'_, Vec<UnitError>> {
        // a panicking observer must not lose the errors recorded so far
        self.errors.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Final outcome of a job, serializable as the run manifest.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JobReport {
    pub status: JobStatus,
    pub requested_units: u64,
    pub completed_units: u64,
    pub failed_units: u64,
    pub records: Vec<OutputRecord>,
    pub errors: Vec<UnitError>,
    /// Untransformed copies written with `save_original`; not counted as units.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub originals: Vec<PathBuf>,
    /// Structural failure that stopped the job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl JobReport {
    pub fn summary(&self) -> String {
        format!(
            "produced {} of {} requested units, {} failed",
            self.completed_units, self.requested_units, self.failed_units
        )
    }

    pub fn to_json_pretty(&self) -> AugsweepResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AugsweepError::serde(format!("serialize job report: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/state.rs"]
mod tests;
