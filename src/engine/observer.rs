use crate::input::InputItem;

use super::state::{JobReport, OutputRecord, Progress, UnitError};

/// Receives notifications from a running job, on the worker thread.
///
/// Every hook defaults to doing nothing.
pub trait JobObserver: Send + Sync {
    /// Item `index` of `count` is about to be loaded.
    fn on_item_started(&self, _item: &InputItem, _index: usize, _count: usize) {}

    /// A unit was written.
    fn on_output(&self, _record: &OutputRecord, _progress: Progress) {}

    fn on_unit_error(&self, _error: &UnitError) {}

    /// The job reached a terminal state.
    fn on_finished(&self, _report: &JobReport) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl JobObserver for NoopObserver {}

/// Logs each item and each output through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl JobObserver for LogObserver {
    fn on_item_started(&self, item: &InputItem, index: usize, count: usize) {
        tracing::info!(item = item.id(), "item {}/{}: {}", index + 1, count, item.describe());
    }

    fn on_output(&self, record: &OutputRecord, progress: Progress) {
        tracing::debug!(
            item = %record.source_item_id,
            variant = record.variant_index,
            progress = progress.fraction(),
            "wrote {}",
            record.destination_path.display()
        );
    }

    fn on_finished(&self, report: &JobReport) {
        tracing::info!(status = ?report.status, "{}", report.summary());
    }
}
