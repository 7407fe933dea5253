//! Progress reporting for the fetch pipeline.

use super::Dataset;
use tracing::info;

/// Progress callbacks for a fetch run.
pub trait FetchProgress {
    /// Called before a dataset is requested.
    fn on_fetch(&self, dataset: Dataset);

    /// Called after a dataset has been written to disk.
    fn on_saved(&self, dataset: Dataset, records: usize);
}

/// Reports progress through `tracing` at info level.
pub struct LogProgress;

impl FetchProgress for LogProgress {
    fn on_fetch(&self, dataset: Dataset) {
        info!("fetching {}...", dataset.label());
    }

    fn on_saved(&self, dataset: Dataset, records: usize) {
        info!(
            file = dataset.file_name(),
            "saved {records} {} records",
            dataset.label()
        );
    }
}

/// Discards all progress events.
pub struct NoProgress;

impl FetchProgress for NoProgress {
    fn on_fetch(&self, _dataset: Dataset) {}

    fn on_saved(&self, _dataset: Dataset, _records: usize) {}
}
