use vise::{Counter, Metrics};

#[derive(Debug, Metrics)]
#[metrics(prefix = "tekx_cleanup")]
pub struct CleanupMetrics {
    /// `Exposure` rows deleted for aging past the TTL.
    pub exposures_deleted: Counter,
    /// `ExportFile` blobs removed from object storage.
    pub blobs_deleted: Counter,
    /// `ExportFile` rows transitioned to `DELETED`.
    pub export_files_deleted: Counter,
    /// `ExportBatch` rows transitioned to `DELETED`.
    pub export_batches_deleted: Counter,
    /// Sweep runs that failed before completing.
    pub runs_failed: Counter,
}

#[vise::register]
pub static METRICS: vise::Global<CleanupMetrics> = vise::Global::new();
