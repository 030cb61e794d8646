use vise::{Counter, EncodeLabelSet, EncodeLabelValue, Family, Metrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EncodeLabelValue, EncodeLabelSet)]
#[metrics(label = "outcome", rename_all = "snake_case")]
pub enum LeaseOutcome {
    Leased,
    Empty,
}

#[derive(Debug, Metrics)]
#[metrics(prefix = "tekx_export_batcher")]
pub struct ExportBatcherMetrics {
    /// Batches inserted by a scheduler tick across every active config.
    pub batches_created: Counter,
    /// `LeaseBatch` calls, labeled by whether a claimable batch was found.
    pub lease_attempts: Family<LeaseOutcome, Counter>,
    /// Export files (zip shards) written and uploaded.
    pub files_written: Counter,
    /// Batches that reached `COMPLETE`.
    pub batches_finalized: Counter,
    /// Batches whose lease was released without finalizing, due to
    /// cancellation or a failure partway through (§4.5).
    pub batches_released: Counter,
}

#[vise::register]
pub static METRICS: vise::Global<ExportBatcherMetrics> = vise::Global::new();
