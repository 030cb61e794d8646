use std::time::Duration;

/// Scheduling knobs for the export scheduler (C6, §4.4) and batch worker
/// (C7, §4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBatcherConfig {
    /// TTL on the `"create_batches"` lock the scheduler runs under.
    pub create_timeout: Duration,
    /// TTL on a batch lease acquired by `LeaseBatch`.
    pub lease_timeout: Duration,
    /// Up to this many candidate batch IDs are collected per `LeaseBatch` call.
    pub lease_batch_size: u32,
    /// Records accumulated per export file before sealing a new one.
    pub max_records_per_file: u32,
    /// Per-upload timeout writing an export file or the index.
    pub blob_operation_timeout: Duration,
    /// TTL on the per-batch `"export-batch-{batchId}"` index-update lock.
    pub index_lock_timeout: Duration,
    /// Wall-clock window used by `MakeBatchRanges` when no prior batch
    /// exists: anything older is treated as "no history" rather than
    /// walked backward one period at a time.
    pub sanity_date: chrono::DateTime<chrono::Utc>,
}

impl Default for ExportBatcherConfig {
    fn default() -> Self {
        Self {
            create_timeout: Duration::from_secs(5 * 60),
            lease_timeout: Duration::from_secs(5 * 60),
            lease_batch_size: 100,
            max_records_per_file: 17_000,
            blob_operation_timeout: Duration::from_secs(50),
            index_lock_timeout: Duration::from_secs(60),
            sanity_date: chrono::DateTime::UNIX_EPOCH,
        }
    }
}
