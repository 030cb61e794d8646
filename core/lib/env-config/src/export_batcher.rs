use std::time::Duration;

use serde::Deserialize;
use tekx_config::ExportBatcherConfig;

use crate::{envy_load, FromEnv};

#[derive(Debug, Deserialize)]
struct ExportBatcherConfigEnv {
    create_timeout_secs: u64,
    lease_timeout_secs: u64,
    lease_batch_size: u32,
    max_records_per_file: u32,
    blob_operation_timeout_secs: u64,
    index_lock_timeout_secs: u64,
    sanity_date_unix: i64,
}

impl From<ExportBatcherConfigEnv> for ExportBatcherConfig {
    fn from(env: ExportBatcherConfigEnv) -> Self {
        ExportBatcherConfig {
            create_timeout: Duration::from_secs(env.create_timeout_secs),
            lease_timeout: Duration::from_secs(env.lease_timeout_secs),
            lease_batch_size: env.lease_batch_size,
            max_records_per_file: env.max_records_per_file,
            blob_operation_timeout: Duration::from_secs(env.blob_operation_timeout_secs),
            index_lock_timeout: Duration::from_secs(env.index_lock_timeout_secs),
            sanity_date: chrono::DateTime::from_timestamp(env.sanity_date_unix, 0)
                .unwrap_or(chrono::DateTime::UNIX_EPOCH),
        }
    }
}

impl FromEnv for ExportBatcherConfig {
    fn from_env() -> anyhow::Result<Self> {
        envy_load::<ExportBatcherConfigEnv>("export_batcher", "EXPORT_BATCHER_").map(Into::into)
    }
}
