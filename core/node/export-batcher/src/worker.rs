use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use tekx_config::ExportBatcherConfig;
use tekx_crypto::Signer;
use tekx_dal::{CoreDal, IterateExposuresCriteria, ScanOutcome};
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_export_file::{assemble, ExportFileInputs};
use tekx_locking::{LockOutcome, NamedLockService};
use tekx_object_store::{BlobKey, BucketStore};
use tekx_types::{Exposure, ExportBatch, ExportFile, ExportFileStatus};

use crate::{error::WorkerError, metrics::METRICS};

/// Works a single leased batch end to end (§4.5), or returns `None` if
/// there was nothing claimable — the caller's signal to back off.
pub async fn run_once(
    pool: &ConnectionPool<Core>,
    locks: &NamedLockService,
    store: &BucketStore,
    signer: &dyn Signer,
    config: &ExportBatcherConfig,
    now: DateTime<Utc>,
) -> anyhow::Result<Option<i64>> {
    let mut conn = pool.connection_tagged("export_worker").await?;
    let lease_duration = Duration::from_std(config.lease_timeout)?;
    let batch = conn.export_batch_dal().lease_next_batch(now, lease_duration).await?;
    drop(conn);

    let Some(batch) = batch else {
        METRICS.lease_attempts[&crate::metrics::LeaseOutcome::Empty].inc();
        return Ok(None);
    };
    METRICS.lease_attempts[&crate::metrics::LeaseOutcome::Leased].inc();

    let batch_id = batch.batch_id;
    match work_batch(pool, locks, store, signer, config, &batch, now).await {
        Ok(()) => {
            METRICS.batches_finalized.inc();
            Ok(Some(batch_id))
        }
        Err(err) => {
            tracing::error!(batch_id, %err, "batch worker failed, releasing lease for retry");
            let mut conn = pool.connection_tagged("export_worker").await?;
            conn.export_batch_dal().release_lease(batch_id).await?;
            METRICS.batches_released.inc();
            Err(err.into())
        }
    }
}

async fn work_batch(
    pool: &ConnectionPool<Core>,
    locks: &NamedLockService,
    store: &BucketStore,
    signer: &dyn Signer,
    config: &ExportBatcherConfig,
    batch: &ExportBatch,
    now: DateTime<Utc>,
) -> Result<(), WorkerError> {
    let exposures = collect_exposures(pool, batch).await?;
    let shards = shard(exposures, config.max_records_per_file as usize);
    let batch_size = shards.len() as i32;

    let signature_infos = {
        let mut conn = pool.connection_tagged("export_worker").await?;
        conn.signature_info_dal().get_many(&batch.signature_info_ids).await?
    };

    let mut written_files = Vec::with_capacity(shards.len());
    for (i, shard_exposures) in shards.into_iter().enumerate() {
        let batch_num = (i + 1) as i32;
        let filename = format!("{}/{}-{:05}.zip", batch.filename_root, batch.start_timestamp.timestamp(), batch_num);

        let inputs = ExportFileInputs {
            batch,
            exposures: &shard_exposures,
            batch_num,
            batch_size,
            signature_infos: &signature_infos,
        };
        let archive = assemble(inputs, signer, now).await?;

        tokio::time::timeout(config.blob_operation_timeout, store.put(&BlobKey(filename.clone()), Bytes::from(archive)))
            .await
            .map_err(|_| tekx_object_store::ObjectStoreError::NotFound { key: filename.clone() })??;
        METRICS.files_written.inc();

        written_files.push(ExportFile {
            filename,
            bucket_name: batch.bucket_name.clone(),
            batch_id: batch.batch_id,
            region: batch.region.clone(),
            batch_num,
            batch_size,
            status: ExportFileStatus::Complete,
        });
    }

    update_index(pool, locks, store, config, batch).await?;
    finalize(pool, batch.batch_id, &written_files).await?;
    Ok(())
}

async fn collect_exposures(pool: &ConnectionPool<Core>, batch: &ExportBatch) -> Result<Vec<Exposure>, WorkerError> {
    let mut conn = pool.connection_tagged("export_worker").await?;
    let criteria = IterateExposuresCriteria::new(batch.start_timestamp, batch.end_timestamp).with_regions(vec![batch.region.clone()]);

    let mut exposures = Vec::new();
    conn.exposures_dal()
        .scan_exposures(&criteria, 1000, |exposure| {
            exposures.push(exposure);
            ScanOutcome::Continue
        })
        .await?;
    Ok(exposures)
}

/// Splits exposures into groups of at most `max_records_per_file`,
/// preserving encounter order (§4.5 step 3). Sealing the final partial
/// group even when empty-input yields zero groups, not one empty group.
fn shard(exposures: Vec<Exposure>, max_records_per_file: usize) -> Vec<Vec<Exposure>> {
    if exposures.is_empty() {
        return Vec::new();
    }
    exposures
        .chunks(max_records_per_file.max(1))
        .map(<[Exposure]>::to_vec)
        .collect()
}

async fn update_index(
    pool: &ConnectionPool<Core>,
    locks: &NamedLockService,
    store: &BucketStore,
    config: &ExportBatcherConfig,
    batch: &ExportBatch,
) -> Result<(), WorkerError> {
    let lock_id = format!("export-batch-{}", batch.batch_id);
    let ttl = Duration::from_std(config.index_lock_timeout).unwrap_or_else(|_| Duration::minutes(1));

    let handle = loop {
        match locks.lock(&lock_id, ttl).await? {
            LockOutcome::Acquired(handle) => break handle,
            LockOutcome::AlreadyLocked => {
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
        }
    };

    let result = rewrite_index(pool, store, batch.config_id, &batch.filename_root).await;

    if let Err(err) = locks.unlock(&handle).await {
        tracing::warn!(lock_id = %lock_id, %err, "failed to release index-update lock");
    }
    result
}

async fn rewrite_index(pool: &ConnectionPool<Core>, store: &BucketStore, config_id: i64, filename_root: &str) -> Result<(), WorkerError> {
    let mut conn = pool.connection_tagged("export_worker").await?;
    let mut filenames = conn.export_file_dal().list_complete_for_config(config_id).await?;
    filenames.sort();
    filenames.dedup();

    let contents = filenames.join("\n");
    let key = BlobKey(format!("{filename_root}/index.txt"));
    store.put(&key, Bytes::from(contents.into_bytes())).await?;
    Ok(())
}

async fn finalize(pool: &ConnectionPool<Core>, batch_id: i64, files: &[ExportFile]) -> Result<(), WorkerError> {
    let mut conn = pool.connection_tagged("export_worker").await?;
    let mut tx = conn.start_transaction().await?;
    for file in files {
        if !tx.export_file_dal().insert(file).await? {
            tracing::debug!(filename = %file.filename, "export file insert conflicted, already recorded");
        }
    }
    tx.export_batch_dal().finalize(batch_id).await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tekx_types::ExposureKey;

    use super::*;

    fn exposure(key: u8) -> Exposure {
        Exposure {
            exposure_key: [key; 16],
            transmission_risk: 1,
            app_package_name: "com.example".to_string(),
            regions: vec!["US".to_string()],
            interval_number: 1,
            interval_count: 144,
            created_at: Utc::now(),
            local_provenance: true,
            verification_authority_name: "authority".to_string(),
            federation_sync_id: None,
        }
    }

    #[test]
    fn shard_empty_input_yields_no_groups() {
        assert!(shard(Vec::new(), 10).is_empty());
    }

    #[test]
    fn shard_splits_at_the_configured_size() {
        let exposures: Vec<Exposure> = (0..25).map(exposure).collect();
        let groups = shard(exposures, 10);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].len(), 10);
        assert_eq!(groups[1].len(), 10);
        assert_eq!(groups[2].len(), 5);
    }

    #[test]
    fn shard_exact_multiple_has_no_trailing_empty_group() {
        let exposures: Vec<Exposure> = (0..20).map(exposure).collect();
        let groups = shard(exposures, 10);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn exposure_key_type_alias_matches_raw_bytes() {
        let key: ExposureKey = [0u8; 16];
        assert_eq!(key.len(), 16);
    }
}
