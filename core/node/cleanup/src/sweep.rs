use chrono::{DateTime, Utc};
use tekx_dal::CoreDal;
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_object_store::{BlobKey, BucketStore};

use crate::{error::CleanupError, metrics::METRICS};

/// One retention sweep (§4.9): deletes exposures and export files that have
/// aged past `cutoff`, removing blobs before marking rows `DELETED` so a
/// crash mid-sweep leaves an orphaned row rather than an orphaned blob.
pub async fn run_once(pool: &ConnectionPool<Core>, store: &BucketStore, cutoff: DateTime<Utc>) -> Result<(), CleanupError> {
    let mut conn = pool.connection_tagged("cleanup").await?;

    let exposures_deleted = conn.exposures_dal().delete_created_before(cutoff).await?;
    METRICS.exposures_deleted.inc_by(exposures_deleted);
    tracing::info!(exposures_deleted, "cleanup: deleted expired exposures");

    let deletable = conn.export_file_dal().list_deletable(cutoff).await?;
    drop(conn);

    let mut touched_batches = std::collections::HashSet::new();
    for file in &deletable {
        store.delete(&BlobKey(file.filename.clone())).await?;
        METRICS.blobs_deleted.inc();

        let mut conn = pool.connection_tagged("cleanup").await?;
        conn.export_file_dal().mark_deleted(&file.filename).await?;
        METRICS.export_files_deleted.inc();
        touched_batches.insert(file.batch_id);
    }
    tracing::info!(files_deleted = deletable.len(), "cleanup: deleted expired export files");

    let mut batches_deleted = 0u64;
    for batch_id in touched_batches {
        let mut conn = pool.connection_tagged("cleanup").await?;
        if conn.export_file_dal().all_deleted_for_batch(batch_id).await? {
            conn.export_batch_dal().mark_deleted(batch_id).await?;
            batches_deleted += 1;
        }
    }
    METRICS.export_batches_deleted.inc_by(batches_deleted);
    tracing::info!(batches_deleted, "cleanup: deleted fully-cleaned-up export batches");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_is_now_minus_ttl() {
        let now = DateTime::parse_from_rfc3339("2026-01-10T00:00:00Z").unwrap().with_timezone(&Utc);
        let ttl = chrono::Duration::hours(240);
        let cutoff = now - ttl;
        assert_eq!(cutoff, DateTime::parse_from_rfc3339("2025-12-31T00:00:00Z").unwrap().with_timezone(&Utc));
    }
}
