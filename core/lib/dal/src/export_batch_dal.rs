use chrono::{DateTime, Duration, Utc};
use tekx_db_connection::{Core, Connection, DalError, DalResult, InstrumentExt};
use tekx_types::{ExportBatch, ExportBatchStatus};

use crate::models::StorageExportBatch;

pub struct ExportBatchDal<'a, 'c> {
    pub(crate) storage: &'a mut Connection<'c, Core>,
}

impl ExportBatchDal<'_, '_> {
    pub async fn get(&mut self, batch_id: i64) -> DalResult<ExportBatch> {
        let row: StorageExportBatch = sqlx::query_as(
            r#"
            SELECT batch_id, config_id, bucket_name, filename_root, start_timestamp,
                   end_timestamp, region, status, lease_expires, signature_info_ids
            FROM export_batch
            WHERE batch_id = $1
            "#,
        )
        .bind(batch_id)
        .instrument("export_batch_get")
        .fetch_one(self.storage.as_executor())
        .await?;
        row.try_into()
            .map_err(|e: anyhow::Error| DalError::wrap("export_batch_get decode", sqlx::Error::Decode(e.into())))
    }

    /// Inserts the tiled ranges a `MakeBatchRanges` run produced for a
    /// config (§4.4), each starting life as `OPEN` with no lease. Returns
    /// the number of rows actually created.
    pub async fn insert_batches(
        &mut self,
        config_id: i64,
        bucket_name: &str,
        filename_root: &str,
        region: &str,
        signature_info_ids: &[i64],
        ranges: &[(DateTime<Utc>, DateTime<Utc>)],
    ) -> DalResult<u64> {
        let mut inserted = 0;
        for (start, end) in ranges {
            let rows = sqlx::query(
                r#"
                INSERT INTO export_batch (
                    config_id, bucket_name, filename_root, start_timestamp, end_timestamp,
                    region, status, lease_expires, signature_info_ids
                )
                VALUES ($1, $2, $3, $4, $5, $6, 'OPEN', NULL, $7)
                ON CONFLICT (config_id, start_timestamp, end_timestamp) DO NOTHING
                "#,
            )
            .bind(config_id)
            .bind(bucket_name)
            .bind(filename_root)
            .bind(start)
            .bind(end)
            .bind(region)
            .bind(signature_info_ids)
            .instrument("export_batch_insert")
            .execute(self.storage.as_executor())
            .await?;
            inserted += rows;
        }
        Ok(inserted)
    }

    /// Finds the oldest claimable batch (§4.5 step 1: `OPEN`, or `PENDING`
    /// with an expired lease, and whose window has elapsed), claims it by
    /// setting `PENDING` with a fresh lease, and returns it. Uses
    /// `FOR UPDATE SKIP LOCKED` so concurrent workers never contend on the
    /// same candidate row.
    pub async fn lease_next_batch(
        &mut self,
        now: DateTime<Utc>,
        lease_duration: Duration,
    ) -> DalResult<Option<ExportBatch>> {
        let mut tx = self.storage.start_transaction().await?;

        let candidate: Option<StorageExportBatch> = sqlx::query_as(
            r#"
            SELECT batch_id, config_id, bucket_name, filename_root, start_timestamp,
                   end_timestamp, region, status, lease_expires, signature_info_ids
            FROM export_batch
            WHERE end_timestamp < $1
              AND (status = 'OPEN' OR (status = 'PENDING' AND (lease_expires IS NULL OR lease_expires < $1)))
            ORDER BY end_timestamp
            LIMIT 1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(now)
        .instrument("export_batch_lease_candidate")
        .fetch_optional(tx.as_executor())
        .await?;

        let Some(candidate) = candidate else {
            return Ok(None);
        };

        let lease_expires = now + lease_duration;
        sqlx::query("UPDATE export_batch SET status = 'PENDING', lease_expires = $2 WHERE batch_id = $1")
            .bind(candidate.batch_id)
            .bind(lease_expires)
            .instrument("export_batch_lease_claim")
            .execute(tx.as_executor())
            .await?;

        tx.commit().await?;

        let mut leased = candidate;
        leased.status = ExportBatchStatus::Pending.to_string();
        leased.lease_expires = Some(lease_expires);
        leased
            .try_into()
            .map(Some)
            .map_err(|e: anyhow::Error| DalError::wrap("export_batch_lease decode", sqlx::Error::Decode(e.into())))
    }

    /// Marks a batch `COMPLETE`, clearing its lease. Called only after the
    /// corresponding export files have been written and the index updated
    /// (§9 ambiguity i: index write precedes finalize).
    pub async fn finalize(&mut self, batch_id: i64) -> DalResult<()> {
        sqlx::query("UPDATE export_batch SET status = 'COMPLETE', lease_expires = NULL WHERE batch_id = $1")
            .bind(batch_id)
            .instrument("export_batch_finalize")
            .execute(self.storage.as_executor())
            .await?;
        Ok(())
    }

    /// Releases a lease without finalizing — used when a worker times out
    /// or is cancelled partway through (§4.5): the batch reverts to `OPEN`
    /// so another worker can retry it from scratch.
    pub async fn release_lease(&mut self, batch_id: i64) -> DalResult<()> {
        sqlx::query(
            "UPDATE export_batch SET status = 'OPEN', lease_expires = NULL WHERE batch_id = $1 AND status = 'PENDING'",
        )
        .bind(batch_id)
        .instrument("export_batch_release_lease")
        .execute(self.storage.as_executor())
        .await?;
        Ok(())
    }

    /// Transitions a fully-cleaned-up batch to `DELETED` (§4.9): called
    /// once every one of its `ExportFile`s has been marked `DELETED`.
    pub async fn mark_deleted(&mut self, batch_id: i64) -> DalResult<()> {
        sqlx::query("UPDATE export_batch SET status = 'DELETED' WHERE batch_id = $1 AND status = 'COMPLETE'")
            .bind(batch_id)
            .instrument("export_batch_mark_deleted")
            .execute(self.storage.as_executor())
            .await?;
        Ok(())
    }
}
