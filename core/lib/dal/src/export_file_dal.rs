use chrono::{DateTime, Utc};
use tekx_db_connection::{Core, Connection, DalResult, InstrumentExt};
use tekx_types::ExportFile;

use crate::models::StorageExportFile;

pub struct ExportFileDal<'a, 'c> {
    pub(crate) storage: &'a mut Connection<'c, Core>,
}

impl ExportFileDal<'_, '_> {
    /// Records a completed export file. `filename` is unique per bucket, so
    /// a retried batch write that reproduces the same name is a no-op
    /// rather than an error.
    pub async fn insert(&mut self, file: &ExportFile) -> DalResult<bool> {
        let rows = sqlx::query(
            r#"
            INSERT INTO export_file (
                filename, bucket_name, batch_id, region, batch_num, batch_size, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (filename) DO NOTHING
            "#,
        )
        .bind(&file.filename)
        .bind(&file.bucket_name)
        .bind(file.batch_id)
        .bind(&file.region)
        .bind(file.batch_num)
        .bind(file.batch_size)
        .bind(file.status.to_string())
        .instrument("export_file_insert")
        .execute(self.storage.as_executor())
        .await?;
        Ok(rows == 1)
    }

    pub async fn list_for_batch(&mut self, batch_id: i64) -> DalResult<Vec<ExportFile>> {
        let rows: Vec<StorageExportFile> = sqlx::query_as(
            r#"
            SELECT filename, bucket_name, batch_id, region, batch_num, batch_size, status
            FROM export_file
            WHERE batch_id = $1 AND status = 'COMPLETE'
            ORDER BY batch_num
            "#,
        )
        .bind(batch_id)
        .instrument("export_file_list_for_batch")
        .fetch_all(self.storage.as_executor())
        .await?;
        rows.into_iter()
            .map(|row| row.try_into().map_err(anyhow_to_dal))
            .collect()
    }

    /// Every `COMPLETE` filename for any batch belonging to `config_id`
    /// (§4.5 step 5: the index file covers the whole config, not just the
    /// batch that just finished).
    pub async fn list_complete_for_config(&mut self, config_id: i64) -> DalResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT ef.filename
            FROM export_file ef
            JOIN export_batch eb ON eb.batch_id = ef.batch_id
            WHERE eb.config_id = $1 AND ef.status = 'COMPLETE'
            "#,
        )
        .bind(config_id)
        .instrument("export_file_list_complete_for_config")
        .fetch_all(self.storage.as_executor())
        .await?;
        Ok(rows.into_iter().map(|(filename,)| filename).collect())
    }

    /// Files whose batch has aged past the cleanup TTL and that still have
    /// a blob to remove (§4.9). The blob must be deleted from storage
    /// before the row is marked `DELETED` via [`Self::mark_deleted`].
    pub async fn list_deletable(&mut self, older_than: DateTime<Utc>) -> DalResult<Vec<ExportFile>> {
        let rows: Vec<StorageExportFile> = sqlx::query_as(
            r#"
            SELECT ef.filename, ef.bucket_name, ef.batch_id, ef.region, ef.batch_num, ef.batch_size, ef.status
            FROM export_file ef
            JOIN export_batch eb ON eb.batch_id = ef.batch_id
            WHERE ef.status = 'COMPLETE' AND eb.end_timestamp < $1
            "#,
        )
        .bind(older_than)
        .instrument("export_file_list_deletable")
        .fetch_all(self.storage.as_executor())
        .await?;
        rows.into_iter()
            .map(|row| row.try_into().map_err(anyhow_to_dal))
            .collect()
    }

    pub async fn mark_deleted(&mut self, filename: &str) -> DalResult<()> {
        sqlx::query("UPDATE export_file SET status = 'DELETED' WHERE filename = $1")
            .bind(filename)
            .instrument("export_file_mark_deleted")
            .execute(self.storage.as_executor())
            .await?;
        Ok(())
    }

    /// Whether every file belonging to `batch_id` has been marked
    /// `DELETED` (§4.9: the batch transitions to `DELETED` once its file
    /// count is reached).
    pub async fn all_deleted_for_batch(&mut self, batch_id: i64) -> DalResult<bool> {
        let (remaining,): (i64,) = sqlx::query_as(
            "SELECT count(*) FROM export_file WHERE batch_id = $1 AND status != 'DELETED'",
        )
        .bind(batch_id)
        .instrument("export_file_all_deleted_for_batch")
        .fetch_one(self.storage.as_executor())
        .await?;
        Ok(remaining == 0)
    }
}

fn anyhow_to_dal(e: anyhow::Error) -> tekx_db_connection::DalError {
    tekx_db_connection::DalError::wrap("export_file decode", sqlx::Error::Decode(e.into()))
}
