use chrono::{DateTime, Utc};
use tekx_db_connection::{Core, Connection, DalResult, InstrumentExt};
use tekx_types::ExportConfig;

use crate::models::StorageExportConfig;

pub struct ExportConfigDal<'a, 'c> {
    pub(crate) storage: &'a mut Connection<'c, Core>,
}

impl ExportConfigDal<'_, '_> {
    pub async fn get(&mut self, config_id: i64) -> DalResult<Option<ExportConfig>> {
        let row: Option<StorageExportConfig> = sqlx::query_as(
            r#"
            SELECT config_id, bucket_name, filename_root, period_seconds, region,
                   from_timestamp, thru_timestamp, signature_info_ids
            FROM export_config
            WHERE config_id = $1
            "#,
        )
        .bind(config_id)
        .instrument("export_config_get")
        .fetch_optional(self.storage.as_executor())
        .await?;
        Ok(row.map(Into::into))
    }

    /// All configs active at `now` (§3: `from < now <= thru` or `thru`
    /// unset) — the driving set for the export-batch scheduler (§4.4).
    pub async fn list_active(&mut self, now: DateTime<Utc>) -> DalResult<Vec<ExportConfig>> {
        let rows: Vec<StorageExportConfig> = sqlx::query_as(
            r#"
            SELECT config_id, bucket_name, filename_root, period_seconds, region,
                   from_timestamp, thru_timestamp, signature_info_ids
            FROM export_config
            WHERE from_timestamp < $1
              AND (thru_timestamp IS NULL OR $1 <= thru_timestamp)
            ORDER BY config_id
            "#,
        )
        .bind(now)
        .instrument("export_config_list_active")
        .fetch_all(self.storage.as_executor())
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn insert(&mut self, config: &ExportConfig) -> DalResult<()> {
        sqlx::query(
            r#"
            INSERT INTO export_config (
                config_id, bucket_name, filename_root, period_seconds, region,
                from_timestamp, thru_timestamp, signature_info_ids
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(config.config_id)
        .bind(&config.bucket_name)
        .bind(&config.filename_root)
        .bind(config.period_seconds)
        .bind(&config.region)
        .bind(config.from)
        .bind(config.thru)
        .bind(&config.signature_info_ids)
        .instrument("export_config_insert")
        .execute(self.storage.as_executor())
        .await?;
        Ok(())
    }

    /// Logically deletes a config by setting `thru_timestamp` one second in
    /// the past (§4.4 `MarkDeleted`), so in-flight batches finish but no
    /// new ones are scheduled.
    pub async fn mark_deleted(&mut self, config_id: i64, thru: DateTime<Utc>) -> DalResult<()> {
        sqlx::query("UPDATE export_config SET thru_timestamp = $2 WHERE config_id = $1")
            .bind(config_id)
            .bind(thru)
            .instrument("export_config_mark_deleted")
            .execute(self.storage.as_executor())
            .await?;
        Ok(())
    }

    /// The most recent `end_timestamp` among this config's batches, the
    /// scheduler's starting point for `MakeBatchRanges` (§4.4).
    pub async fn latest_batch_end(&mut self, config_id: i64) -> DalResult<Option<DateTime<Utc>>> {
        let row: Option<(Option<DateTime<Utc>>,)> = sqlx::query_as(
            "SELECT MAX(end_timestamp) FROM export_batch WHERE config_id = $1",
        )
        .bind(config_id)
        .instrument("export_config_latest_batch_end")
        .fetch_optional(self.storage.as_executor())
        .await?;
        Ok(row.and_then(|(ts,)| ts))
    }
}
