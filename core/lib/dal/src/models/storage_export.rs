use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tekx_types::{ExportBatch, ExportBatchStatus, ExportConfig, ExportFile, ExportFileStatus};

#[derive(Debug, Clone, FromRow)]
pub struct StorageExportConfig {
    pub config_id: i64,
    pub bucket_name: String,
    pub filename_root: String,
    pub period_seconds: i64,
    pub region: String,
    pub from_timestamp: DateTime<Utc>,
    pub thru_timestamp: Option<DateTime<Utc>>,
    pub signature_info_ids: Vec<i64>,
}

impl From<StorageExportConfig> for ExportConfig {
    fn from(row: StorageExportConfig) -> Self {
        ExportConfig {
            config_id: row.config_id,
            bucket_name: row.bucket_name,
            filename_root: row.filename_root,
            period_seconds: row.period_seconds,
            region: row.region,
            from: row.from_timestamp,
            thru: row.thru_timestamp,
            signature_info_ids: row.signature_info_ids,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StorageExportBatch {
    pub batch_id: i64,
    pub config_id: i64,
    pub bucket_name: String,
    pub filename_root: String,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
    pub region: String,
    pub status: String,
    pub lease_expires: Option<DateTime<Utc>>,
    pub signature_info_ids: Vec<i64>,
}

impl TryFrom<StorageExportBatch> for ExportBatch {
    type Error = anyhow::Error;

    fn try_from(row: StorageExportBatch) -> Result<Self, Self::Error> {
        Ok(ExportBatch {
            batch_id: row.batch_id,
            config_id: row.config_id,
            bucket_name: row.bucket_name,
            filename_root: row.filename_root,
            start_timestamp: row.start_timestamp,
            end_timestamp: row.end_timestamp,
            region: row.region,
            status: ExportBatchStatus::from_str(&row.status)?,
            lease_expires: row.lease_expires,
            signature_info_ids: row.signature_info_ids,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StorageExportFile {
    pub filename: String,
    pub bucket_name: String,
    pub batch_id: i64,
    pub region: String,
    pub batch_num: i32,
    pub batch_size: i32,
    pub status: String,
}

impl TryFrom<StorageExportFile> for ExportFile {
    type Error = anyhow::Error;

    fn try_from(row: StorageExportFile) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "COMPLETE" => ExportFileStatus::Complete,
            "DELETED" => ExportFileStatus::Deleted,
            other => anyhow::bail!("unknown export file status: {other}"),
        };
        Ok(ExportFile {
            filename: row.filename,
            bucket_name: row.bucket_name,
            batch_id: row.batch_id,
            region: row.region,
            batch_num: row.batch_num,
            batch_size: row.batch_size,
            status,
        })
    }
}
