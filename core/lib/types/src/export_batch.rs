use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportBatchStatus {
    Open,
    Pending,
    Complete,
    Deleted,
}

impl fmt::Display for ExportBatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportBatchStatus::Open => "OPEN",
            ExportBatchStatus::Pending => "PENDING",
            ExportBatchStatus::Complete => "COMPLETE",
            ExportBatchStatus::Deleted => "DELETED",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ExportBatchStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(ExportBatchStatus::Open),
            "PENDING" => Ok(ExportBatchStatus::Pending),
            "COMPLETE" => Ok(ExportBatchStatus::Complete),
            "DELETED" => Ok(ExportBatchStatus::Deleted),
            other => Err(anyhow::anyhow!("unknown export batch status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBatch {
    pub batch_id: i64,
    pub config_id: i64,
    pub bucket_name: String,
    pub filename_root: String,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
    pub region: String,
    pub status: ExportBatchStatus,
    pub lease_expires: Option<DateTime<Utc>>,
    pub signature_info_ids: Vec<i64>,
}

impl ExportBatch {
    /// Whether the batch can be leased at `now`: it is `OPEN`, or `PENDING`
    /// with an expired lease, and its window has fully elapsed.
    pub fn is_claimable(&self, now: DateTime<Utc>) -> bool {
        self.end_timestamp < now
            && match self.status {
                ExportBatchStatus::Open => true,
                ExportBatchStatus::Pending => self.lease_expires.map(|e| e < now).unwrap_or(true),
                _ => false,
            }
    }
}
