use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tekx_types::SignatureInfo;

#[derive(Debug, Clone, FromRow)]
pub struct StorageSignatureInfo {
    pub id: i64,
    pub signing_key: String,
    pub app_package_name: String,
    pub bundle_id: String,
    pub signing_key_version: String,
    pub signing_key_id: String,
    pub end_timestamp: Option<DateTime<Utc>>,
}

impl From<StorageSignatureInfo> for SignatureInfo {
    fn from(row: StorageSignatureInfo) -> Self {
        SignatureInfo {
            id: row.id,
            signing_key: row.signing_key,
            app_package_name: row.app_package_name,
            bundle_id: row.bundle_id,
            signing_key_version: row.signing_key_version,
            signing_key_id: row.signing_key_id,
            end_timestamp: row.end_timestamp,
        }
    }
}
