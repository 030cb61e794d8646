use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tekx_types::Exposure;

#[derive(Debug, Clone, FromRow)]
pub struct StorageExposure {
    pub exposure_key: Vec<u8>,
    pub transmission_risk: i16,
    pub app_package_name: String,
    pub regions: Vec<String>,
    pub interval_number: i32,
    pub interval_count: i32,
    pub created_at: DateTime<Utc>,
    pub local_provenance: bool,
    pub verification_authority_name: String,
    pub federation_sync_id: Option<i64>,
}

impl TryFrom<StorageExposure> for Exposure {
    type Error = anyhow::Error;

    fn try_from(row: StorageExposure) -> Result<Self, Self::Error> {
        let exposure_key: [u8; 16] = row
            .exposure_key
            .try_into()
            .map_err(|_| anyhow::anyhow!("stored exposure_key is not 16 bytes"))?;
        Ok(Exposure {
            exposure_key,
            transmission_risk: row.transmission_risk,
            app_package_name: row.app_package_name,
            regions: row.regions,
            interval_number: row.interval_number,
            interval_count: row.interval_count,
            created_at: row.created_at,
            local_provenance: row.local_provenance,
            verification_authority_name: row.verification_authority_name,
            federation_sync_id: row.federation_sync_id,
        })
    }
}
