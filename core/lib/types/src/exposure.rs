use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A 16-byte Temporary Exposure Key as published by a device.
pub type ExposureKey = [u8; 16];

/// An immutable, deduplicated exposure key record as stored by the server.
///
/// Primary key is `exposure_key`; conflicting inserts are silently skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exposure {
    pub exposure_key: ExposureKey,
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

impl Exposure {
    pub const MAX_TRANSMISSION_RISK: i16 = 8;
    pub const MIN_INTERVAL_COUNT: i32 = 1;
    pub const MAX_INTERVAL_COUNT: i32 = 144;

    /// The interval at which this key's rolling period ends, exclusive.
    pub fn interval_end(&self) -> i32 {
        self.interval_number + self.interval_count
    }
}
