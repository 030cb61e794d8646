use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binds a blob signature to a managed signing key, its version, and the
/// verifying application identifier. `signing_key` is a reference into the
/// key-management backend (see `tekx_crypto::Signer`), never key material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub id: i64,
    pub signing_key: String,
    pub app_package_name: String,
    pub bundle_id: String,
    pub signing_key_version: String,
    pub signing_key_id: String,
    pub end_timestamp: Option<DateTime<Utc>>,
}

impl SignatureInfo {
    /// A `SignatureInfo` is active at `now` unless its `end_timestamp` has passed.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.end_timestamp.map(|end| now <= end).unwrap_or(true)
    }
}
