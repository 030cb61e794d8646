use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// SafetyNet (Android) attestation policy attached to an [`AuthorizedApp`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyNetPolicy {
    pub basic_integrity_required: bool,
    pub cts_profile_match_required: bool,
    pub allowed_past_seconds: i64,
    pub allowed_future_seconds: i64,
    pub allowed_apk_digests: Vec<String>,
}

/// DeviceCheck (iOS) attestation policy attached to an [`AuthorizedApp`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCheckPolicy {
    pub team_id: String,
    pub key_id: String,
    /// PEM-encoded ECDSA P-256 private key used to verify DeviceCheck tokens.
    pub private_key_pem: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedApp {
    pub app_package_name: String,
    pub platform: Platform,
    pub allowed_regions: Vec<String>,
    pub safety_net: Option<SafetyNetPolicy>,
    pub device_check: Option<DeviceCheckPolicy>,
}

impl AuthorizedApp {
    pub fn allows_region(&self, region: &str) -> bool {
        self.allowed_regions.iter().any(|r| r == region)
    }
}
