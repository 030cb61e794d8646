use std::str::FromStr;

use serde_json::Value;
use sqlx::FromRow;
use tekx_types::{AuthorizedApp, DeviceCheckPolicy, Platform, SafetyNetPolicy};

#[derive(Debug, Clone, FromRow)]
pub struct StorageAuthorizedApp {
    pub app_package_name: String,
    pub platform: String,
    pub allowed_regions: Vec<String>,
    pub safety_net_policy: Option<Value>,
    pub device_check_policy: Option<Value>,
}

impl TryFrom<StorageAuthorizedApp> for AuthorizedApp {
    type Error = anyhow::Error;

    fn try_from(row: StorageAuthorizedApp) -> Result<Self, Self::Error> {
        Ok(AuthorizedApp {
            app_package_name: row.app_package_name,
            platform: Platform::from_str(&row.platform)?,
            allowed_regions: row.allowed_regions,
            safety_net: row
                .safety_net_policy
                .map(|v| serde_json::from_value::<SafetyNetPolicy>(v))
                .transpose()?,
            device_check: row
                .device_check_policy
                .map(|v| serde_json::from_value::<DeviceCheckPolicy>(v))
                .transpose()?,
        })
    }
}
