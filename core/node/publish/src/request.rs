use serde::Deserialize;
use tekx_types::Platform;

/// Body of `POST /` (§6). Unknown top-level fields are rejected — clients
/// that send a field this server doesn't know about get the same 200-OK
/// client-error treatment as any other `InvalidInput`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishRequest {
    #[serde(rename = "temporaryExposureKeys")]
    pub temporary_exposure_keys: Vec<TemporaryExposureKeyRequest>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(rename = "appPackageName")]
    pub app_package_name: String,
    pub platform: Platform,
    #[serde(rename = "deviceVerificationPayload")]
    pub device_verification_payload: String,
    #[serde(rename = "verificationPayload", default)]
    pub verification_payload: String,
    #[serde(default)]
    pub padding: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemporaryExposureKeyRequest {
    pub key: String,
    #[serde(rename = "rollingStartNumber")]
    pub rolling_start_number: i32,
    #[serde(rename = "rollingPeriod")]
    pub rolling_period: i32,
    #[serde(rename = "transmissionRisk")]
    pub transmission_risk: i16,
}
