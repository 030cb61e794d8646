use serde::Deserialize;

/// The SafetyNet attestation claims this verifier cares about. Unknown
/// fields in the real payload (`apkPackageName`, `advice`, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SafetyNetClaims {
    /// Base64 of the nonce the device was asked to attest over.
    pub nonce: String,
    #[serde(rename = "timestampMs")]
    pub timestamp_ms: i64,
    #[serde(rename = "apkPackageName")]
    pub apk_package_name: String,
    #[serde(rename = "apkCertificateDigestSha256", default)]
    pub apk_certificate_digest_sha256: Vec<String>,
    #[serde(rename = "ctsProfileMatch")]
    pub cts_profile_match: bool,
    #[serde(rename = "basicIntegrity")]
    pub basic_integrity: bool,
}
