/// Every distinct failure mode the verifier can hit. All of them flatten to
/// a single `Unauthorized` outcome at the API boundary (§7) — callers
/// should log the variant but never expose it to the client.
#[derive(Debug, thiserror::Error)]
pub enum AttestationError {
    #[error("malformed JWS: {0}")]
    MalformedJws(String),
    #[error("certificate chain did not resolve to the expected hostname")]
    UnexpectedHostname,
    #[error("leaf certificate could not be parsed")]
    InvalidCertificate,
    #[error("JWS signature verification failed")]
    SignatureInvalid,
    #[error("nonce did not match the derived value")]
    NonceMismatch,
    #[error("timestampMs {0} outside the allowed verification window")]
    TimestampOutOfRange(i64),
    #[error("basicIntegrity or ctsProfileMatch failed policy requirements")]
    IntegrityFailed,
    #[error("apk certificate digest not in the allowed set")]
    UnrecognizedApk,
    #[error("device attestation rejected by policy")]
    DeviceCheckRejected,
}
