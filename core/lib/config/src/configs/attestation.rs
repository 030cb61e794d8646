use std::time::Duration;

/// Global bounds on Android/iOS attestation verification (C5, §4.3) that
/// apply across every `AuthorizedApp`, independent of its per-app policy.
#[derive(Debug, Clone, PartialEq)]
pub struct AttestationConfig {
    /// Earliest a SafetyNet `timestampMs` may be, relative to verification
    /// time (most-negative end of `[minValidTime, maxValidTime]`).
    pub min_valid_time_skew: Duration,
    /// Latest a SafetyNet `timestampMs` may be, relative to verification time.
    pub max_valid_time_skew: Duration,
    pub safetynet_hostname: String,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            min_valid_time_skew: Duration::from_secs(60),
            max_valid_time_skew: Duration::from_secs(60),
            safetynet_hostname: "attest.android.com".to_string(),
        }
    }
}
