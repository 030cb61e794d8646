use chrono::{DateTime, Duration, Utc};
use tekx_types::SafetyNetPolicy;

use crate::{claims::SafetyNetClaims, error::AttestationError, jws::ParsedJws};

/// Bounds the caller supplies for validating a claim's `timestampMs`
/// against wall-clock verification time (§4.3).
#[derive(Debug, Clone, Copy)]
pub struct VerificationWindow {
    pub min_valid_time_skew: Duration,
    pub max_valid_time_skew: Duration,
}

/// Verifies a compact SafetyNet JWS attestation against the nonce derived
/// from the same publish request and the app's [`SafetyNetPolicy`].
///
/// All failure modes are distinct [`AttestationError`] variants for
/// logging; callers at the API boundary flatten every `Err` to a single
/// unauthorized outcome (§7).
pub fn verify_safetynet(
    jws_compact: &str,
    expected_nonce_base64: &str,
    policy: &SafetyNetPolicy,
    safetynet_hostname: &str,
    window: VerificationWindow,
    now: DateTime<Utc>,
) -> Result<SafetyNetClaims, AttestationError> {
    let jws = ParsedJws::parse(jws_compact)?;
    jws.verify_hostname(safetynet_hostname)?;
    let claims: SafetyNetClaims = jws.verify_signature_and_decode()?;

    if claims.nonce != expected_nonce_base64 {
        return Err(AttestationError::NonceMismatch);
    }

    let min_valid_ms = (now - window.min_valid_time_skew).timestamp_millis();
    let max_valid_ms = (now + window.max_valid_time_skew).timestamp_millis();
    if claims.timestamp_ms < min_valid_ms || claims.timestamp_ms > max_valid_ms {
        return Err(AttestationError::TimestampOutOfRange(claims.timestamp_ms));
    }

    if policy.basic_integrity_required && !claims.basic_integrity {
        return Err(AttestationError::IntegrityFailed);
    }
    if policy.cts_profile_match_required && !claims.cts_profile_match {
        return Err(AttestationError::IntegrityFailed);
    }

    if !policy.allowed_apk_digests.is_empty()
        && !claims
            .apk_certificate_digest_sha256
            .iter()
            .any(|digest| policy.allowed_apk_digests.contains(digest))
    {
        return Err(AttestationError::UnrecognizedApk);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> SafetyNetPolicy {
        SafetyNetPolicy {
            basic_integrity_required: true,
            cts_profile_match_required: true,
            allowed_past_seconds: 60,
            allowed_future_seconds: 60,
            allowed_apk_digests: vec!["digest-1".to_string()],
        }
    }

    #[test]
    fn malformed_jws_is_rejected_before_any_policy_check() {
        let window = VerificationWindow {
            min_valid_time_skew: Duration::seconds(60),
            max_valid_time_skew: Duration::seconds(60),
        };
        let err = verify_safetynet(
            "not-a-jws",
            "nonce",
            &policy(),
            "attest.android.com",
            window,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AttestationError::MalformedJws(_)));
    }
}
