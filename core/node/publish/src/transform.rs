use chrono::{DateTime, Utc};
use tekx_attestation::NonceKey;
use tekx_types::{truncate_window, Exposure};

use crate::validate::ValidatedPublish;

/// Builds the [`NonceKey`] list the attestation verifier derives the
/// Android nonce from, in the same order the keys were submitted (nonce
/// derivation sorts internally, so caller order does not matter — §4.3).
pub fn nonce_keys(validated: &ValidatedPublish) -> Vec<NonceKey<'_>> {
    validated
        .keys
        .iter()
        .map(|key| NonceKey {
            key_base64: &key.key_base64,
            interval_number: key.interval_number,
            interval_count: key.interval_count,
            transmission_risk: key.transmission_risk,
        })
        .collect()
}

/// Derives the immutable `Exposure` rows for a validated, attested publish
/// (§4.2). Every key in one publish shares `created_at =
/// TruncateWindow(now, publish_window)` so they are groupable into the same
/// batch regardless of upload jitter.
pub fn to_exposures(
    validated: &ValidatedPublish,
    verification_authority_name: &str,
    publish_window: chrono::Duration,
    now: DateTime<Utc>,
) -> Vec<Exposure> {
    let created_at = truncate_window(now, publish_window);
    validated
        .keys
        .iter()
        .map(|key| Exposure {
            exposure_key: key.key_data,
            transmission_risk: key.transmission_risk,
            app_package_name: validated.app_package_name.clone(),
            regions: validated.regions.clone(),
            interval_number: key.interval_number,
            interval_count: key.interval_count,
            created_at,
            local_provenance: true,
            verification_authority_name: verification_authority_name.to_string(),
            federation_sync_id: None,
        })
        .collect()
}
