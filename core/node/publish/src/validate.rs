use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use tekx_config::PublishConfig;
use tekx_types::{Exposure, Platform};

use crate::{error::PublishError, request::PublishRequest};

/// One publish-time key after validation: decoded 16-byte key data plus its
/// normalized interval fields (§4.2).
#[derive(Debug, Clone)]
pub struct ValidatedKey {
    pub key_data: [u8; 16],
    /// The key exactly as the client base64-encoded it, needed verbatim to
    /// rederive the Android attestation nonce (§4.3).
    pub key_base64: String,
    pub interval_number: i32,
    pub interval_count: i32,
    pub transmission_risk: i16,
}

impl ValidatedKey {
    fn interval_end(&self) -> i32 {
        self.interval_number + self.interval_count
    }
}

/// A publish request after every check in §4.2 has passed: keys sorted and
/// non-overlapping, regions uppercased, bounds enforced.
#[derive(Debug, Clone)]
pub struct ValidatedPublish {
    pub keys: Vec<ValidatedKey>,
    pub regions: Vec<String>,
    pub app_package_name: String,
    pub platform: Platform,
    pub device_verification_payload: String,
    pub verification_payload: String,
}

pub fn validate(request: &PublishRequest, config: &PublishConfig, now: DateTime<Utc>) -> Result<ValidatedPublish, PublishError> {
    let key_count = request.temporary_exposure_keys.len();
    if key_count == 0 || key_count as u32 > config.max_keys {
        return Err(PublishError::InvalidInput(format!(
            "expected 1..={} keys, got {key_count}",
            config.max_keys
        )));
    }

    let min_interval = tekx_types::interval_number(now - chrono::Duration::from_std(config.max_interval_age).unwrap());
    let max_interval = tekx_types::interval_number(now);

    let mut keys = Vec::with_capacity(key_count);
    for key in &request.temporary_exposure_keys {
        let decoded = STANDARD
            .decode(&key.key)
            .map_err(|e| PublishError::InvalidInput(format!("key is not valid base64: {e}")))?;
        let key_data: [u8; 16] = decoded
            .try_into()
            .map_err(|_| PublishError::InvalidInput("key must decode to exactly 16 bytes".to_string()))?;

        if !(Exposure::MIN_INTERVAL_COUNT..=Exposure::MAX_INTERVAL_COUNT).contains(&key.rolling_period) {
            return Err(PublishError::InvalidInput(format!(
                "rollingPeriod {} outside [1,144]",
                key.rolling_period
            )));
        }
        if key.transmission_risk < 0 || key.transmission_risk > Exposure::MAX_TRANSMISSION_RISK {
            return Err(PublishError::InvalidInput(format!(
                "transmissionRisk {} outside [0,8]",
                key.transmission_risk
            )));
        }
        if key.rolling_start_number < min_interval || key.rolling_start_number >= max_interval {
            return Err(PublishError::InvalidInput(format!(
                "rollingStartNumber {} outside [now-maxAge, now)",
                key.rolling_start_number
            )));
        }

        keys.push(ValidatedKey {
            key_data,
            key_base64: key.key.clone(),
            interval_number: key.rolling_start_number,
            interval_count: key.rolling_period,
            transmission_risk: key.transmission_risk,
        });
    }

    keys.sort_by_key(|k| k.interval_number);
    for window in keys.windows(2) {
        if window[1].interval_number < window[0].interval_end() {
            return Err(PublishError::InvalidInput(
                "keys must not overlap once sorted by rollingStartNumber".to_string(),
            ));
        }
    }

    if request.app_package_name.trim().is_empty() {
        return Err(PublishError::InvalidInput("appPackageName must not be empty".to_string()));
    }

    let regions: Vec<String> = request.regions.iter().map(|r| r.to_uppercase()).collect();

    Ok(ValidatedPublish {
        keys,
        regions,
        app_package_name: request.app_package_name.clone(),
        platform: request.platform,
        device_verification_payload: request.device_verification_payload.clone(),
        verification_payload: request.verification_payload.clone(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::request::TemporaryExposureKeyRequest;

    fn config() -> PublishConfig {
        PublishConfig::default()
    }

    fn key_req(interval: i32, risk: i16) -> TemporaryExposureKeyRequest {
        TemporaryExposureKeyRequest {
            key: STANDARD.encode([1u8; 16]),
            rolling_start_number: interval,
            rolling_period: 144,
            transmission_risk: risk,
        }
    }

    #[test]
    fn rejects_overlapping_keys_after_sorting() {
        let now = Utc.with_ymd_and_hms(2020, 12, 10, 10, 11, 0).unwrap();
        let request = PublishRequest {
            temporary_exposure_keys: vec![key_req(100, 2), key_req(50, 2)],
            regions: vec!["us".to_string()],
            app_package_name: "com.example".to_string(),
            platform: Platform::Android,
            device_verification_payload: "jws".to_string(),
            verification_payload: String::new(),
            padding: None,
        };
        let err = validate(&request, &config(), now).unwrap_err();
        assert!(matches!(err, PublishError::InvalidInput(_)));
    }

    #[test]
    fn uppercases_regions() {
        let now = Utc::now();
        let request = PublishRequest {
            temporary_exposure_keys: vec![key_req(tekx_types::interval_number(now) - 10, 2)],
            regions: vec!["us".to_string(), "ca".to_string()],
            app_package_name: "com.example".to_string(),
            platform: Platform::Android,
            device_verification_payload: "jws".to_string(),
            verification_payload: String::new(),
            padding: None,
        };
        let validated = validate(&request, &config(), now).unwrap();
        assert_eq!(validated.regions, vec!["US".to_string(), "CA".to_string()]);
    }
}
