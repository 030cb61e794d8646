use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// One key as it contributes to the Android nonce: its base64-encoded key
/// data, interval number, interval count, and transmission risk, joined by
/// `.` (§4.3).
pub struct NonceKey<'a> {
    pub key_base64: &'a str,
    pub interval_number: i32,
    pub interval_count: i32,
    pub transmission_risk: i16,
}

impl NonceKey<'_> {
    fn to_csv_field(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.key_base64, self.interval_number, self.interval_count, self.transmission_risk
        )
    }
}

/// Derives the Android attestation nonce for a publish request (§4.3):
///
/// `base64(sha256(appPackageName | "|" | sortedCsv(keys) | "|" |
/// sortedUpperCsv(regions) | "|" | verificationPayload))`
///
/// `keys` and `regions` are sorted by the caller's chosen order before
/// calling this function is NOT required — sorting happens here so callers
/// can pass keys/regions in publish order.
pub fn derive_android_nonce(
    app_package_name: &str,
    keys: &[NonceKey<'_>],
    regions: &[String],
    verification_payload: &str,
) -> String {
    let mut key_fields: Vec<String> = keys.iter().map(NonceKey::to_csv_field).collect();
    key_fields.sort();
    let keys_csv = key_fields.join(",");

    let mut upper_regions: Vec<String> = regions.iter().map(|r| r.to_uppercase()).collect();
    upper_regions.sort();
    let regions_csv = upper_regions.join(",");

    let cleartext = format!(
        "{app_package_name}|{keys_csv}|{regions_csv}|{verification_payload}"
    );
    let digest = Sha256::digest(cleartext.as_bytes());
    STANDARD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_is_deterministic_regardless_of_key_order() {
        let keys_a = vec![
            NonceKey { key_base64: "aaa", interval_number: 100, interval_count: 144, transmission_risk: 2 },
            NonceKey { key_base64: "bbb", interval_number: 244, interval_count: 144, transmission_risk: 2 },
        ];
        let keys_b = vec![
            NonceKey { key_base64: "bbb", interval_number: 244, interval_count: 144, transmission_risk: 2 },
            NonceKey { key_base64: "aaa", interval_number: 100, interval_count: 144, transmission_risk: 2 },
        ];
        let regions = vec!["us".to_string(), "ca".to_string()];

        let nonce_a = derive_android_nonce("com.example.app", &keys_a, &regions, "payload");
        let nonce_b = derive_android_nonce("com.example.app", &keys_b, &regions, "payload");
        assert_eq!(nonce_a, nonce_b);
    }

    #[test]
    fn nonce_is_case_insensitive_on_region_input() {
        let keys = vec![NonceKey { key_base64: "aaa", interval_number: 1, interval_count: 144, transmission_risk: 0 }];
        let lower = derive_android_nonce("pkg", &keys, &["us".to_string()], "p");
        let upper = derive_android_nonce("pkg", &keys, &["US".to_string()], "p");
        assert_eq!(lower, upper);
    }
}
