use std::collections::BTreeMap;

use tekx_federation_proto::{ContactTracingInfo, ContactTracingResponse, ExposureKey as PbExposureKey};
use tekx_types::Exposure;

/// `transmissionRisk` considered "unknown" and therefore excluded (§4.7),
/// mirroring the Android Exposure Notification API's `RISK_LEVEL_UNKNOWN`.
const TRANSMISSION_RISK_UNKNOWN: i16 = 0;

/// Accumulates exposures into the response shape §4.7 describes: grouped
/// first by sorted region tuple, then within a region group by
/// `(transmissionRisk, verificationAuthorityName)`. Iteration order is a
/// `BTreeMap`, so the resulting groups are always in the same order for
/// the same input set.
#[derive(Default)]
pub struct Accumulator {
    groups: BTreeMap<Vec<String>, BTreeMap<(i16, String), Vec<PbExposureKey>>>,
    max_created_at_unix: i64,
    accepted: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters and records one exposure (§4.7). Returns whether it was
    /// accepted, purely for caller-side counting against a response cap.
    pub fn accept(&mut self, exposure: &Exposure, include_regions: &[String], exclude_regions: &[String]) -> bool {
        if exposure.regions.is_empty() {
            return false;
        }
        if !exposure.local_provenance {
            return false;
        }
        if exposure.transmission_risk == TRANSMISSION_RISK_UNKNOWN {
            return false;
        }
        if !exclude_regions.is_empty() && exposure.regions.iter().all(|r| exclude_regions.contains(r)) {
            return false;
        }
        if !include_regions.is_empty() && !exposure.regions.iter().any(|r| include_regions.contains(r)) {
            return false;
        }

        self.max_created_at_unix = self.max_created_at_unix.max(exposure.created_at.timestamp());

        let mut region_tuple = exposure.regions.clone();
        region_tuple.sort();
        let key = (exposure.transmission_risk, exposure.verification_authority_name.clone());
        self.groups
            .entry(region_tuple)
            .or_default()
            .entry(key)
            .or_default()
            .push(PbExposureKey {
                exposure_key: exposure.exposure_key.to_vec(),
                interval_number: exposure.interval_number,
                interval_count: exposure.interval_count,
            });
        self.accepted += 1;
        true
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted
    }

    pub fn max_created_at_unix(&self) -> i64 {
        self.max_created_at_unix
    }

    pub fn into_responses(self) -> Vec<ContactTracingResponse> {
        self.groups
            .into_iter()
            .map(|(region_identifiers, by_risk)| ContactTracingResponse {
                region_identifiers,
                contact_tracing_info: by_risk
                    .into_iter()
                    .map(|((transmission_risk, verification_authority_name), exposure_keys)| ContactTracingInfo {
                        transmission_risk: transmission_risk as i32,
                        verification_authority_name,
                        exposure_keys,
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn exposure(regions: &[&str], risk: i16, authority: &str) -> Exposure {
        Exposure {
            exposure_key: [1u8; 16],
            transmission_risk: risk,
            app_package_name: "com.example".to_string(),
            regions: regions.iter().map(|s| s.to_string()).collect(),
            interval_number: 10,
            interval_count: 144,
            created_at: Utc::now(),
            local_provenance: true,
            verification_authority_name: authority.to_string(),
            federation_sync_id: None,
        }
    }

    #[test]
    fn unknown_risk_is_excluded() {
        let mut acc = Accumulator::new();
        assert!(!acc.accept(&exposure(&["US"], 0, "authority"), &[], &[]));
    }

    #[test]
    fn fully_excluded_region_is_dropped() {
        let mut acc = Accumulator::new();
        assert!(!acc.accept(&exposure(&["US"], 2, "authority"), &[], &["US".to_string()]));
    }

    #[test]
    fn include_filter_requires_overlap() {
        let mut acc = Accumulator::new();
        assert!(!acc.accept(&exposure(&["US"], 2, "authority"), &["CA".to_string()], &[]));
        assert!(acc.accept(&exposure(&["US", "CA"], 2, "authority"), &["CA".to_string()], &[]));
    }

    #[test]
    fn groups_by_region_tuple_then_risk_and_authority() {
        let mut acc = Accumulator::new();
        acc.accept(&exposure(&["US", "CA"], 2, "health-authority-a"), &[], &[]);
        acc.accept(&exposure(&["CA", "US"], 2, "health-authority-a"), &[], &[]);
        acc.accept(&exposure(&["US", "CA"], 5, "health-authority-b"), &[], &[]);

        let responses = acc.into_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].region_identifiers, vec!["CA".to_string(), "US".to_string()]);
        assert_eq!(responses[0].contact_tracing_info.len(), 2);
        assert_eq!(responses[0].contact_tracing_info[0].exposure_keys.len(), 2);
    }
}
