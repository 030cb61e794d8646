use std::time::Duration;

use serde::Deserialize;
use tekx_config::AttestationConfig;

use crate::{envy_load, FromEnv};

#[derive(Debug, Deserialize)]
struct AttestationConfigEnv {
    min_valid_time_skew_secs: u64,
    max_valid_time_skew_secs: u64,
    safetynet_hostname: String,
}

impl From<AttestationConfigEnv> for AttestationConfig {
    fn from(env: AttestationConfigEnv) -> Self {
        AttestationConfig {
            min_valid_time_skew: Duration::from_secs(env.min_valid_time_skew_secs),
            max_valid_time_skew: Duration::from_secs(env.max_valid_time_skew_secs),
            safetynet_hostname: env.safetynet_hostname,
        }
    }
}

impl FromEnv for AttestationConfig {
    fn from_env() -> anyhow::Result<Self> {
        envy_load::<AttestationConfigEnv>("attestation", "ATTESTATION_").map(Into::into)
    }
}
