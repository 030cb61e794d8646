use std::time::Duration;

use serde::Deserialize;
use tekx_config::{FederationInConfig, FederationOutConfig};

use crate::{envy_load, FromEnv};

#[derive(Debug, Deserialize)]
struct FederationInConfigEnv {
    max_records_per_fetch: u32,
    fetch_timeout_secs: u64,
    insert_chunk_size: usize,
}

impl From<FederationInConfigEnv> for FederationInConfig {
    fn from(env: FederationInConfigEnv) -> Self {
        FederationInConfig {
            max_records_per_fetch: env.max_records_per_fetch,
            fetch_timeout: Duration::from_secs(env.fetch_timeout_secs),
            insert_chunk_size: env.insert_chunk_size,
        }
    }
}

impl FromEnv for FederationInConfig {
    fn from_env() -> anyhow::Result<Self> {
        envy_load::<FederationInConfigEnv>("federation_in", "FEDERATION_IN_").map(Into::into)
    }
}

#[derive(Debug, Deserialize)]
struct FederationOutConfigEnv {
    bind_addr: String,
    require_authentication: bool,
    max_records_per_response: u32,
}

impl From<FederationOutConfigEnv> for FederationOutConfig {
    fn from(env: FederationOutConfigEnv) -> Self {
        FederationOutConfig {
            bind_addr: env.bind_addr,
            require_authentication: env.require_authentication,
            max_records_per_response: env.max_records_per_response,
        }
    }
}

impl FromEnv for FederationOutConfig {
    fn from_env() -> anyhow::Result<Self> {
        envy_load::<FederationOutConfigEnv>("federation_out", "FEDERATION_OUT_").map(Into::into)
    }
}
