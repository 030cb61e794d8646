use std::time::Duration;

use serde::Deserialize;
use tekx_config::CleanupConfig;

use crate::{envy_load, FromEnv};

/// `ttl` is in hours, matching the `CLEANUP_TTL` environment variable
/// (default 336, minimum 240 — enforced by [`CleanupConfig::effective_ttl`]).
#[derive(Debug, Deserialize)]
struct CleanupConfigEnv {
    #[serde(default = "default_ttl_hours")]
    ttl: u64,
}

fn default_ttl_hours() -> u64 {
    CleanupConfig::DEFAULT_TTL.as_secs() / 3600
}

impl From<CleanupConfigEnv> for CleanupConfig {
    fn from(env: CleanupConfigEnv) -> Self {
        CleanupConfig {
            ttl: Duration::from_secs(env.ttl * 3600),
        }
    }
}

impl FromEnv for CleanupConfig {
    fn from_env() -> anyhow::Result<Self> {
        envy_load::<CleanupConfigEnv>("cleanup", "CLEANUP_").map(Into::into)
    }
}
