use std::time::Duration;

use serde::Deserialize;
use tekx_config::PublishConfig;

use crate::{envy_load, FromEnv};

#[derive(Debug, Deserialize)]
struct PublishConfigEnv {
    #[serde(default = "default_bind_addr")]
    bind_addr: String,
    max_keys: u32,
    max_same_start_interval_keys: u32,
    max_interval_age_secs: u64,
    publish_window_secs: u64,
    response_padding_min_latency_ms: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl From<PublishConfigEnv> for PublishConfig {
    fn from(env: PublishConfigEnv) -> Self {
        PublishConfig {
            bind_addr: env.bind_addr,
            max_keys: env.max_keys,
            max_same_start_interval_keys: env.max_same_start_interval_keys,
            max_interval_age: Duration::from_secs(env.max_interval_age_secs),
            publish_window: Duration::from_secs(env.publish_window_secs),
            response_padding_min_latency: Duration::from_millis(env.response_padding_min_latency_ms),
        }
    }
}

impl FromEnv for PublishConfig {
    fn from_env() -> anyhow::Result<Self> {
        envy_load::<PublishConfigEnv>("publish", "PUBLISH_").map(Into::into)
    }
}
