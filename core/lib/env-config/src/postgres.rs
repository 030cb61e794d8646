use std::time::Duration;

use serde::Deserialize;
use tekx_config::PostgresConfig;

use crate::{envy_load, FromEnv};

#[derive(Debug, Deserialize)]
struct PostgresConfigEnv {
    max_connections: u32,
    statement_timeout_secs: Option<u64>,
    acquire_timeout_secs: Option<u64>,
}

impl From<PostgresConfigEnv> for PostgresConfig {
    fn from(env: PostgresConfigEnv) -> Self {
        PostgresConfig {
            max_connections: env.max_connections,
            statement_timeout: env.statement_timeout_secs.map(Duration::from_secs),
            acquire_timeout: env.acquire_timeout_secs.map(Duration::from_secs),
        }
    }
}

impl FromEnv for PostgresConfig {
    fn from_env() -> anyhow::Result<Self> {
        envy_load::<PostgresConfigEnv>("postgres", "DATABASE_").map(Into::into)
    }
}
