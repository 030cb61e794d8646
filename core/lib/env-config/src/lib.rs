//! Loads `tekx_config` structs from prefixed environment variables: each
//! config has a private envy-deserializable shadow with plain
//! (string/u64) fields, converted into the public config type.

use anyhow::Context as _;
use serde::de::DeserializeOwned;

mod attestation;
mod cleanup;
mod export_batcher;
mod federation;
mod postgres;
mod publish;
mod secrets;

pub trait FromEnv: Sized {
    fn from_env() -> anyhow::Result<Self>;
}

/// Loads `T` from environment variables prefixed with `prefix`, e.g.
/// `envy_load("publish", "PUBLISH_")` reads `PUBLISH_MAX_KEYS` into a
/// `max_keys` field.
pub fn envy_load<T: DeserializeOwned>(name: &str, prefix: &str) -> anyhow::Result<T> {
    envy::prefixed(prefix)
        .from_env()
        .with_context(|| format!("cannot load config <{name}>"))
}
