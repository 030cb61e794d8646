use std::str::FromStr;

use secrecy::Secret;
use serde::Deserialize;
use tekx_config::{DatabaseSecrets, FederationInSecrets, Secrets, SensitiveUrl};

use crate::{envy_load, FromEnv};

#[derive(Debug, Deserialize)]
struct DatabaseSecretsEnv {
    url: String,
    replica_url: Option<String>,
}

impl TryFrom<DatabaseSecretsEnv> for DatabaseSecrets {
    type Error = anyhow::Error;

    fn try_from(env: DatabaseSecretsEnv) -> Result<Self, Self::Error> {
        Ok(DatabaseSecrets {
            server_url: SensitiveUrl::from_str(&env.url)?,
            server_replica_url: env
                .replica_url
                .map(|url| SensitiveUrl::from_str(&url))
                .transpose()?,
        })
    }
}

impl FromEnv for DatabaseSecrets {
    fn from_env() -> anyhow::Result<Self> {
        envy_load::<DatabaseSecretsEnv>("database_secrets", "DATABASE_")?.try_into()
    }
}

/// One client-credentials identity is configured per deployment
/// (`FEDERATION_IN_OIDC_CLIENT_ID`/`_SECRET`), used against every
/// configured peer (§4.8). Both unset means this server pulls from no
/// peers.
#[derive(Debug, Deserialize)]
struct FederationInSecretsEnv {
    oidc_client_id: Option<String>,
    oidc_client_secret: Option<String>,
}

impl From<FederationInSecretsEnv> for Vec<FederationInSecrets> {
    fn from(env: FederationInSecretsEnv) -> Self {
        match (env.oidc_client_id, env.oidc_client_secret) {
            (Some(oidc_client_id), Some(oidc_client_secret)) => vec![FederationInSecrets {
                oidc_client_id,
                oidc_client_secret: Secret::new(oidc_client_secret),
            }],
            _ => Vec::new(),
        }
    }
}

impl FromEnv for Secrets {
    fn from_env() -> anyhow::Result<Self> {
        let federation_in = envy_load::<FederationInSecretsEnv>("federation_in_secrets", "FEDERATION_IN_")?.into();
        Ok(Secrets {
            database: DatabaseSecrets::from_env()?,
            federation_in,
        })
    }
}
