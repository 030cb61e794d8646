use std::fmt;

use secrecy::{ExposeSecret, Secret};
use url::Url;

/// A URL that redacts its userinfo component in `Debug`/`Display` output, so
/// a connection string with embedded credentials never lands in a log line
/// verbatim.
#[derive(Clone, PartialEq)]
pub struct SensitiveUrl(Url);

impl SensitiveUrl {
    pub fn expose(&self) -> &Url {
        &self.0
    }
}

impl From<Url> for SensitiveUrl {
    fn from(url: Url) -> Self {
        SensitiveUrl(url)
    }
}

impl std::str::FromStr for SensitiveUrl {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<Url>()?.into())
    }
}

impl fmt::Debug for SensitiveUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://***@{}", self.0.scheme(), self.0.host_str().unwrap_or("?"))
    }
}

/// Database connection strings for the server's single Postgres instance.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSecrets {
    pub server_url: SensitiveUrl,
    pub server_replica_url: Option<SensitiveUrl>,
}

impl DatabaseSecrets {
    pub fn master_url(&self) -> &SensitiveUrl {
        &self.server_url
    }

    pub fn replica_url(&self) -> &SensitiveUrl {
        self.server_replica_url.as_ref().unwrap_or(&self.server_url)
    }
}

/// Credentials federation-in uses to authenticate to peer servers' `Fetch`
/// RPC (§4.8): an OIDC client secret exchanged for a bearer token per peer.
#[derive(Debug, Clone)]
pub struct FederationInSecrets {
    pub oidc_client_id: String,
    pub oidc_client_secret: Secret<String>,
}

impl PartialEq for FederationInSecrets {
    fn eq(&self, other: &Self) -> bool {
        self.oidc_client_id == other.oidc_client_id
            && self.oidc_client_secret.expose_secret() == other.oidc_client_secret.expose_secret()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Secrets {
    pub database: DatabaseSecrets,
    pub federation_in: Vec<FederationInSecrets>,
}
