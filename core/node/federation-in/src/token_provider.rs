use secrecy::ExposeSecret;
use serde::Deserialize;
use tekx_config::FederationInSecrets;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("no client credentials configured for federation-in")]
    NoCredentialsConfigured,
    #[error("token endpoint request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Obtains bearer tokens for this server's outbound `Fetch` calls via the
/// OAuth2 client-credentials grant (§4.8, §6). One identity is configured
/// per deployment and used against every peer.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self, token_endpoint: &str, audience: &str) -> Result<String, TokenError>;
}

pub struct ClientCredentialsTokenProvider {
    client: reqwest::Client,
    credentials: Option<FederationInSecrets>,
}

impl ClientCredentialsTokenProvider {
    pub fn new(credentials: Vec<FederationInSecrets>) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials: credentials.into_iter().next(),
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for ClientCredentialsTokenProvider {
    async fn token(&self, token_endpoint: &str, audience: &str) -> Result<String, TokenError> {
        let credentials = self.credentials.as_ref().ok_or(TokenError::NoCredentialsConfigured)?;

        let response: TokenResponse = self
            .client
            .post(token_endpoint)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.oidc_client_id.as_str()),
                ("client_secret", credentials.oidc_client_secret.expose_secret().as_str()),
                ("audience", audience),
            ])
            .send()
            .await?
            .json()
            .await?;
        Ok(response.access_token)
    }
}
