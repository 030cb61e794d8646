use std::{collections::HashMap, sync::Arc, time::Duration};

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum OidcError {
    #[error("malformed bearer token")]
    MalformedToken,
    #[error("unknown signing key id {0:?}")]
    UnknownKeyId(String),
    #[error("token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("failed to fetch OIDC discovery document: {0}")]
    Discovery(#[source] reqwest::Error),
    #[error("failed to fetch JWKS: {0}")]
    Jwks(#[source] reqwest::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
}

#[derive(Deserialize)]
struct DiscoveryDocument {
    jwks_uri: String,
}

#[derive(Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

struct CachedKeys {
    by_kid: HashMap<String, DecodingKey>,
    fetched_at: std::time::Instant,
}

/// Verifies a peer's OIDC bearer token against its issuer's published JWKS
/// (§4.7). Keys are cached per issuer for `key_cache_ttl` so a `Fetch` call
/// does not round-trip to the issuer on every request.
pub struct JwksTokenVerifier {
    client: reqwest::Client,
    key_cache_ttl: Duration,
    cache: RwLock<HashMap<String, Arc<CachedKeys>>>,
}

/// Reads the `iss` claim without verifying the signature, so the caller
/// knows which issuer's JWKS to fetch before doing the real verification.
pub fn peek_issuer(token: &str) -> Result<String, OidcError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    let placeholder_key = DecodingKey::from_secret(&[]);
    let data = decode::<Claims>(token, &placeholder_key, &validation)?;
    Ok(data.claims.iss)
}

impl JwksTokenVerifier {
    pub fn new(key_cache_ttl: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            key_cache_ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Validates `token` was issued by `expected_issuer` and, if
    /// `expected_audience` is set, that its audience matches. Returns the
    /// token's `(iss, sub, aud)` for authorization lookup.
    pub async fn verify(&self, expected_issuer: &str, expected_audience: Option<&str>, token: &str) -> Result<Claims, OidcError> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or(OidcError::MalformedToken)?;

        let keys = self.keys_for_issuer(expected_issuer).await?;
        let key = keys.by_kid.get(&kid).ok_or_else(|| OidcError::UnknownKeyId(kid.clone()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[expected_issuer]);
        if let Some(audience) = expected_audience {
            validation.set_audience(&[audience]);
        } else {
            validation.validate_aud = false;
        }

        let data = decode::<Claims>(token, key, &validation)?;
        Ok(data.claims)
    }

    async fn keys_for_issuer(&self, issuer: &str) -> Result<Arc<CachedKeys>, OidcError> {
        if let Some(cached) = self.cache.read().await.get(issuer) {
            if cached.fetched_at.elapsed() < self.key_cache_ttl {
                return Ok(cached.clone());
            }
        }

        let fetched = self.fetch_keys(issuer).await?;
        let fetched = Arc::new(fetched);
        self.cache.write().await.insert(issuer.to_string(), fetched.clone());
        Ok(fetched)
    }

    async fn fetch_keys(&self, issuer: &str) -> Result<CachedKeys, OidcError> {
        let discovery_url = format!("{}/.well-known/openid-configuration", issuer.trim_end_matches('/'));
        let discovery: DiscoveryDocument = self
            .client
            .get(&discovery_url)
            .send()
            .await
            .map_err(OidcError::Discovery)?
            .json()
            .await
            .map_err(OidcError::Discovery)?;

        let jwks: JwkSet = self
            .client
            .get(&discovery.jwks_uri)
            .send()
            .await
            .map_err(OidcError::Jwks)?
            .json()
            .await
            .map_err(OidcError::Jwks)?;

        let mut by_kid = HashMap::with_capacity(jwks.keys.len());
        for jwk in jwks.keys {
            if let Ok(key) = DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                by_kid.insert(jwk.kid, key);
            }
        }

        Ok(CachedKeys {
            by_kid,
            fetched_at: std::time::Instant::now(),
        })
    }
}
