use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A peer server this instance pulls exposures from. `last_timestamp`
/// advances only on non-empty syncs (§3 invariant e).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederationInQuery {
    pub query_id: String,
    pub server_addr: String,
    pub oidc_audience: String,
    /// Token endpoint this server exchanges its client credentials at to
    /// obtain a bearer token for this peer's `Fetch` RPC (§4.8, §6).
    pub oidc_token_endpoint: String,
    pub include_regions: Vec<String>,
    pub exclude_regions: Vec<String>,
    pub last_timestamp: DateTime<Utc>,
}

/// A single federation-in run against one [`FederationInQuery`]. Written
/// twice: once at start, once at finalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederationInSync {
    pub sync_id: i64,
    pub query_id: String,
    pub started: DateTime<Utc>,
    pub completed: Option<DateTime<Utc>>,
    pub insertions: i64,
    pub max_timestamp: Option<DateTime<Utc>>,
}

/// A peer server allowed to call this server's `Fetch` RPC, keyed by
/// `(oidc_issuer, oidc_subject)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederationOutAuthorization {
    pub oidc_issuer: String,
    pub oidc_subject: String,
    pub oidc_audience: Option<String>,
    pub note: String,
    pub include_regions: Vec<String>,
    pub exclude_regions: Vec<String>,
}
