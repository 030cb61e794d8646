use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tekx_types::{FederationInQuery, FederationInSync, FederationOutAuthorization};

#[derive(Debug, Clone, FromRow)]
pub struct StorageFederationInQuery {
    pub query_id: String,
    pub server_addr: String,
    pub oidc_audience: String,
    pub oidc_token_endpoint: String,
    pub include_regions: Vec<String>,
    pub exclude_regions: Vec<String>,
    pub last_timestamp: DateTime<Utc>,
}

impl From<StorageFederationInQuery> for FederationInQuery {
    fn from(row: StorageFederationInQuery) -> Self {
        FederationInQuery {
            query_id: row.query_id,
            server_addr: row.server_addr,
            oidc_audience: row.oidc_audience,
            oidc_token_endpoint: row.oidc_token_endpoint,
            include_regions: row.include_regions,
            exclude_regions: row.exclude_regions,
            last_timestamp: row.last_timestamp,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StorageFederationInSync {
    pub sync_id: i64,
    pub query_id: String,
    pub started: DateTime<Utc>,
    pub completed: Option<DateTime<Utc>>,
    pub insertions: i64,
    pub max_timestamp: Option<DateTime<Utc>>,
}

impl From<StorageFederationInSync> for FederationInSync {
    fn from(row: StorageFederationInSync) -> Self {
        FederationInSync {
            sync_id: row.sync_id,
            query_id: row.query_id,
            started: row.started,
            completed: row.completed,
            insertions: row.insertions,
            max_timestamp: row.max_timestamp,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StorageFederationOutAuthorization {
    pub oidc_issuer: String,
    pub oidc_subject: String,
    pub oidc_audience: Option<String>,
    pub note: String,
    pub include_regions: Vec<String>,
    pub exclude_regions: Vec<String>,
}

impl From<StorageFederationOutAuthorization> for FederationOutAuthorization {
    fn from(row: StorageFederationOutAuthorization) -> Self {
        FederationOutAuthorization {
            oidc_issuer: row.oidc_issuer,
            oidc_subject: row.oidc_subject,
            oidc_audience: row.oidc_audience,
            note: row.note,
            include_regions: row.include_regions,
            exclude_regions: row.exclude_regions,
        }
    }
}
