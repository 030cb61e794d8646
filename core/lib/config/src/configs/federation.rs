use std::time::Duration;

/// Knobs for the federation-in runner (C10, §4.8): how many exposures to
/// request per peer `Fetch` call and how long to wait for a response.
#[derive(Debug, Clone, PartialEq)]
pub struct FederationInConfig {
    pub max_records_per_fetch: u32,
    pub fetch_timeout: Duration,
    /// Exposures are inserted in chunks no larger than this (§4.8).
    pub insert_chunk_size: usize,
}

impl Default for FederationInConfig {
    fn default() -> Self {
        Self {
            max_records_per_fetch: 500,
            fetch_timeout: Duration::from_secs(30),
            insert_chunk_size: 500,
        }
    }
}

/// Knobs for the federation-out RPC server (C9, §4.7).
#[derive(Debug, Clone, PartialEq)]
pub struct FederationOutConfig {
    pub bind_addr: String,
    /// Whether bearer-token authentication is required (§4.7: "unless
    /// explicitly disabled").
    pub require_authentication: bool,
    pub max_records_per_response: u32,
}

impl Default for FederationOutConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8081".to_string(),
            require_authentication: true,
            max_records_per_response: 500,
        }
    }
}
