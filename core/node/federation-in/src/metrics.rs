use vise::{Counter, Metrics};

#[derive(Debug, Metrics)]
#[metrics(prefix = "tekx_federation_in")]
pub struct FederationInMetrics {
    /// `FederationInSync` runs started.
    pub syncs_started: Counter,
    /// `FederationInSync` runs that failed before completing.
    pub syncs_failed: Counter,
    /// Exposure rows inserted across every peer sync.
    pub exposures_inserted: Counter,
    /// `Fetch` RPC calls made, across all pages of all queries.
    pub fetch_calls: Counter,
}

#[vise::register]
pub static METRICS: vise::Global<FederationInMetrics> = vise::Global::new();
