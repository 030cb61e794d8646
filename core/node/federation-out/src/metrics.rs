use vise::{Counter, EncodeLabelSet, EncodeLabelValue, Family, Metrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EncodeLabelValue, EncodeLabelSet)]
#[metrics(label = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    Success,
    Unauthorized,
    Transient,
}

#[derive(Debug, Metrics)]
#[metrics(prefix = "tekx_federation_out")]
pub struct FederationOutMetrics {
    pub fetch_requests: Family<FetchOutcome, Counter>,
    pub exposure_keys_served: Counter,
    pub partial_responses: Counter,
}

#[vise::register]
pub static METRICS: vise::Global<FederationOutMetrics> = vise::Global::new();
