use vise::{Counter, EncodeLabelSet, EncodeLabelValue, Family, Metrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EncodeLabelValue, EncodeLabelSet)]
#[metrics(label = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    Success,
    InvalidInput,
    Unauthorized,
    Transient,
}

#[derive(Debug, Metrics)]
#[metrics(prefix = "tekx_publish")]
pub struct PublishMetrics {
    /// Publish requests handled, labeled by outcome. `invalid_input` and
    /// `unauthorized` still return 200 (§7); this is the only place that
    /// distinguishes them from a true success.
    pub requests: Family<PublishOutcome, Counter>,
    /// Exposure rows inserted (post-dedup).
    pub exposures_inserted: Counter,
    /// Exposure rows silently skipped due to `exposureKey` conflict.
    pub exposures_deduped: Counter,
}

#[vise::register]
pub static METRICS: vise::Global<PublishMetrics> = vise::Global::new();
