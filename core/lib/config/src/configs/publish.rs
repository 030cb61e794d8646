use std::time::Duration;

/// Bounds enforced by the publish handler (C4, §4.3) and knobs for the
/// response-padding behavior that keeps a successful and a rejected publish
/// indistinguishable in wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishConfig {
    pub bind_addr: String,
    pub max_keys: u32,
    pub max_same_start_interval_keys: u32,
    pub max_interval_age: Duration,
    /// Window `TruncateWindow(now, publish_window)` rounds `createdAt` down
    /// to, so keys published together share a batch-aligned timestamp.
    pub publish_window: Duration,
    /// Target response latency; handled requests are padded up to this
    /// duration so client/server-side rejections look the same (§9).
    pub response_padding_min_latency: Duration,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            max_keys: 30,
            max_same_start_interval_keys: 3,
            max_interval_age: Duration::from_secs(15 * 24 * 60 * 60),
            publish_window: Duration::from_secs(60 * 60),
            response_padding_min_latency: Duration::from_millis(5000),
        }
    }
}
