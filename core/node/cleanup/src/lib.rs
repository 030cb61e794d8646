//! Retention sweep (§4.9): periodically deletes exposures and export files
//! that have aged past the configured TTL.

mod error;
mod metrics;
mod sweep;

use std::time::Duration as StdDuration;

use tekx_config::CleanupConfig;
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_object_store::BucketStore;
use tokio::sync::watch;

pub use error::CleanupError;

pub struct CleanupRunner {
    pool: ConnectionPool<Core>,
    store: BucketStore,
    config: CleanupConfig,
    tick: StdDuration,
}

impl CleanupRunner {
    pub fn new(pool: ConnectionPool<Core>, store: BucketStore, config: CleanupConfig, tick: StdDuration) -> Self {
        Self { pool, store, config, tick }
    }

    pub async fn run(self, mut stop_receiver: watch::Receiver<bool>) -> anyhow::Result<()> {
        let mut timer = tokio::time::interval(self.tick);

        while !*stop_receiver.borrow_and_update() {
            tokio::select! {
                _ = timer.tick() => {
                    let ttl = chrono::Duration::from_std(self.config.effective_ttl()).unwrap_or_else(|_| chrono::Duration::hours(240));
                    let cutoff = chrono::Utc::now() - ttl;
                    if let Err(err) = sweep::run_once(&self.pool, &self.store, cutoff).await {
                        tracing::error!(%err, "cleanup sweep failed");
                        metrics::METRICS.runs_failed.inc();
                    }
                }
                _ = stop_receiver.changed() => break,
            }
        }

        tracing::info!("cleanup shutting down");
        Ok(())
    }
}
