//! Export-config scheduler (C6, §4.4) and leased batch worker (C7/C8,
//! §4.5–§4.6): tiles export batches from active `ExportConfig`s and turns
//! leased batches into uploaded, signed export files.

mod error;
mod metrics;
mod scheduler;
mod worker;

use std::{sync::Arc, time::Duration as StdDuration};

use chrono::Duration;
use tekx_config::ExportBatcherConfig;
use tekx_crypto::Signer;
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_locking::NamedLockService;
use tekx_object_store::BucketStore;
use tokio::sync::watch;

pub use error::WorkerError;
pub use scheduler::make_batch_ranges;

/// Runs the scheduler and batch-worker loops for one process (§4.4/§4.5).
/// Both loops share the same `stop_receiver` and exit together on shutdown.
pub struct ExportBatcherRunner {
    pool: ConnectionPool<Core>,
    locks: NamedLockService,
    store: BucketStore,
    signer: Arc<dyn Signer>,
    config: ExportBatcherConfig,
    publish_window: Duration,
    scheduler_tick: StdDuration,
    worker_tick: StdDuration,
}

impl ExportBatcherRunner {
    pub fn new(
        pool: ConnectionPool<Core>,
        store: BucketStore,
        signer: Arc<dyn Signer>,
        config: ExportBatcherConfig,
        publish_window: Duration,
        scheduler_tick: StdDuration,
        worker_tick: StdDuration,
    ) -> Self {
        let locks = NamedLockService::new(pool.clone());
        Self {
            pool,
            locks,
            store,
            signer,
            config,
            publish_window,
            scheduler_tick,
            worker_tick,
        }
    }

    pub async fn run(self, mut stop_receiver: watch::Receiver<bool>) -> anyhow::Result<()> {
        let mut scheduler_timer = tokio::time::interval(self.scheduler_tick);
        let mut worker_timer = tokio::time::interval(self.worker_tick);

        while !*stop_receiver.borrow_and_update() {
            tokio::select! {
                _ = scheduler_timer.tick() => {
                    let now = chrono::Utc::now();
                    if let Err(err) = scheduler::run_once(&self.pool, &self.locks, &self.config, self.publish_window, now).await {
                        tracing::error!(%err, "export scheduler tick failed");
                    }
                }
                _ = worker_timer.tick() => {
                    let now = chrono::Utc::now();
                    match worker::run_once(&self.pool, &self.locks, &self.store, self.signer.as_ref(), &self.config, now).await {
                        Ok(Some(batch_id)) => tracing::info!(batch_id, "export batch finalized"),
                        Ok(None) => { /* nothing claimable this tick */ }
                        Err(err) => tracing::error!(%err, "export batch worker failed"),
                    }
                }
                _ = stop_receiver.changed() => break,
            }
        }

        tracing::info!("export batcher shutting down");
        Ok(())
    }
}
