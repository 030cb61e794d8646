use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use tekx_config::{ExportBatcherConfig, PostgresConfig, PublishConfig, Secrets};
use tekx_crypto::{EcdsaP256Signer, Signer};
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_env_config::FromEnv;
use tekx_export_batcher::ExportBatcherRunner;
use tekx_object_store::BucketStore;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        tracing::error!(%err, "export batcher exited with a fatal error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let postgres_config = PostgresConfig::from_env().context("loading PostgresConfig")?;
    let secrets = Secrets::from_env().context("loading Secrets")?;
    let batcher_config = ExportBatcherConfig::from_env().context("loading ExportBatcherConfig")?;
    let publish_config = PublishConfig::from_env().context("loading PublishConfig")?;

    let mut pool_builder = ConnectionPool::<Core>::builder(secrets.database.master_url().expose().as_str(), postgres_config.max_connections);
    pool_builder
        .set_statement_timeout(postgres_config.statement_timeout)
        .set_acquire_timeout(postgres_config.acquire_timeout);
    let pool = pool_builder.build().await.context("connecting to Postgres")?;

    let store = match std::env::var("EXPORT_BATCHER_BUCKET_DIR") {
        Ok(dir) => BucketStore::local(std::path::Path::new(&dir)).context("opening local bucket directory")?,
        Err(_) => BucketStore::in_memory(),
    };

    let signer = build_signer().context("loading signing key")?;

    let scheduler_tick = Duration::from_secs(env_u64("EXPORT_BATCHER_SCHEDULER_TICK_SECS", 60));
    let worker_tick = Duration::from_secs(env_u64("EXPORT_BATCHER_WORKER_TICK_SECS", 30));
    let publish_window = chrono::Duration::from_std(publish_config.publish_window).unwrap_or_else(|_| chrono::Duration::hours(1));

    let runner = ExportBatcherRunner::new(pool, store, signer, batcher_config, publish_window, scheduler_tick, worker_tick);

    let (stop_sender, stop_receiver) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received Ctrl-C, shutting down export batcher");
            let _ = stop_sender.send(true);
        }
    });

    runner.run(stop_receiver).await
}

fn build_signer() -> anyhow::Result<Arc<dyn Signer>> {
    let signing_key_id = std::env::var("EXPORT_BATCHER_SIGNING_KEY_ID").context("EXPORT_BATCHER_SIGNING_KEY_ID must be set")?;
    let pem_path = std::env::var("EXPORT_BATCHER_SIGNING_KEY_PEM_PATH").context("EXPORT_BATCHER_SIGNING_KEY_PEM_PATH must be set")?;
    let pem = std::fs::read_to_string(&pem_path).with_context(|| format!("reading signing key PEM at {pem_path}"))?;
    let signer = EcdsaP256Signer::from_pem(signing_key_id, &pem).context("parsing signing key PEM")?;
    Ok(Arc::new(signer))
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
