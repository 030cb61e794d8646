use std::time::Duration;

use anyhow::Context as _;
use tekx_cleanup::CleanupRunner;
use tekx_config::{CleanupConfig, PostgresConfig, Secrets};
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_env_config::FromEnv;
use tekx_object_store::BucketStore;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        tracing::error!(%err, "cleanup runner exited with a fatal error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let postgres_config = PostgresConfig::from_env().context("loading PostgresConfig")?;
    let secrets = Secrets::from_env().context("loading Secrets")?;
    let cleanup_config = CleanupConfig::from_env().context("loading CleanupConfig")?;

    let mut pool_builder = ConnectionPool::<Core>::builder(secrets.database.master_url().expose().as_str(), postgres_config.max_connections);
    pool_builder
        .set_statement_timeout(postgres_config.statement_timeout)
        .set_acquire_timeout(postgres_config.acquire_timeout);
    let pool = pool_builder.build().await.context("connecting to Postgres")?;

    let store = match std::env::var("CLEANUP_BUCKET_DIR") {
        Ok(dir) => BucketStore::local(std::path::Path::new(&dir)).context("opening local bucket directory")?,
        Err(_) => BucketStore::in_memory(),
    };

    let tick = Duration::from_secs(env_u64("CLEANUP_TICK_SECS", 3600));
    let runner = CleanupRunner::new(pool, store, cleanup_config, tick);

    let (stop_sender, stop_receiver) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received Ctrl-C, shutting down cleanup runner");
            let _ = stop_sender.send(true);
        }
    });

    runner.run(stop_receiver).await
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
