use std::time::Duration;

use anyhow::Context as _;
use tekx_config::{FederationInConfig, PostgresConfig, Secrets};
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_env_config::FromEnv;
use tekx_federation_in::FederationInRunner;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        tracing::error!(%err, "federation-in runner exited with a fatal error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let postgres_config = PostgresConfig::from_env().context("loading PostgresConfig")?;
    let secrets = Secrets::from_env().context("loading Secrets")?;
    let federation_in_config = FederationInConfig::from_env().context("loading FederationInConfig")?;

    let mut pool_builder = ConnectionPool::<Core>::builder(secrets.database.master_url().expose().as_str(), postgres_config.max_connections);
    pool_builder
        .set_statement_timeout(postgres_config.statement_timeout)
        .set_acquire_timeout(postgres_config.acquire_timeout);
    let pool = pool_builder.build().await.context("connecting to Postgres")?;

    let tick = Duration::from_secs(env_u64("FEDERATION_IN_TICK_SECS", 300));
    let runner = FederationInRunner::new(pool, secrets.federation_in, federation_in_config, tick);

    let (stop_sender, stop_receiver) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received Ctrl-C, shutting down federation-in runner");
            let _ = stop_sender.send(true);
        }
    });

    runner.run(stop_receiver).await
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
