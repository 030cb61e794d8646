use anyhow::Context as _;
use tekx_config::{AttestationConfig, PostgresConfig, PublishConfig, Secrets};
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_env_config::FromEnv;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        tracing::error!(%err, "publish server exited with a fatal error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let postgres_config = PostgresConfig::from_env().context("loading PostgresConfig")?;
    let secrets = Secrets::from_env().context("loading Secrets")?;
    let publish_config = PublishConfig::from_env().context("loading PublishConfig")?;
    let attestation_config = AttestationConfig::from_env().context("loading AttestationConfig")?;

    let mut pool_builder = ConnectionPool::<Core>::builder(secrets.database.master_url().expose().as_str(), postgres_config.max_connections);
    pool_builder
        .set_statement_timeout(postgres_config.statement_timeout)
        .set_acquire_timeout(postgres_config.acquire_timeout);
    let pool = pool_builder.build().await.context("connecting to Postgres")?;

    let (stop_sender, stop_receiver) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received Ctrl-C, shutting down publish server");
            let _ = stop_sender.send(true);
        }
    });

    tekx_publish::run(pool, publish_config, attestation_config, stop_receiver).await
}
