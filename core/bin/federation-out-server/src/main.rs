use anyhow::Context as _;
use tekx_config::{FederationOutConfig, PostgresConfig, PublishConfig, Secrets};
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_env_config::FromEnv;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        tracing::error!(%err, "federation-out server exited with a fatal error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let postgres_config = PostgresConfig::from_env().context("loading PostgresConfig")?;
    let secrets = Secrets::from_env().context("loading Secrets")?;
    let federation_out_config = FederationOutConfig::from_env().context("loading FederationOutConfig")?;
    let publish_config = PublishConfig::from_env().context("loading PublishConfig")?;

    let mut pool_builder = ConnectionPool::<Core>::builder(secrets.database.master_url().expose().as_str(), postgres_config.max_connections);
    pool_builder
        .set_statement_timeout(postgres_config.statement_timeout)
        .set_acquire_timeout(postgres_config.acquire_timeout);
    let pool = pool_builder.build().await.context("connecting to Postgres")?;

    let publish_window = chrono::Duration::from_std(publish_config.publish_window).unwrap_or_else(|_| chrono::Duration::hours(1));

    let (stop_sender, stop_receiver) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received Ctrl-C, shutting down federation-out server");
            let _ = stop_sender.send(true);
        }
    });

    tekx_federation_out::run(pool, federation_out_config, publish_window, stop_receiver).await
}
