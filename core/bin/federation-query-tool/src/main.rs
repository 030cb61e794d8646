use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::Parser;
use tekx_config::{PostgresConfig, Secrets};
use tekx_dal::CoreDal;
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_env_config::FromEnv;
use tekx_types::FederationInQuery;

/// Registers or updates a federation-in query row (§6).
#[derive(Debug, Parser)]
#[command(version, about = "Federation-in query registration tool")]
struct Cli {
    /// Unique identifier for this peer query. Must match `^[a-z][a-z0-9-_]*[a-z0-9]$`.
    #[arg(long, value_parser = parse_query_id)]
    query_id: String,

    /// Peer federation-out address, e.g. `peer.example.com:443`. Must match
    /// `^[a-z0-9.-]+(:\d+)?$`.
    #[arg(long, value_parser = parse_server_addr)]
    server_addr: String,

    /// OIDC audience this server presents itself as when calling the peer.
    #[arg(long)]
    oidc_audience: String,

    /// OAuth2 token endpoint used to obtain a bearer token for the peer.
    #[arg(long)]
    oidc_token_endpoint: String,

    /// Starting cursor, RFC3339. Defaults to the Unix epoch.
    #[arg(long)]
    last_timestamp: Option<DateTime<Utc>>,

    /// Comma-separated regions to include (empty means no restriction).
    #[arg(long, value_delimiter = ',')]
    regions: Vec<String>,

    /// Comma-separated regions to exclude.
    #[arg(long = "exclude-regions", value_delimiter = ',')]
    exclude_regions: Vec<String>,
}

fn parse_query_id(s: &str) -> Result<String, String> {
    let valid = {
        let mut chars = s.chars();
        let first_ok = chars.next().is_some_and(|c| c.is_ascii_lowercase());
        let last_ok = s.chars().next_back().is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        let body_ok = s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        first_ok && last_ok && body_ok && s.len() >= 2
    };
    if valid {
        Ok(s.to_string())
    } else {
        Err(format!("{s:?} does not match ^[a-z][a-z0-9-_]*[a-z0-9]$"))
    }
}

fn parse_server_addr(s: &str) -> Result<String, String> {
    let (host, port) = match s.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (s, None),
    };
    let host_ok = !host.is_empty() && host.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-');
    let port_ok = match port {
        Some(port) => !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()),
        None => true,
    };
    if host_ok && port_ok {
        Ok(s.to_string())
    } else {
        Err(format!("{s:?} does not match ^[a-z0-9.-]+(:\\d+)?$"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        tracing::error!(%err, "federation-query-tool failed");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let postgres_config = PostgresConfig::from_env().context("loading PostgresConfig")?;
    let secrets = Secrets::from_env().context("loading Secrets")?;

    let mut pool_builder = ConnectionPool::<Core>::builder(secrets.database.master_url().expose().as_str(), postgres_config.max_connections);
    pool_builder
        .set_statement_timeout(postgres_config.statement_timeout)
        .set_acquire_timeout(postgres_config.acquire_timeout);
    let pool = pool_builder.build().await.context("connecting to Postgres")?;

    let query = FederationInQuery {
        query_id: cli.query_id,
        server_addr: cli.server_addr,
        oidc_audience: cli.oidc_audience,
        oidc_token_endpoint: cli.oidc_token_endpoint,
        include_regions: cli.regions,
        exclude_regions: cli.exclude_regions,
        last_timestamp: cli.last_timestamp.unwrap_or(DateTime::UNIX_EPOCH),
    };

    let mut conn = pool.connection_tagged("federation_query_tool").await?;
    conn.federation_in_dal().upsert_query(&query).await?;

    println!(
        "{}",
        serde_json::json!({
            "query_id": query.query_id,
            "server_addr": query.server_addr,
            "regions": query.include_regions,
        })
    );
    Ok(())
}
