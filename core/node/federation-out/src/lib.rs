//! Federation `Fetch` RPC server (C9, §4.7): serves contact-tracing
//! exposure keys to authorized peer servers over gRPC.

mod error;
mod grouping;
mod metrics;
mod oidc;
mod service;

use std::{sync::Arc, time::Duration};

use tekx_config::FederationOutConfig;
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_federation_proto::federation_server::FederationServer;
use tokio::sync::watch;
use tonic::transport::Server;

pub use oidc::{Claims, JwksTokenVerifier, OidcError};
pub use service::FederationOutService;

/// How long a fetched issuer's JWKS is trusted before being re-fetched.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Runs the federation-out gRPC server until `stop_receiver` signals
/// shutdown, following the same `run(stop_receiver)` shape as the other
/// node services in this workspace.
pub async fn run(
    pool: ConnectionPool<Core>,
    config: FederationOutConfig,
    publish_window: chrono::Duration,
    mut stop_receiver: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let addr = config.bind_addr.parse()?;
    let verifier = Arc::new(JwksTokenVerifier::new(JWKS_CACHE_TTL));
    let service = FederationOutService::new(pool, verifier, config, publish_window);

    tracing::info!(%addr, "starting federation-out server");
    Server::builder()
        .add_service(FederationServer::new(service))
        .serve_with_shutdown(addr, async move {
            let _ = stop_receiver.changed().await;
        })
        .await?;
    Ok(())
}
