//! Publish intake (C4 + C5, §4.2–§4.3): validates an inbound
//! `POST /` body, verifies device attestation, and writes immutable
//! `Exposure` rows. The only non-200 response is a true server-side
//! failure (§7, §9).

mod app_cache;
mod error;
mod handler;
mod metrics;
mod request;
mod transform;
mod validate;

use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use tekx_config::{AttestationConfig, PublishConfig};
use tekx_db_connection::{connection::Core, ConnectionPool};
use tokio::sync::watch;

pub use app_cache::AuthorizedAppCache;
pub use error::PublishError;

/// Maximum accepted request body; larger bodies are rejected with 413
/// before JSON decoding even starts (§6).
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Authorized-app cache TTL floor (§5: "TTL ≥ 5 minutes").
const AUTHORIZED_APP_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

pub struct PublishState {
    pool: ConnectionPool<Core>,
    config: PublishConfig,
    attestation_config: AttestationConfig,
    app_cache: Arc<AuthorizedAppCache>,
}

impl PublishState {
    pub fn new(pool: ConnectionPool<Core>, config: PublishConfig, attestation_config: AttestationConfig) -> Arc<Self> {
        let app_cache = AuthorizedAppCache::new(pool.clone(), AUTHORIZED_APP_CACHE_TTL);
        Arc::new(Self {
            pool,
            config,
            attestation_config,
            app_cache,
        })
    }
}

pub fn router(state: Arc<PublishState>) -> Router {
    Router::new()
        .route("/", post(handler::publish))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Binds and serves the publish intake HTTP API until `stop_receiver` fires.
pub async fn run(
    pool: ConnectionPool<Core>,
    config: PublishConfig,
    attestation_config: AttestationConfig,
    mut stop_receiver: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr.clone();
    let state = PublishState::new(pool, config, attestation_config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("cannot bind publish server to {bind_addr}"))?;
    tracing::info!(%bind_addr, "starting publish server");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if stop_receiver.changed().await.is_err() {
                tracing::warn!("stop signal sender for publish server was dropped without sending a signal");
            }
            tracing::info!("stop signal received, publish server is shutting down");
        })
        .await
        .context("publish server failed")?;
    tracing::info!("publish server shut down");
    Ok(())
}
