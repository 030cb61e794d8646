//! Federation-in pull runner (C10, §4.8): periodically drains every
//! configured [`tekx_types::FederationInQuery`] against its peer's
//! federation-out server.

mod error;
mod metrics;
mod runner;
mod token_provider;

use std::{sync::Arc, time::Duration};

use tekx_config::{FederationInConfig, FederationInSecrets};
use tekx_db_connection::{connection::Core, ConnectionPool};
use tokio::sync::watch;

pub use error::FederationInError;
pub use token_provider::{ClientCredentialsTokenProvider, TokenProvider};

/// Runs the federation-in sync loop for one process.
pub struct FederationInRunner {
    pool: ConnectionPool<Core>,
    tokens: Arc<dyn TokenProvider>,
    config: FederationInConfig,
    tick: Duration,
}

impl FederationInRunner {
    pub fn new(pool: ConnectionPool<Core>, secrets: Vec<FederationInSecrets>, config: FederationInConfig, tick: Duration) -> Self {
        Self {
            pool,
            tokens: Arc::new(ClientCredentialsTokenProvider::new(secrets)),
            config,
            tick,
        }
    }

    pub async fn run(self, mut stop_receiver: watch::Receiver<bool>) -> anyhow::Result<()> {
        let mut timer = tokio::time::interval(self.tick);

        while !*stop_receiver.borrow_and_update() {
            tokio::select! {
                _ = timer.tick() => {
                    let now = chrono::Utc::now();
                    if let Err(err) = runner::run_once(&self.pool, self.tokens.as_ref(), &self.config, now).await {
                        tracing::error!(%err, "federation-in pass failed");
                    }
                }
                _ = stop_receiver.changed() => break,
            }
        }

        tracing::info!("federation-in shutting down");
        Ok(())
    }
}
