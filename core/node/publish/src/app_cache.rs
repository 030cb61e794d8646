use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tekx_dal::CoreDal;
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_types::AuthorizedApp;
use tokio::sync::RwLock;

struct CacheState {
    apps: Vec<AuthorizedApp>,
    refreshed_at: std::time::Instant,
}

/// A process-local, TTL-bounded cache of every `AuthorizedApp` row (§5, §9).
/// Readers take the shared lock and only escalate to the exclusive lock
/// when the TTL has elapsed; the escalating reader re-checks the TTL once
/// it holds the exclusive lock, so concurrent expiring readers don't each
/// refetch.
pub struct AuthorizedAppCache {
    pool: ConnectionPool<Core>,
    ttl: Duration,
    state: RwLock<Option<CacheState>>,
}

impl AuthorizedAppCache {
    pub fn new(pool: ConnectionPool<Core>, ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            pool,
            ttl,
            state: RwLock::new(None),
        })
    }

    pub async fn lookup(&self, app_package_name: &str) -> anyhow::Result<Option<AuthorizedApp>> {
        {
            let guard = self.state.read().await;
            if let Some(state) = guard.as_ref() {
                if state.refreshed_at.elapsed() < self.ttl {
                    return Ok(state
                        .apps
                        .iter()
                        .find(|app| app.app_package_name == app_package_name)
                        .cloned());
                }
            }
        }

        let mut guard = self.state.write().await;
        let needs_refresh = match guard.as_ref() {
            Some(state) => state.refreshed_at.elapsed() >= self.ttl,
            None => true,
        };
        if needs_refresh {
            let apps = self.fetch_all().await?;
            *guard = Some(CacheState {
                apps,
                refreshed_at: std::time::Instant::now(),
            });
        }
        Ok(guard
            .as_ref()
            .expect("just populated above")
            .apps
            .iter()
            .find(|app| app.app_package_name == app_package_name)
            .cloned())
    }

    async fn fetch_all(&self) -> anyhow::Result<Vec<AuthorizedApp>> {
        let mut conn = self.pool.connection_tagged("authorized_app_cache").await?;
        let apps = conn.authorized_app_dal().list_all().await?;
        tracing::debug!(count = apps.len(), at = %Utc::now(), "refreshed authorized-app cache");
        Ok(apps)
    }
}
