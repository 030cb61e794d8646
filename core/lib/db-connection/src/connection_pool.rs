use std::{marker::PhantomData, time::Duration};

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::{
    connection::{Connection, DbMarker},
    error::{DalError, DalResult},
};

/// A connection pool bound to a single [`DbMarker`]. Cloning is cheap — it
/// shares the underlying `sqlx::PgPool`.
#[derive(Clone)]
pub struct ConnectionPool<DB: DbMarker> {
    pool: sqlx::PgPool,
    _marker: PhantomData<DB>,
}

pub struct ConnectionPoolBuilder<DB: DbMarker> {
    url: String,
    max_size: u32,
    statement_timeout: Option<Duration>,
    acquire_timeout: Option<Duration>,
    _marker: PhantomData<DB>,
}

impl<DB: DbMarker> ConnectionPoolBuilder<DB> {
    pub fn set_statement_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.statement_timeout = timeout;
        self
    }

    pub fn set_acquire_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn set_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    pub async fn build(&self) -> anyhow::Result<ConnectionPool<DB>> {
        let mut options: PgConnectOptions = self.url.parse()?;
        if let Some(timeout) = self.statement_timeout {
            options = options.options([(
                "statement_timeout",
                format!("{}", timeout.as_millis()),
            )]);
        }

        let mut pool_options = PgPoolOptions::new().max_connections(self.max_size);
        if let Some(acquire_timeout) = self.acquire_timeout {
            pool_options = pool_options.acquire_timeout(acquire_timeout);
        }

        let pool = pool_options.connect_with(options).await?;
        Ok(ConnectionPool {
            pool,
            _marker: PhantomData,
        })
    }
}

impl<DB: DbMarker> ConnectionPool<DB> {
    pub fn builder(url: impl Into<String>, max_size: u32) -> ConnectionPoolBuilder<DB> {
        ConnectionPoolBuilder {
            url: url.into(),
            max_size,
            statement_timeout: None,
            acquire_timeout: None,
            _marker: PhantomData,
        }
    }

    /// Builds a pool from `TEST_DATABASE_URL` with a single connection,
    /// for use in `#[tokio::test]`s that exercise a dal directly.
    pub async fn test_pool() -> ConnectionPool<DB> {
        let url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must be set to run database-backed tests");
        Self::builder(url, 1)
            .build()
            .await
            .expect("failed to connect to test database")
    }

    pub async fn connection_tagged(&self, tag: &'static str) -> DalResult<Connection<'_, DB>> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DalError::wrap("acquire connection", e))?;
        Ok(Connection::from_pooled(tag, conn))
    }

    pub fn inner(&self) -> &sqlx::PgPool {
        &self.pool
    }
}
