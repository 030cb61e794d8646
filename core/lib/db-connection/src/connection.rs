use std::marker::PhantomData;

use sqlx::{PgConnection, Postgres, Transaction};

use crate::error::{DalError, DalResult};

/// Tags the kind of database a [`Connection`]/[`crate::connection_pool::ConnectionPool`]
/// talks to, so a single pool type can't accidentally be used against the
/// wrong schema. This server has a single marker, [`Core`].
pub trait DbMarker: Send + Sync + 'static {}

/// The sole database this server maintains: exposures, export
/// configuration, batches, files, federation state, and locks.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct Core;

impl DbMarker for Core {}

enum ConnectionInner<'a> {
    Pooled(sqlx::pool::PoolConnection<Postgres>),
    Transaction(Transaction<'a, Postgres>),
}

/// A single borrowed database connection, either a plain pooled connection
/// or one enlisted in a transaction. Cloning a [`ConnectionPool`] and
/// calling `connection_tagged` is the only supported way to obtain one.
pub struct Connection<'a, DB: DbMarker> {
    inner: ConnectionInner<'a>,
    tag: &'static str,
    _marker: PhantomData<DB>,
}

impl<'a, DB: DbMarker> Connection<'a, DB> {
    pub(crate) fn from_pooled(tag: &'static str, conn: sqlx::pool::PoolConnection<Postgres>) -> Self {
        Self {
            inner: ConnectionInner::Pooled(conn),
            tag,
            _marker: PhantomData,
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Returns a mutable reference to the underlying sqlx executor, for use
    /// with `sqlx::query(...).fetch_*(&mut *conn.as_executor())`.
    pub fn as_executor(&mut self) -> &mut PgConnection {
        match &mut self.inner {
            ConnectionInner::Pooled(conn) => conn,
            ConnectionInner::Transaction(tx) => tx,
        }
    }

    /// Starts a nested serializable transaction on this connection. Callers
    /// must `commit()` explicitly; dropping without committing rolls back.
    pub async fn start_transaction(&mut self) -> DalResult<Connection<'_, DB>> {
        let tx = match &mut self.inner {
            ConnectionInner::Pooled(conn) => sqlx::Connection::begin(&mut **conn)
                .await
                .map_err(|e| DalError::wrap("start_transaction", e))?,
            ConnectionInner::Transaction(tx) => sqlx::Connection::begin(&mut **tx)
                .await
                .map_err(|e| DalError::wrap("start_transaction", e))?,
        };
        Ok(Connection {
            inner: ConnectionInner::Transaction(tx),
            tag: self.tag,
            _marker: PhantomData,
        })
    }

    pub async fn commit(self) -> DalResult<()> {
        match self.inner {
            ConnectionInner::Transaction(tx) => {
                tx.commit().await.map_err(|e| DalError::wrap("commit", e))
            }
            ConnectionInner::Pooled(_) => Ok(()),
        }
    }
}
