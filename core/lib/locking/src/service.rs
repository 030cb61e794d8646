use chrono::{DateTime, Duration, Utc};
use sqlx::Row;
use tekx_db_connection::{connection::Core, error::DalError, instrument::InstrumentExt, Connection, ConnectionPool, DalResult};
use tekx_types::LockHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    Acquired(LockHandle),
    AlreadyLocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiLockOutcome {
    Acquired(Vec<LockHandle>),
    AlreadyLocked,
}

/// Thin wrapper over the `locks` table. Clone is cheap (the pool is
/// reference-counted internally by `sqlx`).
#[derive(Clone)]
pub struct NamedLockService {
    pool: ConnectionPool<Core>,
}

impl NamedLockService {
    pub fn new(pool: ConnectionPool<Core>) -> Self {
        Self { pool }
    }

    /// Acquires a single named lock, or reports contention. The whole
    /// check-and-set happens in one serializable transaction so a racing
    /// acquirer either sees our committed row or we see theirs.
    pub async fn lock(&self, lock_id: &str, ttl: Duration) -> DalResult<LockOutcome> {
        let mut conn = self.pool.connection_tagged("named_lock_service").await?;
        let mut tx = conn.start_transaction().await?;
        let outcome = acquire_locked(&mut tx, lock_id, ttl).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    /// Acquires every id in `ids`, in ascending order, to avoid deadlocking
    /// against another `multi_lock` caller. On contention, every lock
    /// acquired so far in this call is released (in reverse order) before
    /// returning `AlreadyLocked`.
    pub async fn multi_lock(&self, ids: &[String], ttl: Duration) -> DalResult<MultiLockOutcome> {
        let mut sorted: Vec<&String> = ids.iter().collect();
        sorted.sort();

        let mut acquired = Vec::with_capacity(sorted.len());
        for id in sorted {
            match self.lock(id, ttl).await? {
                LockOutcome::Acquired(handle) => acquired.push(handle),
                LockOutcome::AlreadyLocked => {
                    for handle in acquired.into_iter().rev() {
                        if let Err(err) = self.unlock(&handle).await {
                            tracing::warn!(lock_id = %handle.lock_id, %err, "failed to release lock during multi_lock rollback");
                        }
                    }
                    return Ok(MultiLockOutcome::AlreadyLocked);
                }
            }
        }
        Ok(MultiLockOutcome::Acquired(acquired))
    }

    /// Releases a lock only if it is still held under the handle's
    /// `expires` (§4.1, P8): a caller whose lease has since expired cannot
    /// steal back a lock another worker has acquired in the meantime.
    pub async fn unlock(&self, handle: &LockHandle) -> DalResult<()> {
        let mut conn = self.pool.connection_tagged("named_lock_service").await?;
        sqlx::query("DELETE FROM locks WHERE lock_id = $1 AND expires = $2")
            .bind(&handle.lock_id)
            .bind(handle.expires)
            .instrument("locks_unlock")
            .execute(conn.as_executor())
            .await?;
        Ok(())
    }
}

async fn acquire_locked(
    conn: &mut Connection<'_, Core>,
    lock_id: &str,
    ttl: Duration,
) -> DalResult<LockOutcome> {
    let now = Utc::now();
    let row = sqlx::query("SELECT expires FROM locks WHERE lock_id = $1 FOR UPDATE")
        .bind(lock_id)
        .instrument("locks_select_for_update")
        .fetch_optional(conn.as_executor())
        .await?;

    let currently_held = match row {
        Some(row) => {
            let expires: DateTime<Utc> = row.try_get("expires").map_err(|e| DalError::wrap("locks row decode", e))?;
            expires >= now
        }
        None => false,
    };

    if currently_held {
        return Ok(LockOutcome::AlreadyLocked);
    }

    let expires = now + ttl;
    sqlx::query(
        r#"
        INSERT INTO locks (lock_id, expires)
        VALUES ($1, $2)
        ON CONFLICT (lock_id) DO UPDATE SET expires = EXCLUDED.expires
        "#,
    )
    .bind(lock_id)
    .bind(expires)
    .instrument("locks_upsert")
    .execute(conn.as_executor())
    .await?;

    Ok(LockOutcome::Acquired(LockHandle {
        lock_id: lock_id.to_string(),
        expires,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn second_lock_call_sees_contention() {
        let pool = ConnectionPool::<Core>::test_pool().await;
        let service = NamedLockService::new(pool);

        let first = service.lock("create_batches", Duration::seconds(30)).await.unwrap();
        assert!(matches!(first, LockOutcome::Acquired(_)));

        let second = service.lock("create_batches", Duration::seconds(30)).await.unwrap();
        assert_eq!(second, LockOutcome::AlreadyLocked);

        if let LockOutcome::Acquired(handle) = first {
            service.unlock(&handle).await.unwrap();
        }

        let third = service.lock("create_batches", Duration::seconds(30)).await.unwrap();
        assert!(matches!(third, LockOutcome::Acquired(_)));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn unlock_is_noop_if_lease_already_reclaimed() {
        let pool = ConnectionPool::<Core>::test_pool().await;
        let service = NamedLockService::new(pool);

        let stale = LockHandle {
            lock_id: "export-batch-1".to_string(),
            expires: Utc::now() - Duration::seconds(60),
        };
        // A worker with an expired handle must not be able to delete a
        // fresh lock someone else acquired in the meantime.
        let fresh = service.lock("export-batch-1", Duration::seconds(60)).await.unwrap();
        service.unlock(&stale).await.unwrap();
        let reattempt = service.lock("export-batch-1", Duration::seconds(60)).await.unwrap();
        assert_eq!(reattempt, LockOutcome::AlreadyLocked);
        if let LockOutcome::Acquired(handle) = fresh {
            service.unlock(&handle).await.unwrap();
        }
    }
}
