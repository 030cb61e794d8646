use chrono::{DateTime, Utc};
use tekx_db_connection::{Core, Connection, DalResult, InstrumentExt};
use tekx_types::{FederationInQuery, FederationInSync};

use crate::models::{StorageFederationInQuery, StorageFederationInSync};

pub struct FederationInDal<'a, 'c> {
    pub(crate) storage: &'a mut Connection<'c, Core>,
}

impl FederationInDal<'_, '_> {
    pub async fn list_queries(&mut self) -> DalResult<Vec<FederationInQuery>> {
        let rows: Vec<StorageFederationInQuery> = sqlx::query_as(
            r#"
            SELECT query_id, server_addr, oidc_audience, oidc_token_endpoint, include_regions, exclude_regions, last_timestamp
            FROM federation_in_query
            "#,
        )
        .instrument("federation_in_query_list")
        .fetch_all(self.storage.as_executor())
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_query(&mut self, query_id: &str) -> DalResult<Option<FederationInQuery>> {
        let row: Option<StorageFederationInQuery> = sqlx::query_as(
            r#"
            SELECT query_id, server_addr, oidc_audience, oidc_token_endpoint, include_regions, exclude_regions, last_timestamp
            FROM federation_in_query
            WHERE query_id = $1
            "#,
        )
        .bind(query_id)
        .instrument("federation_in_query_get")
        .fetch_optional(self.storage.as_executor())
        .await?;
        Ok(row.map(Into::into))
    }

    pub async fn upsert_query(&mut self, query: &FederationInQuery) -> DalResult<()> {
        sqlx::query(
            r#"
            INSERT INTO federation_in_query (
                query_id, server_addr, oidc_audience, oidc_token_endpoint,
                include_regions, exclude_regions, last_timestamp
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (query_id) DO UPDATE SET
                server_addr = EXCLUDED.server_addr,
                oidc_audience = EXCLUDED.oidc_audience,
                oidc_token_endpoint = EXCLUDED.oidc_token_endpoint,
                include_regions = EXCLUDED.include_regions,
                exclude_regions = EXCLUDED.exclude_regions
            "#,
        )
        .bind(&query.query_id)
        .bind(&query.server_addr)
        .bind(&query.oidc_audience)
        .bind(&query.oidc_token_endpoint)
        .bind(&query.include_regions)
        .bind(&query.exclude_regions)
        .bind(query.last_timestamp)
        .instrument("federation_in_query_upsert")
        .execute(self.storage.as_executor())
        .await?;
        Ok(())
    }

    /// Advances `last_timestamp` only forward, never backward (§3 invariant
    /// e) — a sync that inserted nothing must not regress the cursor.
    pub async fn advance_last_timestamp(&mut self, query_id: &str, new_timestamp: DateTime<Utc>) -> DalResult<()> {
        sqlx::query(
            "UPDATE federation_in_query SET last_timestamp = $2 WHERE query_id = $1 AND last_timestamp < $2",
        )
        .bind(query_id)
        .bind(new_timestamp)
        .instrument("federation_in_query_advance")
        .execute(self.storage.as_executor())
        .await?;
        Ok(())
    }

    pub async fn start_sync(&mut self, query_id: &str, started: DateTime<Utc>) -> DalResult<i64> {
        let (sync_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO federation_in_sync (query_id, started, completed, insertions, max_timestamp)
            VALUES ($1, $2, NULL, 0, NULL)
            RETURNING sync_id
            "#,
        )
        .bind(query_id)
        .bind(started)
        .instrument("federation_in_sync_start")
        .fetch_one(self.storage.as_executor())
        .await?;
        Ok(sync_id)
    }

    pub async fn finalize_sync(
        &mut self,
        sync_id: i64,
        completed: DateTime<Utc>,
        insertions: i64,
        max_timestamp: Option<DateTime<Utc>>,
    ) -> DalResult<()> {
        sqlx::query(
            r#"
            UPDATE federation_in_sync
            SET completed = $2, insertions = $3, max_timestamp = $4
            WHERE sync_id = $1
            "#,
        )
        .bind(sync_id)
        .bind(completed)
        .bind(insertions)
        .bind(max_timestamp)
        .instrument("federation_in_sync_finalize")
        .execute(self.storage.as_executor())
        .await?;
        Ok(())
    }

    #[allow(dead_code)]
    async fn get_sync(&mut self, sync_id: i64) -> DalResult<FederationInSync> {
        let row: StorageFederationInSync = sqlx::query_as(
            r#"
            SELECT sync_id, query_id, started, completed, insertions, max_timestamp
            FROM federation_in_sync
            WHERE sync_id = $1
            "#,
        )
        .bind(sync_id)
        .instrument("federation_in_sync_get")
        .fetch_one(self.storage.as_executor())
        .await?;
        Ok(row.into())
    }
}
