use chrono::{DateTime, Utc};
use tekx_db_connection::{Core, Connection, DalResult, InstrumentExt};
use tekx_types::SignatureInfo;

use crate::models::StorageSignatureInfo;

pub struct SignatureInfoDal<'a, 'c> {
    pub(crate) storage: &'a mut Connection<'c, Core>,
}

impl SignatureInfoDal<'_, '_> {
    /// All signature infos referenced by `ids`, in the order given — a
    /// batch may reference several as a key rotates mid-period (§4.6).
    pub async fn get_many(&mut self, ids: &[i64]) -> DalResult<Vec<SignatureInfo>> {
        let rows: Vec<StorageSignatureInfo> = sqlx::query_as(
            r#"
            SELECT id, signing_key, app_package_name, bundle_id, signing_key_version,
                   signing_key_id, end_timestamp
            FROM signature_info
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .instrument("signature_info_get_many")
        .fetch_all(self.storage.as_executor())
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Only the subset of `ids` still active at `now` (§4.6: a rotated key
    /// with a past `end_timestamp` is dropped from future signature
    /// lists but kept for historical files already written).
    pub async fn get_active(&mut self, ids: &[i64], now: DateTime<Utc>) -> DalResult<Vec<SignatureInfo>> {
        Ok(self
            .get_many(ids)
            .await?
            .into_iter()
            .filter(|info| info.is_active(now))
            .collect())
    }

    pub async fn insert(&mut self, info: &SignatureInfo) -> DalResult<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO signature_info (
                signing_key, app_package_name, bundle_id, signing_key_version,
                signing_key_id, end_timestamp
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&info.signing_key)
        .bind(&info.app_package_name)
        .bind(&info.bundle_id)
        .bind(&info.signing_key_version)
        .bind(&info.signing_key_id)
        .bind(info.end_timestamp)
        .instrument("signature_info_insert")
        .fetch_one(self.storage.as_executor())
        .await?;
        Ok(id)
    }
}
