use tekx_db_connection::{Core, Connection, DalResult, InstrumentExt};
use tekx_types::FederationOutAuthorization;

use crate::models::StorageFederationOutAuthorization;

pub struct FederationOutDal<'a, 'c> {
    pub(crate) storage: &'a mut Connection<'c, Core>,
}

impl FederationOutDal<'_, '_> {
    /// Looks up the peer authorized to call `Fetch` by the `(iss, sub)`
    /// pair from its validated OIDC bearer token (§4.7).
    pub async fn get_authorization(
        &mut self,
        oidc_issuer: &str,
        oidc_subject: &str,
    ) -> DalResult<Option<FederationOutAuthorization>> {
        let row: Option<StorageFederationOutAuthorization> = sqlx::query_as(
            r#"
            SELECT oidc_issuer, oidc_subject, oidc_audience, note, include_regions, exclude_regions
            FROM federation_out_authorization
            WHERE oidc_issuer = $1 AND oidc_subject = $2
            "#,
        )
        .bind(oidc_issuer)
        .bind(oidc_subject)
        .instrument("federation_out_authorization_get")
        .fetch_optional(self.storage.as_executor())
        .await?;
        Ok(row.map(Into::into))
    }

    pub async fn upsert(&mut self, authorization: &FederationOutAuthorization) -> DalResult<()> {
        sqlx::query(
            r#"
            INSERT INTO federation_out_authorization (
                oidc_issuer, oidc_subject, oidc_audience, note, include_regions, exclude_regions
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (oidc_issuer, oidc_subject) DO UPDATE SET
                oidc_audience = EXCLUDED.oidc_audience,
                note = EXCLUDED.note,
                include_regions = EXCLUDED.include_regions,
                exclude_regions = EXCLUDED.exclude_regions
            "#,
        )
        .bind(&authorization.oidc_issuer)
        .bind(&authorization.oidc_subject)
        .bind(&authorization.oidc_audience)
        .bind(&authorization.note)
        .bind(&authorization.include_regions)
        .bind(&authorization.exclude_regions)
        .instrument("federation_out_authorization_upsert")
        .execute(self.storage.as_executor())
        .await?;
        Ok(())
    }
}
