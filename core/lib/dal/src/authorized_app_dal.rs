use tekx_db_connection::{Core, Connection, DalError, DalResult, InstrumentExt};
use tekx_types::AuthorizedApp;

use crate::models::StorageAuthorizedApp;

pub struct AuthorizedAppDal<'a, 'c> {
    pub(crate) storage: &'a mut Connection<'c, Core>,
}

impl AuthorizedAppDal<'_, '_> {
    pub async fn get(&mut self, app_package_name: &str) -> DalResult<Option<AuthorizedApp>> {
        let row: Option<StorageAuthorizedApp> = sqlx::query_as(
            r#"
            SELECT app_package_name, platform, allowed_regions, safety_net_policy, device_check_policy
            FROM authorized_app
            WHERE app_package_name = $1
            "#,
        )
        .bind(app_package_name)
        .instrument("authorized_app_get")
        .fetch_optional(self.storage.as_executor())
        .await?;
        row.map(TryInto::try_into)
            .transpose()
            .map_err(|e: anyhow::Error| DalError::wrap("authorized_app decode", sqlx::Error::Decode(e.into())))
    }

    /// Loads every authorized app, for populating the in-process
    /// TTL cache the publish handler consults on each request (§9).
    pub async fn list_all(&mut self) -> DalResult<Vec<AuthorizedApp>> {
        let rows: Vec<StorageAuthorizedApp> = sqlx::query_as(
            r#"
            SELECT app_package_name, platform, allowed_regions, safety_net_policy, device_check_policy
            FROM authorized_app
            "#,
        )
        .instrument("authorized_app_list_all")
        .fetch_all(self.storage.as_executor())
        .await?;
        rows.into_iter()
            .map(|row| {
                row.try_into()
                    .map_err(|e: anyhow::Error| DalError::wrap("authorized_app decode", sqlx::Error::Decode(e.into())))
            })
            .collect()
    }

    pub async fn upsert(&mut self, app: &AuthorizedApp) -> DalResult<()> {
        let safety_net = app
            .safety_net
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| DalError::wrap("authorized_app encode safety_net", sqlx::Error::Decode(e.into())))?;
        let device_check = app
            .device_check
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| DalError::wrap("authorized_app encode device_check", sqlx::Error::Decode(e.into())))?;

        sqlx::query(
            r#"
            INSERT INTO authorized_app (
                app_package_name, platform, allowed_regions, safety_net_policy, device_check_policy
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (app_package_name) DO UPDATE SET
                platform = EXCLUDED.platform,
                allowed_regions = EXCLUDED.allowed_regions,
                safety_net_policy = EXCLUDED.safety_net_policy,
                device_check_policy = EXCLUDED.device_check_policy
            "#,
        )
        .bind(&app.app_package_name)
        .bind(app.platform.to_string())
        .bind(&app.allowed_regions)
        .bind(safety_net)
        .bind(device_check)
        .instrument("authorized_app_upsert")
        .execute(self.storage.as_executor())
        .await?;
        Ok(())
    }
}
