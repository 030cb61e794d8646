use chrono::{DateTime, Utc};
use tekx_config::FederationInConfig;
use tekx_dal::CoreDal;
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_federation_proto::{federation_client::FederationClient, FederationFetchRequest};
use tekx_types::{Exposure, FederationInQuery};
use tonic::{transport::Channel, Request};

use crate::{error::FederationInError, metrics::METRICS, token_provider::TokenProvider};

/// Runs one federation-in pass: every configured [`FederationInQuery`] is
/// pulled to exhaustion (§4.8). Per-query failures are logged and do not
/// abort the remaining queries.
pub async fn run_once(pool: &ConnectionPool<Core>, tokens: &dyn TokenProvider, config: &FederationInConfig, now: DateTime<Utc>) -> anyhow::Result<()> {
    let mut conn = pool.connection_tagged("federation_in").await?;
    let queries = conn.federation_in_dal().list_queries().await?;
    drop(conn);

    for query in queries {
        if let Err(err) = run_query(pool, tokens, config, &query, now).await {
            tracing::error!(query_id = %query.query_id, %err, "federation-in sync failed");
            METRICS.syncs_failed.inc();
        }
    }
    Ok(())
}

async fn run_query(pool: &ConnectionPool<Core>, tokens: &dyn TokenProvider, config: &FederationInConfig, query: &FederationInQuery, now: DateTime<Utc>) -> Result<(), FederationInError> {
    METRICS.syncs_started.inc();
    let mut conn = pool.connection_tagged("federation_in").await?;
    let sync_id = conn.federation_in_dal().start_sync(&query.query_id, now).await?;
    drop(conn);

    let result = pull_query(pool, tokens, config, query, sync_id).await;

    let mut conn = pool.connection_tagged("federation_in").await?;
    match &result {
        Ok((insertions, max_timestamp)) => {
            conn.federation_in_dal()
                .finalize_sync(sync_id, Utc::now(), *insertions as i64, *max_timestamp)
                .await?;
            if *insertions > 0 {
                if let Some(max_timestamp) = max_timestamp {
                    conn.federation_in_dal().advance_last_timestamp(&query.query_id, *max_timestamp).await?;
                }
            }
        }
        Err(_) => {
            conn.federation_in_dal().finalize_sync(sync_id, Utc::now(), 0, None).await?;
        }
    }

    result.map(|_| ())
}

async fn pull_query(
    pool: &ConnectionPool<Core>,
    tokens: &dyn TokenProvider,
    config: &FederationInConfig,
    query: &FederationInQuery,
    sync_id: i64,
) -> Result<(u32, Option<DateTime<Utc>>), FederationInError> {
    let channel = Channel::from_shared(query.server_addr.clone())
        .map_err(|source| FederationInError::Connect {
            server_addr: query.server_addr.clone(),
            source: tonic::transport::Error::from(source),
        })?
        .connect()
        .await
        .map_err(|source| FederationInError::Connect {
            server_addr: query.server_addr.clone(),
            source,
        })?;
    let mut client = FederationClient::new(channel);
    let token = tokens.token(&query.oidc_token_endpoint, &query.oidc_audience).await?;

    let mut next_fetch_token = String::new();
    let mut total_insertions = 0u32;
    let mut max_timestamp: Option<DateTime<Utc>> = None;
    let mut last_fetch_response_key_timestamp = query.last_timestamp.timestamp();

    loop {
        let mut request = Request::new(FederationFetchRequest {
            region_identifiers: query.include_regions.clone(),
            exclude_region_identifiers: query.exclude_regions.clone(),
            last_fetch_response_key_timestamp,
            next_fetch_token: next_fetch_token.clone(),
        });
        request.metadata_mut().insert("authorization", format!("Bearer {token}").parse().expect("bearer header value is valid ASCII"));

        METRICS.fetch_calls.inc();
        let response = client.fetch(request).await?.into_inner();

        let exposures = to_exposures(&response, sync_id);
        let mut conn = pool.connection_tagged("federation_in").await?;
        for chunk in exposures.chunks(config.insert_chunk_size) {
            let inserted = conn.exposures_dal().insert_exposures_batch(chunk).await?;
            total_insertions += inserted as u32;
            METRICS.exposures_inserted.inc_by(inserted);
        }

        if response.fetch_response_key_timestamp > 0 {
            let candidate = DateTime::from_timestamp(response.fetch_response_key_timestamp, 0);
            max_timestamp = max_timestamp.max(candidate);
        }
        last_fetch_response_key_timestamp = response.fetch_response_key_timestamp.max(last_fetch_response_key_timestamp);
        next_fetch_token = response.next_fetch_token;

        if !response.partial_response {
            break;
        }
    }

    Ok((total_insertions, max_timestamp))
}

fn to_exposures(response: &tekx_federation_proto::FederationFetchResponse, sync_id: i64) -> Vec<Exposure> {
    let created_at = Utc::now();
    let mut exposures = Vec::new();
    for group in &response.response {
        for info in &group.contact_tracing_info {
            for key in &info.exposure_keys {
                let mut exposure_key = [0u8; 16];
                let len = key.exposure_key.len().min(16);
                exposure_key[..len].copy_from_slice(&key.exposure_key[..len]);

                exposures.push(Exposure {
                    exposure_key,
                    transmission_risk: info.transmission_risk as i16,
                    app_package_name: String::new(),
                    regions: group.region_identifiers.clone(),
                    interval_number: key.interval_number,
                    interval_count: key.interval_count,
                    created_at,
                    local_provenance: false,
                    verification_authority_name: info.verification_authority_name.clone(),
                    federation_sync_id: Some(sync_id),
                });
            }
        }
    }
    exposures
}
