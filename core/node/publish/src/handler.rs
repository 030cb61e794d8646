use std::{sync::Arc, time::Instant};

use axum::{extract::State, http::StatusCode, Json};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use tekx_attestation::{verify_safetynet, VerificationWindow};
use tekx_dal::CoreDal;
use tekx_types::Platform;

use crate::{
    app_cache::AuthorizedAppCache,
    error::PublishError,
    metrics::{PublishOutcome, METRICS},
    request::PublishRequest,
    transform::{nonce_keys, to_exposures},
    validate::validate,
    PublishState,
};

/// `POST /` (§6). Always returns 200 for client-side problems — including
/// unauthorized/unattested publishes — padding the response so a rejection
/// and a success are indistinguishable in wall-clock time (§9). Only a
/// transient server failure produces a non-200 status.
pub async fn publish(State(state): State<Arc<PublishState>>, Json(request): Json<PublishRequest>) -> (StatusCode, Json<Value>) {
    let started = Instant::now();
    let result = handle(&state, request).await;

    let target = state.config.response_padding_min_latency;
    let elapsed = started.elapsed();
    if elapsed < target {
        tokio::time::sleep(target - elapsed).await;
    }

    match result {
        Ok(inserted) => {
            METRICS.requests[&PublishOutcome::Success].inc();
            (StatusCode::OK, Json(json!({ "insertedExposures": inserted })))
        }
        Err(PublishError::InvalidInput(reason)) => {
            METRICS.requests[&PublishOutcome::InvalidInput].inc();
            tracing::warn!(%reason, "publish rejected: invalid input");
            (StatusCode::OK, Json(json!({})))
        }
        Err(PublishError::Unauthorized(reason)) => {
            METRICS.requests[&PublishOutcome::Unauthorized].inc();
            tracing::warn!(%reason, "publish rejected: unauthorized");
            (StatusCode::OK, Json(json!({})))
        }
        Err(PublishError::Transient(err)) => {
            METRICS.requests[&PublishOutcome::Transient].inc();
            tracing::error!(%err, "publish failed: transient error");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "internal error" })))
        }
    }
}

async fn handle(state: &PublishState, request: PublishRequest) -> Result<usize, PublishError> {
    let now = Utc::now();
    let validated = validate(&request, &state.config, now)?;

    let app = state
        .app_cache
        .lookup(&validated.app_package_name)
        .await
        .map_err(PublishError::Transient)?
        .ok_or_else(|| PublishError::Unauthorized(format!("unknown app {}", validated.app_package_name)))?;

    for region in &validated.regions {
        if !app.allows_region(region) {
            return Err(PublishError::Unauthorized(format!("region {region} not allowed for app")));
        }
    }

    if validated.platform == Platform::Android {
        let policy = app
            .safety_net
            .as_ref()
            .ok_or_else(|| PublishError::Unauthorized("app has no SafetyNet policy configured".to_string()))?;
        let nonce = tekx_attestation::derive_android_nonce(
            &validated.app_package_name,
            &nonce_keys(&validated),
            &validated.regions,
            &validated.verification_payload,
        );
        let window = VerificationWindow {
            min_valid_time_skew: ChronoDuration::from_std(state.attestation_config.min_valid_time_skew).unwrap(),
            max_valid_time_skew: ChronoDuration::from_std(state.attestation_config.max_valid_time_skew).unwrap(),
        };
        verify_safetynet(
            &validated.device_verification_payload,
            &nonce,
            policy,
            &state.attestation_config.safetynet_hostname,
            window,
            now,
        )
        .map_err(|err| PublishError::Unauthorized(format!("attestation rejected: {err}")))?;
    }

    let exposures = to_exposures(&validated, "public-health-authority", state.config.publish_window, now);

    let mut conn = state
        .pool
        .connection_tagged("publish")
        .await
        .map_err(|e| PublishError::Transient(anyhow::anyhow!(e)))?;
    let mut inserted = 0;
    for exposure in &exposures {
        if conn
            .exposures_dal()
            .insert_exposure(exposure)
            .await
            .map_err(|e| PublishError::Transient(anyhow::anyhow!(e)))?
        {
            inserted += 1;
            METRICS.exposures_inserted.inc();
        } else {
            METRICS.exposures_deduped.inc();
        }
    }

    Ok(inserted)
}
