use std::sync::Arc;

use chrono::{DateTime, Utc};
use tekx_config::FederationOutConfig;
use tekx_dal::{CoreDal, IterateExposuresCriteria, ScanOutcome};
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_federation_proto::{
    federation_server::Federation, FederationFetchRequest, FederationFetchResponse,
};
use tekx_types::{truncate_window, FederationOutAuthorization};
use tonic::{Request, Response, Status};

use crate::{
    error::FetchError,
    grouping::Accumulator,
    metrics::{FetchOutcome, METRICS},
    oidc::{self, JwksTokenVerifier},
};

pub struct FederationOutService {
    pool: ConnectionPool<Core>,
    verifier: Arc<JwksTokenVerifier>,
    config: FederationOutConfig,
    publish_window: chrono::Duration,
}

impl FederationOutService {
    pub fn new(
        pool: ConnectionPool<Core>,
        verifier: Arc<JwksTokenVerifier>,
        config: FederationOutConfig,
        publish_window: chrono::Duration,
    ) -> Self {
        Self {
            pool,
            verifier,
            config,
            publish_window,
        }
    }

    async fn authorize(&self, request: &Request<FederationFetchRequest>) -> Result<FederationOutAuthorization, FetchError> {
        let token = request
            .metadata()
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(FetchError::MissingToken)?;

        let issuer = oidc::peek_issuer(token)?;
        let claims = self.verifier.verify(&issuer, None, token).await?;

        let mut conn = self.pool.connection_tagged("federation_out").await?;
        let authorization = conn
            .federation_out_dal()
            .get_authorization(&claims.iss, &claims.sub)
            .await?
            .ok_or(FetchError::NotAuthorized)?;

        if let Some(audience) = &authorization.oidc_audience {
            if audience != &claims.aud {
                return Err(FetchError::AudienceMismatch);
            }
        }
        Ok(authorization)
    }

    async fn fetch_inner(&self, request: FederationFetchRequest, auth: &FederationOutAuthorization, now: DateTime<Utc>) -> Result<FederationFetchResponse, FetchError> {
        let include_regions = effective_include(&request.region_identifiers, &auth.include_regions);
        let exclude_regions = effective_exclude(&request.exclude_region_identifiers, &auth.exclude_regions);

        let since = DateTime::from_timestamp(request.last_fetch_response_key_timestamp, 0).unwrap_or(DateTime::UNIX_EPOCH);
        let until = truncate_window(now, self.publish_window);
        let last_cursor = if request.next_fetch_token.is_empty() {
            None
        } else {
            Some(request.next_fetch_token.clone())
        };

        let criteria = IterateExposuresCriteria::new(since, until)
            .with_regions(include_regions.clone())
            .only_local()
            .resuming_from(last_cursor);

        let mut accumulator = Accumulator::new();
        let cap = self.config.max_records_per_response;

        let mut conn = self.pool.connection_tagged("federation_out").await?;
        let scan = conn
            .exposures_dal()
            .scan_exposures(&criteria, 500, |exposure| {
                if accumulator.accept(&exposure, &include_regions, &exclude_regions) {
                    METRICS.exposure_keys_served.inc();
                }
                if accumulator.accepted_count() >= cap as usize {
                    ScanOutcome::Stop
                } else {
                    ScanOutcome::Continue
                }
            })
            .await?;

        if scan.stopped_early {
            METRICS.partial_responses.inc();
        }

        Ok(FederationFetchResponse {
            fetch_response_key_timestamp: accumulator.max_created_at_unix(),
            partial_response: scan.stopped_early,
            next_fetch_token: scan.cursor.unwrap_or_default(),
            response: accumulator.into_responses(),
        })
    }
}

/// §4.7: "included regions intersect with the auth's include-list". An
/// empty list on either side means "no restriction from that side".
fn effective_include(requested: &[String], authorized: &[String]) -> Vec<String> {
    if authorized.is_empty() {
        requested.to_vec()
    } else if requested.is_empty() {
        authorized.to_vec()
    } else {
        requested.iter().filter(|r| authorized.contains(r)).cloned().collect()
    }
}

/// §4.7: "excluded regions union with the auth's exclude-list".
fn effective_exclude(requested: &[String], authorized: &[String]) -> Vec<String> {
    let mut union: Vec<String> = requested.to_vec();
    for region in authorized {
        if !union.contains(region) {
            union.push(region.clone());
        }
    }
    union
}

#[async_trait::async_trait]
impl Federation for FederationOutService {
    async fn fetch(&self, request: Request<FederationFetchRequest>) -> Result<Response<FederationFetchResponse>, Status> {
        let now = Utc::now();

        let auth = if self.config.require_authentication {
            match self.authorize(&request).await {
                Ok(auth) => auth,
                Err(err) => {
                    METRICS.fetch_requests[&FetchOutcome::Unauthorized].inc();
                    return Err(err.into());
                }
            }
        } else {
            FederationOutAuthorization {
                oidc_issuer: String::new(),
                oidc_subject: String::new(),
                oidc_audience: None,
                note: "authentication disabled".to_string(),
                include_regions: Vec::new(),
                exclude_regions: Vec::new(),
            }
        };

        match self.fetch_inner(request.into_inner(), &auth, now).await {
            Ok(response) => {
                METRICS.fetch_requests[&FetchOutcome::Success].inc();
                Ok(Response::new(response))
            }
            Err(err) => {
                METRICS.fetch_requests[&FetchOutcome::Transient].inc();
                Err(err.into())
            }
        }
    }
}
