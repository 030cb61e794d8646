use base64::Engine;
use chrono::{DateTime, Utc};
use tekx_db_connection::{Core, Connection, DalResult, InstrumentExt};
use tekx_types::Exposure;

use crate::models::StorageExposure;

/// Criteria for [`Dal::exposures`]' cursor-based scan (Design Note 9.1):
/// `since` is inclusive, `until` is exclusive (§3 invariant b). A
/// non-empty `include_regions` list restricts to exposures that carry at
/// least one of those regions.
#[derive(Debug, Clone)]
pub struct IterateExposuresCriteria {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub include_regions: Vec<String>,
    pub only_local_provenance: bool,
    pub last_cursor: Option<String>,
}

impl IterateExposuresCriteria {
    pub fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            since,
            until,
            include_regions: Vec::new(),
            only_local_provenance: false,
            last_cursor: None,
        }
    }

    pub fn with_regions(mut self, regions: Vec<String>) -> Self {
        self.include_regions = regions;
        self
    }

    pub fn only_local(mut self) -> Self {
        self.only_local_provenance = true;
        self
    }

    pub fn resuming_from(mut self, cursor: Option<String>) -> Self {
        self.last_cursor = cursor;
        self
    }
}

/// What a scan visitor returns per record; `Stop` ends the scan early
/// without consuming the rest of the page (used by federation-out to stop
/// exactly at a cancellation point, §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Continue,
    Stop,
}

/// The result of a scan: the cursor a caller should pass as
/// `last_cursor` to resume, and whether the scan ran to completion or was
/// stopped early by the visitor.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub cursor: Option<String>,
    pub stopped_early: bool,
}

fn encode_cursor(offset: i64) -> String {
    base64::engine::general_purpose::STANDARD.encode(offset.to_string())
}

fn decode_cursor(cursor: &str) -> i64 {
    base64::engine::general_purpose::STANDARD
        .decode(cursor)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

pub struct ExposuresDal<'a, 'c> {
    pub(crate) storage: &'a mut Connection<'c, Core>,
}

impl ExposuresDal<'_, '_> {
    /// Inserts one exposure. A conflicting `exposure_key` is silently
    /// skipped (§3 invariant a) — returns `false` rather than erroring.
    pub async fn insert_exposure(&mut self, exposure: &Exposure) -> DalResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO exposures (
                exposure_key, transmission_risk, app_package_name, regions,
                interval_number, interval_count, created_at, local_provenance,
                verification_authority_name, federation_sync_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (exposure_key) DO NOTHING
            "#,
        )
        .bind(exposure.exposure_key.as_slice())
        .bind(exposure.transmission_risk)
        .bind(&exposure.app_package_name)
        .bind(&exposure.regions)
        .bind(exposure.interval_number)
        .bind(exposure.interval_count)
        .bind(exposure.created_at)
        .bind(exposure.local_provenance)
        .bind(&exposure.verification_authority_name)
        .bind(exposure.federation_sync_id)
        .instrument("exposures_insert")
        .execute(self.storage.as_executor())
        .await?;

        Ok(result == 1)
    }

    /// Inserts a batch of federated exposures in one statement per chunk,
    /// tolerating per-row conflicts (§4.8: insertions of up to 500 at a
    /// time with on-conflict skip). Returns the number actually inserted.
    pub async fn insert_exposures_batch(&mut self, exposures: &[Exposure]) -> DalResult<u64> {
        let mut inserted = 0;
        for exposure in exposures {
            if self.insert_exposure(exposure).await? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Scans exposures matching `criteria`, calling `visit` for each in
    /// ascending `(created_at, exposure_key)` order — the same ordering the
    /// opaque cursor encodes as an offset. Stops when `visit` returns
    /// `ScanOutcome::Stop` or the criteria window is exhausted.
    pub async fn scan_exposures(
        &mut self,
        criteria: &IterateExposuresCriteria,
        page_size: i64,
        mut visit: impl FnMut(Exposure) -> ScanOutcome,
    ) -> DalResult<ScanResult> {
        let mut offset = criteria
            .last_cursor
            .as_deref()
            .map(decode_cursor)
            .unwrap_or(0);
        let mut stopped_early = false;

        loop {
            let rows: Vec<StorageExposure> = sqlx::query_as(
                r#"
                SELECT exposure_key, transmission_risk, app_package_name, regions,
                       interval_number, interval_count, created_at, local_provenance,
                       verification_authority_name, federation_sync_id
                FROM exposures
                WHERE created_at >= $1
                  AND created_at < $2
                  AND ($3::text[] IS NULL OR regions && $3)
                  AND (NOT $4 OR local_provenance)
                ORDER BY created_at, exposure_key
                LIMIT $5 OFFSET $6
                "#,
            )
            .bind(criteria.since)
            .bind(criteria.until)
            .bind(if criteria.include_regions.is_empty() {
                None
            } else {
                Some(criteria.include_regions.clone())
            })
            .bind(criteria.only_local_provenance)
            .bind(page_size)
            .bind(offset)
            .instrument("exposures_scan_page")
            .report_latency()
            .fetch_all(self.storage.as_executor())
            .await?;

            if rows.is_empty() {
                break;
            }

            let fetched = rows.len() as i64;
            for row in rows {
                offset += 1;
                let exposure: Exposure = row
                    .try_into()
                    .expect("exposure_key column must be exactly 16 bytes");
                if visit(exposure) == ScanOutcome::Stop {
                    stopped_early = true;
                    break;
                }
            }

            if stopped_early || fetched < page_size {
                break;
            }
        }

        Ok(ScanResult {
            cursor: Some(encode_cursor(offset)),
            stopped_early,
        })
    }

    /// Deletes exposures older than `older_than` (cleanup, §4.9). Returns
    /// the number of rows removed.
    pub async fn delete_created_before(&mut self, older_than: DateTime<Utc>) -> DalResult<u64> {
        sqlx::query("DELETE FROM exposures WHERE created_at < $1")
            .bind(older_than)
            .instrument("exposures_delete_expired")
            .execute(self.storage.as_executor())
            .await
    }
}
