use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub config_id: i64,
    pub bucket_name: String,
    pub filename_root: String,
    pub period_seconds: i64,
    pub region: String,
    pub from: DateTime<Utc>,
    pub thru: Option<DateTime<Utc>>,
    pub signature_info_ids: Vec<i64>,
}

impl ExportConfig {
    pub fn period(&self) -> Duration {
        Duration::seconds(self.period_seconds)
    }

    /// `period` must divide 24h, be non-zero, and be at most 24h (§3).
    pub fn validate_period(period: Duration) -> Result<(), ExportConfigError> {
        let secs = period.num_seconds();
        let day = Duration::hours(24).num_seconds();
        if secs <= 0 {
            return Err(ExportConfigError::NonPositivePeriod);
        }
        if secs > day {
            return Err(ExportConfigError::PeriodExceedsDay);
        }
        if day % secs != 0 {
            return Err(ExportConfigError::PeriodDoesNotDivideDay);
        }
        Ok(())
    }

    /// A config is active at `now` when `from < now` and (`thru` is unset or `now <= thru`).
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.from < now && self.thru.map(|thru| now <= thru).unwrap_or(true)
    }

    /// Logically deletes the config by setting `thru` to a timestamp in the past.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.thru = Some(now - Duration::seconds(1));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExportConfigError {
    #[error("export config period must be positive")]
    NonPositivePeriod,
    #[error("export config period must not exceed 24h")]
    PeriodExceedsDay,
    #[error("export config period must evenly divide 24h")]
    PeriodDoesNotDivideDay,
}
