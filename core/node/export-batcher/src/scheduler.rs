use chrono::{DateTime, Duration, Utc};
use tekx_config::ExportBatcherConfig;
use tekx_dal::CoreDal;
use tekx_db_connection::{connection::Core, ConnectionPool};
use tekx_locking::{LockOutcome, NamedLockService};
use tekx_types::{truncate_window, ExportConfig};

use crate::metrics::METRICS;

/// The lock the whole scheduler tick runs under (§4.4).
pub const CREATE_BATCHES_LOCK: &str = "create_batches";

/// Computes the tiled `[start, end)` ranges a config needs new batches for
/// (§4.4 `MakeBatchRanges`). `latest_end = None` means "no prior batches".
///
/// Ranges never extend past `TruncateWindow(now, publish_window)` (§3
/// invariant b, P2), and tile densely backward from `now` (or from a
/// single publish-window-aligned range when there is no history).
pub fn make_batch_ranges(
    period: Duration,
    latest_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    publish_window: Duration,
    sanity_date: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let publish_end = truncate_window(now, publish_window);

    let no_history = match latest_end {
        None => true,
        Some(latest_end) => latest_end < sanity_date,
    };

    if no_history {
        let end = truncate_window(publish_end, period);
        return vec![(end - period, end)];
    }
    let latest_end = latest_end.expect("no_history is false implies Some");

    let mut end = truncate_window(now, period);
    if end < latest_end {
        return Vec::new();
    }

    let mut ranges = Vec::new();
    while end > latest_end {
        let start = end - period;
        if end <= publish_end {
            ranges.push((start, end));
        }
        end = start;
    }
    ranges.reverse();
    ranges
}

/// Runs one scheduler tick (§4.4): under the global `create_batches` lock,
/// walks every active `ExportConfig` and inserts any new tiled ranges as
/// `OPEN` batches. Returns early without error if the lock is already held
/// — a scheduler tick that finds contention is a successful no-op.
pub async fn run_once(
    pool: &ConnectionPool<Core>,
    locks: &NamedLockService,
    config: &ExportBatcherConfig,
    publish_window: Duration,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let handle = match locks
        .lock(CREATE_BATCHES_LOCK, Duration::from_std(config.create_timeout)?)
        .await?
    {
        LockOutcome::Acquired(handle) => handle,
        LockOutcome::AlreadyLocked => {
            tracing::debug!("create_batches lock held elsewhere, skipping this tick");
            return Ok(());
        }
    };

    let result = run_for_every_active_config(pool, config, publish_window, now).await;

    if let Err(err) = &result {
        tracing::error!(%err, "scheduler tick failed");
    }
    locks.unlock(&handle).await?;
    result
}

async fn run_for_every_active_config(
    pool: &ConnectionPool<Core>,
    config: &ExportBatcherConfig,
    publish_window: Duration,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let mut conn = pool.connection_tagged("export_scheduler").await?;
    let configs = conn.export_config_dal().list_active(now).await?;
    drop(conn);

    for export_config in configs {
        if let Err(err) = schedule_one_config(pool, config, &export_config, publish_window, now).await {
            tracing::error!(config_id = export_config.config_id, %err, "failed to schedule batches for config");
        }
    }
    Ok(())
}

async fn schedule_one_config(
    pool: &ConnectionPool<Core>,
    batcher_config: &ExportBatcherConfig,
    export_config: &ExportConfig,
    publish_window: Duration,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let mut conn = pool.connection_tagged("export_scheduler").await?;
    let latest_end = conn.export_config_dal().latest_batch_end(export_config.config_id).await?;

    let ranges = make_batch_ranges(
        export_config.period(),
        latest_end,
        now,
        publish_window,
        batcher_config.sanity_date,
    );
    if ranges.is_empty() {
        return Ok(());
    }

    let mut tx = conn.start_transaction().await?;
    let inserted = tx
        .export_batch_dal()
        .insert_batches(
            export_config.config_id,
            &export_config.bucket_name,
            &export_config.filename_root,
            &export_config.region,
            &export_config.signature_info_ids,
            &ranges,
        )
        .await?;
    tx.commit().await?;

    METRICS.batches_created.inc_by(inserted);
    tracing::info!(config_id = export_config.config_id, inserted, "scheduled export batches");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn t(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 12, 10, h, m, 0).unwrap()
    }

    #[test]
    fn aligned_tiling() {
        let ranges = make_batch_ranges(Duration::hours(1), Some(t(7, 0)), t(10, 11), Duration::hours(1), DateTime::UNIX_EPOCH);
        assert_eq!(ranges, vec![(t(7, 0), t(8, 0)), (t(8, 0), t(9, 0)), (t(9, 0), t(10, 0))]);
    }

    #[test]
    fn no_history_small_window() {
        let ranges = make_batch_ranges(Duration::minutes(10), None, t(10, 11), Duration::hours(1), DateTime::UNIX_EPOCH);
        assert_eq!(ranges, vec![(t(9, 50), t(10, 0))]);
    }

    #[test]
    fn misaligned_overlap() {
        let ranges = make_batch_ranges(Duration::hours(1), Some(t(9, 15)), t(10, 11), Duration::hours(1), DateTime::UNIX_EPOCH);
        assert_eq!(ranges, vec![(t(9, 0), t(10, 0))]);
    }

    #[test]
    fn no_batches_when_already_caught_up() {
        let ranges = make_batch_ranges(Duration::hours(1), Some(t(10, 30)), t(10, 11), Duration::hours(1), DateTime::UNIX_EPOCH);
        assert!(ranges.is_empty());
    }
}
