use chrono::{DateTime, Duration, TimeZone, Utc};

/// A 10-minute epoch index since the Unix epoch, matching the on-device
/// rolling interval numbering used by the exposure-notification protocol.
pub const INTERVAL_LENGTH: Duration = Duration::minutes(10);

/// Truncates `t` down to the most recent multiple of `window`.
///
/// `window` must be a positive duration that evenly divides 24h for the
/// "publish window" use described in the export scheduler; this function
/// itself has no such restriction, it is pure arithmetic.
pub fn truncate_window(t: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    let window_secs = window.num_seconds();
    assert!(window_secs > 0, "truncate_window: window must be positive");
    let t_secs = t.timestamp();
    let truncated = t_secs - t_secs.rem_euclid(window_secs);
    Utc.timestamp_opt(truncated, 0).single().expect("in range")
}

/// Converts a Unix timestamp (seconds) to an interval number (`unix(t)/600`).
pub fn interval_number(t: DateTime<Utc>) -> i32 {
    (t.timestamp() / INTERVAL_LENGTH.num_seconds()) as i32
}

/// Converts an interval number back to its start timestamp.
pub fn interval_to_time(interval_number: i32) -> DateTime<Utc> {
    Utc.timestamp_opt(interval_number as i64 * INTERVAL_LENGTH.num_seconds(), 0)
        .single()
        .expect("in range")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_the_hour() {
        let t = Utc.with_ymd_and_hms(2020, 12, 10, 10, 11, 0).unwrap();
        let truncated = truncate_window(t, Duration::hours(1));
        assert_eq!(truncated, Utc.with_ymd_and_hms(2020, 12, 10, 10, 0, 0).unwrap());
    }

    #[test]
    fn truncates_to_ten_minutes() {
        let t = Utc.with_ymd_and_hms(2020, 12, 10, 10, 11, 0).unwrap();
        let truncated = truncate_window(t, Duration::minutes(10));
        assert_eq!(truncated, Utc.with_ymd_and_hms(2020, 12, 10, 10, 10, 0).unwrap());
    }

    #[test]
    fn interval_number_round_trips_on_boundaries() {
        let t = Utc.with_ymd_and_hms(2020, 12, 10, 10, 10, 0).unwrap();
        let n = interval_number(t);
        assert_eq!(interval_to_time(n), t);
    }
}
