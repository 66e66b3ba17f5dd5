//! Human-readable timestamps

use chrono::{Local, TimeZone};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Relative label for `timestamp` as seen at `now`
///
/// Buckets are half-open on the lower bound: exactly 60 seconds is
/// "1 min ago", not "just now". Timestamps in the future read "just now".
pub fn relative_time(timestamp: i64, now: i64) -> String {
    let diff = now - timestamp;

    if diff < MINUTE {
        "just now".to_string()
    } else if diff < HOUR {
        format!("{} min ago", diff / MINUTE)
    } else if diff < DAY {
        let hrs = diff / HOUR;
        format!("{} hr{} ago", hrs, if hrs > 1 { "s" } else { "" })
    } else if diff < 2 * DAY {
        "yesterday".to_string()
    } else {
        format!("{} days ago", diff / DAY)
    }
}

/// Local wall-clock rendering of `timestamp`
pub fn format_timestamp(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}
