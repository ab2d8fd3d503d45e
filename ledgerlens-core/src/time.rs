//! Time utilities: epoch-millis timestamps to local calendar dates.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse an IANA timezone name like "Asia/Kolkata".
pub fn parse_timezone(tz: &str) -> Option<Tz> {
    tz.trim().parse().ok()
}

/// Calendar date of an epoch-millis timestamp in `tz`.
///
/// `0` (and anything chrono can't represent) means "unknown", which resolves
/// to the date of `now` instead.
pub fn local_date_from_millis(millis: i64, tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    let instant = if millis > 0 {
        Utc.timestamp_millis_opt(millis).single().unwrap_or(now)
    } else {
        now
    };
    instant.with_timezone(&tz).date_naive()
}
