//! Time range of a query
//!
//! `TimeRange` is the dashboard's active range. It is immutable for the
//! duration of one query and is the only input of the macro resolver.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static RELATIVE_TIME: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^now-(\d+)([smhdwMy])$").expect("relative time pattern is valid")
});

/// A time interval for queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Create a new time range
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Create a range from Unix timestamps in milliseconds, returning None if
    /// either is out of range
    pub fn from_millis(from: i64, to: i64) -> Option<Self> {
        let from = Utc.timestamp_millis_opt(from).single()?;
        let to = Utc.timestamp_millis_opt(to).single()?;
        Some(Self { from, to })
    }

    /// Create a range for the last N hours from now
    pub fn last_hours(hours: i64) -> Self {
        let to = Utc::now();
        Self {
            from: to - Duration::hours(hours),
            to,
        }
    }

    /// `from` as ISO-8601 with millisecond precision, e.g. `2021-05-17T20:48:09.000Z`
    pub fn iso_from(&self) -> String {
        iso_format(&self.from)
    }

    /// `to` as ISO-8601 with millisecond precision
    pub fn iso_to(&self) -> String {
        iso_format(&self.to)
    }

    /// `from` as whole seconds since the Unix epoch, rounded down
    pub fn unix_from(&self) -> i64 {
        self.from.timestamp()
    }

    /// `to` as whole seconds since the Unix epoch, rounded down
    pub fn unix_to(&self) -> i64 {
        self.to.timestamp()
    }
}

fn iso_format(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a range bound relative to `now`
///
/// Accepts `now`, `now-<n><unit>` (units `s m h d w M y`), RFC 3339 timestamps
/// and Unix timestamps in seconds.
pub fn parse_time_bound(input: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if input == "now" {
        return Some(now);
    }

    if let Some(caps) = RELATIVE_TIME.captures(input) {
        let amount: i64 = caps[1].parse().ok()?;
        let offset = match &caps[2] {
            "s" => Duration::seconds(amount),
            "m" => Duration::minutes(amount),
            "h" => Duration::hours(amount),
            "d" => Duration::days(amount),
            "w" => Duration::weeks(amount),
            "M" => Duration::days(amount * 30),
            "y" => Duration::days(amount * 365),
            _ => return None,
        };
        return Some(now - offset);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    input
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TimeRange {
        TimeRange::new(
            "2021-05-17T20:48:09.000Z".parse().unwrap(),
            "2021-05-17T20:50:23.000Z".parse().unwrap(),
        )
    }

    #[test]
    fn test_iso_format() {
        let range = sample();
        assert_eq!(range.iso_from(), "2021-05-17T20:48:09.000Z");
        assert_eq!(range.iso_to(), "2021-05-17T20:50:23.000Z");
    }

    #[test]
    fn test_unix_seconds() {
        let range = sample();
        assert_eq!(range.unix_from(), 1621284489);
        assert_eq!(range.unix_to(), 1621284623);
    }

    #[test]
    fn test_unix_seconds_round_down() {
        let range = TimeRange::from_millis(1_621_284_489_999, 1_621_284_490_001).unwrap();
        assert_eq!(range.unix_from(), 1621284489);
        assert_eq!(range.unix_to(), 1621284490);
        assert_eq!(range.iso_from(), "2021-05-17T20:48:09.999Z");
    }

    #[test]
    fn test_unix_seconds_before_epoch_round_down() {
        let range = TimeRange::from_millis(-1, -1_500).unwrap();
        assert_eq!(range.unix_from(), -1);
        assert_eq!(range.unix_to(), -2);
        assert_eq!(range.iso_from(), "1969-12-31T23:59:59.999Z");
    }

    #[test]
    fn test_parse_time_bound() {
        let now: DateTime<Utc> = "2024-01-10T12:00:00Z".parse().unwrap();

        assert_eq!(parse_time_bound("now", now), Some(now));
        assert_eq!(
            parse_time_bound("now-6h", now),
            Some("2024-01-10T06:00:00Z".parse().unwrap())
        );
        assert_eq!(
            parse_time_bound("now-2d", now),
            Some("2024-01-08T12:00:00Z".parse().unwrap())
        );
        assert_eq!(
            parse_time_bound("2021-05-17T20:48:09Z", now),
            Some("2021-05-17T20:48:09Z".parse().unwrap())
        );
        assert_eq!(
            parse_time_bound("1621284489", now),
            Some("2021-05-17T20:48:09Z".parse().unwrap())
        );
        assert_eq!(parse_time_bound("yesterday-ish", now), None);
    }
}
