//! Canonical timestamp encoding
//!
//! Result timestamps are stored as `yyyy-MM-dd'T'HH:mm:ss.SSS` followed by a
//! numeric UTC offset, e.g. `2017-10-16T22:28:09.000-02:30`.

use chrono::{DateTime, FixedOffset, SubsecRound, Utc};

/// `strftime` rendering of the canonical timestamp pattern
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Format a timestamp in the canonical pattern
#[inline]
#[must_use]
pub fn format_timestamp(value: &DateTime<FixedOffset>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp written in the canonical pattern
///
/// RFC 3339 strings (e.g. with a `Z` suffix or other sub-second precision)
/// are accepted as well and truncated to millisecond precision.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .ok()
        .map(|value| value.trunc_subsecs(3))
}

/// Current time at the precision the canonical format can represent
#[inline]
#[must_use]
pub fn now_millis() -> DateTime<FixedOffset> {
    Utc::now().trunc_subsecs(3).fixed_offset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_offset_and_millis() {
        let offset = FixedOffset::west_opt(2 * 3600 + 30 * 60).unwrap();
        let value = offset.with_ymd_and_hms(2017, 10, 16, 22, 28, 9).unwrap();
        assert_eq!(format_timestamp(&value), "2017-10-16T22:28:09.000-02:30");
    }

    #[test]
    fn parses_canonical_pattern() {
        let value = parse_timestamp("2017-10-16T22:30:09.000-02:30").unwrap();
        assert_eq!(value.offset().local_minus_utc(), -(2 * 3600 + 30 * 60));
        assert_eq!(format_timestamp(&value), "2017-10-16T22:30:09.000-02:30");
    }

    #[test]
    fn parses_rfc3339_fallback() {
        let value = parse_timestamp("2020-01-02T03:04:05.123456Z").unwrap();
        assert_eq!(format_timestamp(&value), "2020-01-02T03:04:05.123+00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn now_round_trips_exactly() {
        let now = now_millis();
        let parsed = parse_timestamp(&format_timestamp(&now)).unwrap();
        assert_eq!(parsed, now);
    }
}
