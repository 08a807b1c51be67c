use chrono::{DateTime, NaiveDateTime, Utc};

use crate::contract::ValidationError;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a notification or inventory timestamp, normalizing to UTC.
///
/// Accepts RFC 3339 values (with `Z` or an explicit offset) and offset-less
/// values, which are interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Ok(value.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(ValidationError::new(format!(
        "unrecognized timestamp '{raw}'"
    )))
}

/// Elapsed wall-clock time between two instants, in whole days.
///
/// The fractional remainder is discarded, so 1 day 23 hours counts as 1 day.
pub fn elapsed_whole_days(now: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    now.signed_duration_since(earlier).num_days()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn instant(raw: &str) -> DateTime<Utc> {
        raw.parse().expect("test timestamp should parse")
    }

    #[test]
    fn parses_zulu_timestamp() {
        let parsed = parse_timestamp("2026-02-14T21:41:32.765Z").expect("timestamp should parse");
        assert_eq!(parsed, instant("2026-02-14T21:41:32.765Z"));
    }

    #[test]
    fn normalizes_explicit_offset_to_utc() {
        let parsed = parse_timestamp("2026-02-14T23:00:00+02:00").expect("timestamp should parse");
        assert_eq!(parsed, instant("2026-02-14T21:00:00Z"));
    }

    #[test]
    fn treats_offsetless_timestamp_as_utc() {
        let parsed = parse_timestamp("2026-02-14T21:41:32").expect("timestamp should parse");
        assert_eq!(parsed, instant("2026-02-14T21:41:32Z"));
    }

    #[test]
    fn rejects_garbage_timestamp() {
        let error = parse_timestamp("yesterday").expect_err("garbage should fail");
        assert!(error.message().contains("unrecognized timestamp"));
    }

    #[test]
    fn discards_fractional_days() {
        let now = instant("2026-02-14T12:00:00Z");
        assert_eq!(elapsed_whole_days(now, now - Duration::hours(47)), 1);
        assert_eq!(elapsed_whole_days(now, now - Duration::hours(48)), 2);
        assert_eq!(elapsed_whole_days(now, now - Duration::minutes(30)), 0);
    }
}
