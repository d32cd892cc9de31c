//! Rule schedule expressions.
//!
//! A schedule is a fixed interval written `<n><unit>`, where unit is one of
//! `m` (minutes), `h` (hours), `d` (days) or `w` (weeks), e.g. `30m` or `1d`.

use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;

use crate::error::CoreError;
use crate::types::Timestamp;

static SCHEDULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*([mhdw])\s*$").expect("valid regex"));

/// Longest accepted interval (one year).
const MAX_INTERVAL_MINUTES: i64 = 365 * 24 * 60;

/// Parse a schedule expression into an interval.
pub fn parse_schedule(expr: &str) -> Result<Duration, CoreError> {
    let invalid = || {
        CoreError::Validation(format!(
            "Invalid schedule '{expr}'. Expected <n><unit> with unit m, h, d or w (e.g. 6h)"
        ))
    };

    let caps = SCHEDULE_RE.captures(expr).ok_or_else(invalid)?;
    let n: i64 = caps[1].parse().map_err(|_| invalid())?;
    if n == 0 {
        return Err(invalid());
    }
    let minutes_per_unit = match &caps[2] {
        "m" => 1,
        "h" => 60,
        "d" => 24 * 60,
        "w" => 7 * 24 * 60,
        _ => return Err(invalid()),
    };
    let minutes = n
        .checked_mul(minutes_per_unit)
        .filter(|m| *m <= MAX_INTERVAL_MINUTES)
        .ok_or_else(|| {
            CoreError::Validation(format!("Schedule '{expr}' exceeds the one-year maximum"))
        })?;
    Ok(Duration::minutes(minutes))
}

/// Validate an optional schedule at rule-save time.
pub fn validate_schedule(expr: Option<&str>) -> Result<(), CoreError> {
    match expr {
        Some(e) => parse_schedule(e).map(|_| ()),
        None => Ok(()),
    }
}

/// A rule is due when it has never run or its last scan started at least one
/// interval before `now`.
pub fn is_due(interval: Duration, last_started: Option<Timestamp>, now: Timestamp) -> bool {
    match last_started {
        None => true,
        Some(started) => now - started >= interval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parses_each_unit() {
        assert_eq!(parse_schedule("30m").unwrap(), Duration::minutes(30));
        assert_eq!(parse_schedule("6h").unwrap(), Duration::hours(6));
        assert_eq!(parse_schedule(" 1d ").unwrap(), Duration::days(1));
        assert_eq!(parse_schedule("2w").unwrap(), Duration::weeks(2));
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "d", "0h", "-1d", "1.5h", "1 day", "daily", "1y", "10s"] {
            assert!(parse_schedule(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_rejects_over_a_year() {
        assert!(parse_schedule("52w").is_ok());
        let err = parse_schedule("53w").unwrap_err();
        assert!(err.to_string().contains("one-year maximum"));
        assert!(parse_schedule("99999999999999999999m").is_err());
    }

    #[test]
    fn test_optional_schedule() {
        assert!(validate_schedule(None).is_ok());
        assert!(validate_schedule(Some("12h")).is_ok());
        assert!(validate_schedule(Some("sometimes")).is_err());
    }

    #[test]
    fn test_due_logic() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let interval = Duration::hours(6);
        assert!(is_due(interval, None, now));
        assert!(is_due(interval, Some(now - Duration::hours(6)), now));
        assert!(!is_due(interval, Some(now - Duration::hours(5)), now));
    }
}
