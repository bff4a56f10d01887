//! Date normalization for inbound bodies and outbound rows.
//!
//! Inbound dates are accepted only in the exact `YYYY-MM-DD` shape; the check
//! is on the digit pattern alone, so `2024-13-40` passes. Outbound values
//! may be any store representation that starts with such a date.

use chrono::{DateTime, Datelike, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Length of a `YYYY-MM-DD` date string
const DATE_LEN: usize = 10;

/// String values that mean "no date"
const EMPTY_SENTINELS: [&str; 4] = ["false", "0000-00-00", "null", "undefined"];

/// Whether `bytes` is exactly four digits, dash, two digits, dash, two digits.
fn is_date_shape(bytes: &[u8]) -> bool {
    bytes.len() == DATE_LEN
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Normalize an inbound date value.
///
/// Returns `None` for absent values, `false`, the sentinel strings
/// `"false"`, `"0000-00-00"`, `"null"`, `"undefined"`, blank strings, and
/// anything whose trimmed text is not exactly `YYYY-MM-DD`.
pub fn validate_date(input: Option<&Value>) -> Option<String> {
    let text = match input? {
        Value::Null | Value::Bool(false) => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    if EMPTY_SENTINELS.contains(&text.as_str()) {
        return None;
    }

    let trimmed = text.trim();
    if trimmed.is_empty() || !is_date_shape(trimmed.as_bytes()) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Format a calendar value from its own fields, zero-padded.
pub fn format_calendar_date<D: Datelike>(date: &D) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Format a stored date value as `YYYY-MM-DD`.
///
/// Strings beginning with a `YYYY-MM-DD` prefix keep their first ten
/// characters. Other strings are read as RFC 2822 date-times and formatted
/// from the calendar fields recorded in their own offset.
pub fn format_date(value: &Value) -> Option<String> {
    let Value::String(s) = value else {
        return None;
    };

    let bytes = s.as_bytes();
    if bytes.len() >= DATE_LEN && is_date_shape(&bytes[..DATE_LEN]) {
        return Some(s[..DATE_LEN].to_string());
    }

    DateTime::parse_from_rfc2822(s.trim())
        .ok()
        .map(|dt| format_calendar_date(&dt.naive_local()))
}

/// Format a stored audit timestamp as RFC 3339 in UTC with milliseconds.
///
/// SQLite-style `YYYY-MM-DD HH:MM:SS` values are read as UTC. Anything
/// else that cannot be parsed is returned as stored.
pub fn format_timestamp(value: &Value) -> Option<String> {
    let raw = match value {
        Value::Null => return None,
        Value::String(s) => s.as_str(),
        other => return Some(other.to_string()),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        );
    }

    for pattern in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true));
        }
    }

    Some(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn empty_inputs_are_no_date() {
        let inputs = [
            json!(null),
            json!(""),
            json!("false"),
            json!(false),
            json!("0000-00-00"),
            json!("null"),
            json!("undefined"),
            json!("  "),
        ];
        assert_eq!(validate_date(None), None);
        for input in &inputs {
            assert_eq!(validate_date(Some(input)), None, "input: {input}");
        }
    }

    #[test]
    fn exact_dates_pass_through() {
        assert_eq!(
            validate_date(Some(&json!("2024-03-15"))),
            Some("2024-03-15".to_string())
        );
        assert_eq!(
            validate_date(Some(&json!("  2024-03-15 "))),
            Some("2024-03-15".to_string())
        );
    }

    #[test]
    fn format_only_check_accepts_impossible_calendar_dates() {
        assert_eq!(
            validate_date(Some(&json!("2024-13-32"))),
            Some("2024-13-32".to_string())
        );
        assert_eq!(
            validate_date(Some(&json!("2024-00-00"))),
            Some("2024-00-00".to_string())
        );
    }

    #[test]
    fn other_shapes_are_dropped() {
        for input in [
            json!("2024-3-15"),
            json!("15/03/2024"),
            json!("2024-03-15T00:00:00Z"),
            json!("2024-03-15 10:00"),
            json!("20240315"),
            json!("abcd-ef-gh"),
            json!(true),
            json!(20240315),
            json!(["2024-03-15"]),
        ] {
            assert_eq!(validate_date(Some(&input)), None, "input: {input}");
        }
    }

    #[test]
    fn format_date_truncates_prefixed_strings() {
        assert_eq!(
            format_date(&json!("2024-03-15T08:30:00+08:00")),
            Some("2024-03-15".to_string())
        );
        assert_eq!(
            format_date(&json!("2024-03-15 00:00:00")),
            Some("2024-03-15".to_string())
        );
    }

    #[test]
    fn format_date_is_idempotent() {
        let once = format_date(&json!("2023-12-31")).unwrap();
        let twice = format_date(&json!(once.clone())).unwrap();
        assert_eq!(once, "2023-12-31");
        assert_eq!(once, twice);
    }

    #[test]
    fn format_date_uses_recorded_fields_not_utc() {
        // 00:30 at +08:00 is still the previous day in UTC
        assert_eq!(
            format_date(&json!("Fri, 15 Mar 2024 00:30:00 +0800")),
            Some("2024-03-15".to_string())
        );
    }

    #[test]
    fn format_date_rejects_non_dates() {
        assert_eq!(format_date(&Value::Null), None);
        assert_eq!(format_date(&json!("not a date")), None);
        assert_eq!(format_date(&json!(12)), None);
    }

    #[test]
    fn format_calendar_date_zero_pads() {
        let date = NaiveDate::from_ymd_opt(987, 1, 5).unwrap();
        assert_eq!(format_calendar_date(&date), "0987-01-05");
    }

    #[test]
    fn format_timestamp_normalizes_to_utc() {
        assert_eq!(
            format_timestamp(&json!("2024-03-15T08:30:00+08:00")),
            Some("2024-03-15T00:30:00.000Z".to_string())
        );
        assert_eq!(
            format_timestamp(&json!("2024-03-15 08:30:00")),
            Some("2024-03-15T08:30:00.000Z".to_string())
        );
        assert_eq!(format_timestamp(&Value::Null), None);
        assert_eq!(format_timestamp(&json!("garbage")), Some("garbage".to_string()));
    }
}
