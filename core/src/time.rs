//! Timestamp parsing and duration formatting.
//!
//! Job payloads carry timestamps as epoch seconds, epoch milliseconds or
//! ISO-8601 strings with or without a zone. Everything is normalized to UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::NOT_AVAILABLE;

/// Epoch values with a larger magnitude are taken to be milliseconds.
pub const MILLIS_THRESHOLD: f64 = 1e10;

/// Display format for report timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a raw timestamp value into a UTC instant.
///
/// Numbers and numeric strings are epoch seconds, or milliseconds when their
/// magnitude exceeds [`MILLIS_THRESHOLD`]. Other strings are read as
/// ISO-8601; a trailing `Z` means UTC and a missing zone is assumed UTC.
/// `null`, `""` and `"N/A"` are absent. Anything unparseable yields `None`.
///
/// # Examples
///
/// ```
/// use backup_report_core::parse_timestamp;
/// use serde_json::json;
///
/// let from_secs = parse_timestamp(&json!(1704067200)).unwrap();
/// let from_millis = parse_timestamp(&json!(1704067200000_i64)).unwrap();
/// let from_iso = parse_timestamp(&json!("2024-01-01T00:00:00Z")).unwrap();
/// assert_eq!(from_secs, from_millis);
/// assert_eq!(from_secs, from_iso);
/// assert!(parse_timestamp(&json!("yesterday")).is_none());
/// ```
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_f64().and_then(from_epoch),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
                return None;
            }
            if let Ok(num) = trimmed.parse::<f64>() {
                if let Some(dt) = from_epoch(num) {
                    return Some(dt);
                }
            }
            parse_iso(trimmed)
        }
        _ => None,
    }
}

fn from_epoch(num: f64) -> Option<DateTime<Utc>> {
    if !num.is_finite() {
        return None;
    }
    let secs = if num.abs() > MILLIS_THRESHOLD {
        num / 1000.0
    } else {
        num
    };
    let micros = (secs * 1_000_000.0).round();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64)
}

fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(stem) => format!("{stem}+00:00"),
        None => raw.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats an instant as `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Formats a whole number of seconds as `"<h>h <m>m <s>s"`, omitting
/// leading zero units. Negative durations are not reportable.
///
/// # Examples
///
/// ```
/// use backup_report_core::format_seconds;
///
/// assert_eq!(format_seconds(3725).as_deref(), Some("1h 2m 5s"));
/// assert_eq!(format_seconds(900).as_deref(), Some("15m 0s"));
/// assert_eq!(format_seconds(42).as_deref(), Some("42s"));
/// assert_eq!(format_seconds(-1), None);
/// ```
pub fn format_seconds(total: i64) -> Option<String> {
    if total < 0 {
        return None;
    }
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    Some(if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    })
}

/// Elapsed time between two instants, truncated to whole seconds.
pub fn duration_between(start: &DateTime<Utc>, end: &DateTime<Utc>) -> Option<String> {
    format_seconds((*end - *start).num_seconds())
}

/// Formats an explicit duration field given in seconds.
///
/// Accepts numbers and numeric strings; fractional seconds are truncated.
pub fn format_duration_value(value: &Value) -> Option<String> {
    let secs = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    if !secs.is_finite() || secs.abs() >= i64::MAX as f64 {
        return None;
    }
    format_seconds(secs.trunc() as i64)
}
