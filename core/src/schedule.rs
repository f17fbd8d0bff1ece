//! Schedule normalization and per-field extraction.
//!
//! Schedules arrive as plain lists, id-keyed maps or wrapped in a
//! `{"schedules": ...}` object. [`normalize_schedules`] turns every shape
//! into a list of objects, and [`ScheduleRecord::from_schedule`] reads the
//! five report fields out of each one using alias chains: direct keys on the
//! schedule first, then a depth-first search of the whole schedule.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::NOT_AVAILABLE;
use crate::payload::{
    find_all_in, first_truthy, is_empty_value, is_truthy, unwrap_payload, value_text,
};

const ENABLED_DIRECT_KEYS: &[&str] = &["enabled", "enable"];
const STATE_KEYS: &[&str] = &["state", "status"];
const ENABLED_SEARCH_KEYS: &[&str] = &["enabled", "enable", "state", "status"];
const TRUTHY_STATES: &[&str] = &["true", "enabled", "enable", "on", "active", "1"];
const LOCATION_KEYS: &[&str] = &[
    "location",
    "location_url",
    "url",
    "target",
    "dest",
    "destination",
];
const LOCATION_TYPE_KEYS: &[&str] = &["location_type", "type", "protocol", "scheme"];

const RECURRENCE_KEYS: &[&str] = &[
    "hour",
    "minute",
    "days",
    "period",
    "type",
    "time",
    "cron",
    "cron_expr",
    "cron_expression",
    "frequency",
    "interval",
];
const RECURRENCE_CONTAINER_KEYS: &[&str] = &["recurrence", "schedule", "recurrence_info"];
const CRON_KEYS: &[&str] = &["cron", "cron_expr", "cron_expression"];
const PERIOD_KEYS: &[&str] = &["period", "type", "frequency", "interval"];
const ISO_WEEKDAY_CODES: [&str; 7] = ["1", "2", "3", "4", "5", "6", "7"];
const WEEKDAYS: [&str; 7] = [
    "MONDAY",
    "TUESDAY",
    "WEDNESDAY",
    "THURSDAY",
    "FRIDAY",
    "SATURDAY",
    "SUNDAY",
];

const RETENTION_SEARCH_KEYS: &[&str] = &[
    "max_count",
    "num_backups",
    "count",
    "days",
    "weeks",
    "months",
    "retention",
    "retention_info",
    "retention_policy",
];
const RETENTION_FLAT_KEYS: &[&str] = &["max_count", "num_backups", "count", "days", "weeks", "months"];
const RETENTION_CONTAINER_KEYS: &[&str] = &["retention", "retention_info", "retention_policy"];
const RETENTION_NESTED_KEYS: &[&str] = &["max_count", "count", "days", "weeks", "months"];

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("static regex must compile"));

/// Canonical view of one configured backup schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    /// Whether the schedule is active.
    pub enabled: bool,
    /// Backup destination, or `"N/A"`.
    pub location: String,
    /// Uppercased destination protocol, or `"N/A"`.
    pub location_type: String,
    /// Recurrence description such as `"WEEKLY 02:30 MONDAY"`, or `"N/A"`.
    pub recurrence: String,
    /// Retention description such as `"max_count=7"`, or `"N/A"`.
    pub retention: String,
}

impl ScheduleRecord {
    /// Extracts all report fields from one normalized schedule object.
    pub fn from_schedule(schedule: &Map<String, Value>) -> Self {
        let location = extract_location(schedule);
        let location_type = extract_location_type(&location, schedule);
        Self {
            enabled: extract_enabled(schedule),
            location,
            location_type,
            recurrence: extract_recurrence(schedule),
            retention: extract_retention(schedule),
        }
    }
}

/// Converts a raw schedules payload into a list of schedule objects.
///
/// Lists keep their object entries in order. An object holding a
/// `"schedules"` key is descended into. Any other object is treated as an
/// id-keyed map: each object value becomes a schedule, with `"id"` set to
/// its key when missing. Everything else yields no schedules.
///
/// # Examples
///
/// ```
/// use backup_report_core::normalize_schedules;
/// use serde_json::json;
///
/// let by_id = json!({"value": {"daily": {"enabled": true}, "note": "x"}});
/// let schedules = normalize_schedules(&by_id);
/// assert_eq!(schedules.len(), 1);
/// assert_eq!(schedules[0]["id"], json!("daily"));
///
/// assert!(normalize_schedules(&json!(42)).is_empty());
/// ```
pub fn normalize_schedules(raw: &Value) -> Vec<Cow<'_, Map<String, Value>>> {
    let mut current = unwrap_payload(raw);
    loop {
        match current {
            Value::Array(items) => {
                return items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(Cow::Borrowed)
                    .collect();
            }
            Value::Object(map) => {
                if let Some(inner) = map.get("schedules") {
                    current = unwrap_payload(inner);
                    continue;
                }
                return map
                    .iter()
                    .filter_map(|(id, value)| value.as_object().map(|schedule| (id, schedule)))
                    .map(|(id, schedule)| {
                        if schedule.contains_key("id") {
                            Cow::Borrowed(schedule)
                        } else {
                            let mut owned = schedule.clone();
                            owned.insert("id".to_string(), Value::String(id.clone()));
                            Cow::Owned(owned)
                        }
                    })
                    .collect();
            }
            _ => return Vec::new(),
        }
    }
}

fn state_is_on(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => {
            let lowered = s.to_lowercase();
            TRUTHY_STATES
                .contains(&lowered.as_str())
                .then_some(true)
        }
        _ => None,
    }
}

/// Reads the schedule's enabled flag.
///
/// A present `enabled`/`enable` key decides on its own by truthiness, so any
/// non-empty string counts as enabled.
pub fn extract_enabled(schedule: &Map<String, Value>) -> bool {
    if let Some(value) = ENABLED_DIRECT_KEYS.iter().find_map(|key| schedule.get(*key)) {
        return is_truthy(value);
    }
    if let Some(on) = STATE_KEYS
        .iter()
        .filter_map(|key| schedule.get(*key))
        .find_map(state_is_on)
    {
        return on;
    }

    let found = find_all_in(schedule, ENABLED_SEARCH_KEYS);
    match found.first_truthy(ENABLED_SEARCH_KEYS) {
        Some(Value::Bool(b)) => *b,
        Some(value @ Value::String(_)) => state_is_on(value).unwrap_or(false),
        _ => false,
    }
}

/// Reads the backup destination.
pub fn extract_location(schedule: &Map<String, Value>) -> String {
    lookup_text(schedule, LOCATION_KEYS).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Reads the destination protocol, falling back to the scheme of `location`.
pub fn extract_location_type(location: &str, schedule: &Map<String, Value>) -> String {
    if let Some(kind) = lookup_text(schedule, LOCATION_TYPE_KEYS) {
        return kind.to_uppercase();
    }
    match location.split_once("://") {
        Some((scheme, _)) => scheme.to_uppercase(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Builds a recurrence description.
///
/// Precedence: cron expression, then weekday list, then period, then a bare
/// daily time.
///
/// # Examples
///
/// ```
/// use backup_report_core::extract_recurrence;
/// use serde_json::json;
///
/// let schedule = json!({"recurrence": {"hour": 23, "minute": 5, "days": ["saturday"]}});
/// let recurrence = extract_recurrence(schedule.as_object().unwrap());
/// assert_eq!(recurrence, "WEEKLY 23:05 SAT");
/// ```
pub fn extract_recurrence(schedule: &Map<String, Value>) -> String {
    let found = find_all_in(schedule, RECURRENCE_KEYS);
    let secondary = RECURRENCE_CONTAINER_KEYS
        .iter()
        .filter_map(|key| schedule.get(*key))
        .find(|value| is_truthy(value))
        .and_then(Value::as_object);
    let from_secondary = |key: &str| secondary.and_then(|rec| rec.get(key));

    if let Some(cron) = found.first_truthy(CRON_KEYS) {
        return format!("CRON {}", value_text(cron));
    }

    let hour = found.get("hour").or_else(|| from_secondary("hour"));
    let minute = found.get("minute").or_else(|| from_secondary("minute"));
    let clock = format_clock(hour, minute, found.get("time"));
    let period = found
        .first_truthy(PERIOD_KEYS)
        .map(|value| value_text(value).to_uppercase());
    let days = found.get("days").or_else(|| from_secondary("days"));
    let days = days.and_then(format_days);

    match (clock, days, period) {
        (Some(clock), Some(days), period) => {
            let period = period.unwrap_or_else(|| "WEEKLY".to_string());
            format!("{period} {clock} {days}")
        }
        (Some(clock), None, Some(period)) => format!("{period} {clock}"),
        (Some(clock), None, None) => format!("DAILY {clock}"),
        (None, _, _) => NOT_AVAILABLE.to_string(),
    }
}

/// Builds a retention description from flat count keys, or from a nested
/// retention object when no flat key is present. The two are never merged.
///
/// # Examples
///
/// ```
/// use backup_report_core::extract_retention;
/// use serde_json::json;
///
/// let flat = json!({"max_count": 7, "weeks": 4});
/// assert_eq!(extract_retention(flat.as_object().unwrap()), "max_count=7, weeks=4");
/// ```
pub fn extract_retention(schedule: &Map<String, Value>) -> String {
    let found = find_all_in(schedule, RETENTION_SEARCH_KEYS);

    let flat: Vec<String> = RETENTION_FLAT_KEYS
        .iter()
        .filter_map(|key| found.get(key).map(|value| format!("{key}={}", value_text(value))))
        .collect();
    if !flat.is_empty() {
        return flat.join(", ");
    }

    for key in RETENTION_CONTAINER_KEYS {
        let container = found
            .get(key)
            .filter(|value| is_truthy(value))
            .or_else(|| schedule.get(*key));
        let Some(Value::Object(policy)) = container else {
            continue;
        };
        let nested: Vec<String> = RETENTION_NESTED_KEYS
            .iter()
            .filter_map(|inner| {
                policy
                    .get(*inner)
                    .filter(|value| !is_empty_value(value))
                    .map(|value| format!("{inner}={}", value_text(value)))
            })
            .collect();
        if !nested.is_empty() {
            return nested.join(", ");
        }
    }

    NOT_AVAILABLE.to_string()
}

/// Direct keys first, then a depth-first search; first truthy value wins.
fn lookup_text(schedule: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    if let Some(value) = first_truthy(schedule, keys) {
        return Some(value_text(value));
    }
    find_all_in(schedule, keys).first_truthy(keys).map(value_text)
}

fn format_clock(hour: Option<&Value>, minute: Option<&Value>, time: Option<&Value>) -> Option<String> {
    if let Some(Value::String(raw)) = time {
        if let Some(caps) = CLOCK_RE.captures(raw.trim()) {
            let hh: u32 = caps[1].parse().ok()?;
            let mm: u32 = caps[2].parse().ok()?;
            return Some(format!("{hh:02}:{mm:02}"));
        }
    }
    match (hour.and_then(Value::as_i64), minute.and_then(Value::as_i64)) {
        (Some(hh), Some(mm)) => Some(format!("{hh:02}:{mm:02}")),
        _ => None,
    }
}

fn format_days(days: &Value) -> Option<String> {
    let Value::Array(items) = days else {
        return None;
    };
    if items.is_empty() {
        return None;
    }
    let names: Vec<String> = items.iter().map(format_day).collect();
    Some(names.join(","))
}

fn format_day(day: &Value) -> String {
    let text = value_text(day).to_uppercase();
    if let Some(index) = ISO_WEEKDAY_CODES.iter().position(|code| *code == text) {
        return WEEKDAYS[index].to_string();
    }
    if text.chars().count() > 3 {
        text.chars().take(3).collect()
    } else {
        text
    }
}
