//! Job-history discovery and last-job selection.
//!
//! Job payloads nest execution records under summary keys, inside lists, or
//! in maps keyed by job id. [`collect_job_candidates`] finds every fragment
//! that looks like a job run, [`select_last_job`] ranks them by recency, and
//! [`JobSummary::from_candidate`] renders the winner for the report.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::NOT_AVAILABLE;
use crate::payload::{first_truthy, unwrap_payload, value_text};
use crate::time::{duration_between, format_duration_value, format_timestamp, parse_timestamp};

/// Keys whose presence marks an object as a job run.
pub const JOB_MARKER_KEYS: &[&str] = &[
    "status",
    "start_time",
    "end_time",
    "duration",
    "operation",
    "service",
    "size",
    "backup_size",
];

/// Keys under which job payloads nest the interesting run.
pub const JOB_CONTAINER_KEYS: &[&str] = &["details", "last", "latest", "most_recent", "summary"];

/// Key carrying the id of a job found in an id-keyed map.
pub const JOB_ID_KEY: &str = "_job_id";

const END_KEYS: &[&str] = &["end_time", "end", "completed", "completion_time", "finish_time"];
const START_KEYS: &[&str] = &["start_time", "start", "started", "begin_time", "queued_time"];
const STATUS_KEYS: &[&str] = &["status", "state", "result"];
const SIZE_KEYS: &[&str] = &["size", "backup_size", "bytes_transferred", "transferred", "total_bytes"];

/// Size values above this many bytes are converted to megabytes; smaller
/// values are taken to be megabytes already.
pub const BYTES_THRESHOLD: f64 = 5.0 * 1024.0 * 1024.0;

/// Status reported when a host has no job history.
pub const NO_JOB_STATUS: &str = "NO JOB";

static JOB_ID_TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{8})-(\d{6})").expect("static regex must compile"));

/// Returns `true` when `map` carries at least one [`JOB_MARKER_KEYS`] key.
pub fn looks_like_job(map: &Map<String, Value>) -> bool {
    JOB_MARKER_KEYS.iter().any(|key| map.contains_key(*key))
}

/// One job-run fragment discovered in a host's job history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobCandidate<'a> {
    /// The job object as found in the payload.
    pub record: &'a Map<String, Value>,
    /// Key of the enclosing id-keyed map, when the job was found there.
    pub assigned_id: Option<&'a str>,
}

impl<'a> JobCandidate<'a> {
    /// A job found directly, not through an id-keyed map.
    pub fn direct(record: &'a Map<String, Value>) -> Self {
        Self {
            record,
            assigned_id: None,
        }
    }

    /// A job found as the value of `id` in an id-keyed map.
    pub fn tagged(record: &'a Map<String, Value>, id: &'a str) -> Self {
        Self {
            record,
            assigned_id: Some(id),
        }
    }

    /// The job id: an explicit `_job_id` on the record, else the assigned one.
    pub fn job_id(&self) -> Option<String> {
        match self.record.get(JOB_ID_KEY) {
            Some(Value::Null) | None => self.assigned_id.map(str::to_string),
            Some(explicit) => Some(value_text(explicit)),
        }
    }

    fn end_value(&self) -> Option<&'a Value> {
        first_truthy(self.record, END_KEYS)
    }

    fn start_value(&self) -> Option<&'a Value> {
        first_truthy(self.record, START_KEYS)
    }

    /// End instant, falling back to a `YYYYMMDD-HHMMSS` job-id prefix.
    pub fn end_score(&self) -> Option<DateTime<Utc>> {
        self.end_value()
            .and_then(parse_timestamp)
            .or_else(|| self.job_id().as_deref().and_then(timestamp_from_job_id))
    }

    /// Start instant. There is no id-based fallback.
    pub fn start_score(&self) -> Option<DateTime<Utc>> {
        self.start_value().and_then(parse_timestamp)
    }

    /// Ranking key; absent scores sort below every present one.
    pub fn rank(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (self.end_score(), self.start_score())
    }
}

/// Parses the `YYYYMMDD-HHMMSS` prefix of a job id as a UTC instant.
///
/// # Examples
///
/// ```
/// use backup_report_core::timestamp_from_job_id;
///
/// let ts = timestamp_from_job_id("20240101-020000-abc").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2024-01-01T02:00:00+00:00");
/// assert!(timestamp_from_job_id("job-42").is_none());
/// ```
pub fn timestamp_from_job_id(job_id: &str) -> Option<DateTime<Utc>> {
    let caps = JOB_ID_TIMESTAMP_RE.captures(job_id)?;
    let stamp = format!("{}{}", &caps[1], &caps[2]);
    NaiveDateTime::parse_from_str(&stamp, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

enum Work<'a> {
    Visit(&'a Value),
    Emit(JobCandidate<'a>),
}

/// Collects every job-like fragment from a raw job-history payload.
///
/// For an object, the object itself comes first when it looks like a job,
/// then everything found under [`JOB_CONTAINER_KEYS`], then each remaining
/// job-like child object tagged with its key. Arrays contribute the
/// candidates of each object element in order. Duplicates are kept.
pub fn collect_job_candidates(raw: &Value) -> Vec<JobCandidate<'_>> {
    let mut candidates = Vec::new();
    let mut stack = vec![Work::Visit(raw)];

    while let Some(work) = stack.pop() {
        let node = match work {
            Work::Emit(candidate) => {
                candidates.push(candidate);
                continue;
            }
            Work::Visit(node) => unwrap_payload(node),
        };

        match node {
            Value::Array(items) => {
                stack.extend(
                    items
                        .iter()
                        .rev()
                        .filter(|item| item.is_object())
                        .map(Work::Visit),
                );
            }
            Value::Object(map) => {
                let tagged = map.iter().filter_map(|(key, value)| {
                    if JOB_CONTAINER_KEYS.contains(&key.as_str()) {
                        return None;
                    }
                    value
                        .as_object()
                        .filter(|child| looks_like_job(child))
                        .map(|child| Work::Emit(JobCandidate::tagged(child, key)))
                });
                let tagged: Vec<Work<'_>> = tagged.collect();
                stack.extend(tagged.into_iter().rev());

                let nested: Vec<Work<'_>> = JOB_CONTAINER_KEYS
                    .iter()
                    .filter_map(|key| map.get(*key))
                    .filter(|value| value.is_object() || value.is_array())
                    .map(Work::Visit)
                    .collect();
                stack.extend(nested.into_iter().rev());

                if looks_like_job(map) {
                    stack.push(Work::Emit(JobCandidate::direct(map)));
                }
            }
            _ => {}
        }
    }

    candidates
}

/// Picks the most recent candidate by `(end, start)` descending.
///
/// The sort is stable, so among equally ranked candidates the one collected
/// first wins.
pub fn select_last_job<'a>(candidates: &[JobCandidate<'a>]) -> Option<JobCandidate<'a>> {
    let mut ranked: Vec<_> = candidates
        .iter()
        .map(|candidate| (candidate.rank(), *candidate))
        .collect();
    ranked.sort_by(|(a, _), (b, _)| b.cmp(a));
    ranked.into_iter().next().map(|(_, candidate)| candidate)
}

/// Report view of a host's most recent job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    /// Uppercased job status, `"UNKNOWN"`, or `"NO JOB"` for the sentinel.
    pub status: String,
    /// Formatted start time, or `"N/A"`.
    pub start: String,
    /// Formatted end time, or `"N/A"`.
    pub end: String,
    /// Formatted duration, or `"N/A"`.
    pub duration: String,
    /// Backup size in megabytes; 0 when unknown.
    pub size_mb: u64,
}

impl Default for JobSummary {
    fn default() -> Self {
        Self::no_job()
    }
}

impl JobSummary {
    /// Sentinel summary for hosts without any job candidate.
    pub fn no_job() -> Self {
        Self {
            status: NO_JOB_STATUS.to_string(),
            start: NOT_AVAILABLE.to_string(),
            end: NOT_AVAILABLE.to_string(),
            duration: NOT_AVAILABLE.to_string(),
            size_mb: 0,
        }
    }

    /// Renders one selected candidate.
    pub fn from_candidate(candidate: &JobCandidate<'_>) -> Self {
        let record = candidate.record;
        let status = first_truthy(record, STATUS_KEYS)
            .map(|value| value_text(value).to_uppercase())
            .unwrap_or_else(|| "UNKNOWN".to_string());
        let start = candidate.start_value().and_then(parse_timestamp);
        let end = candidate.end_value().and_then(parse_timestamp);

        let duration = match (&start, &end) {
            (Some(start), Some(end)) => duration_between(start, end),
            _ => None,
        }
        .or_else(|| {
            record
                .get("duration")
                .filter(|value| !value.is_null())
                .and_then(format_duration_value)
        });

        let size_mb = first_truthy(record, SIZE_KEYS).map_or(0, to_megabytes);

        Self {
            status,
            start: start.as_ref().map_or_else(|| NOT_AVAILABLE.to_string(), format_timestamp),
            end: end.as_ref().map_or_else(|| NOT_AVAILABLE.to_string(), format_timestamp),
            duration: duration.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            size_mb,
        }
    }
}

/// Converts a raw size to whole megabytes, rounding half to even.
///
/// Values above [`BYTES_THRESHOLD`] are bytes; smaller values are already
/// megabytes. Negative or non-numeric input yields 0.
///
/// # Examples
///
/// ```
/// use backup_report_core::to_megabytes;
/// use serde_json::json;
///
/// assert_eq!(to_megabytes(&json!(500000000)), 477);
/// assert_eq!(to_megabytes(&json!("12.5")), 12);
/// assert_eq!(to_megabytes(&json!("large")), 0);
/// ```
pub fn to_megabytes(value: &Value) -> u64 {
    let num = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(num) = num.filter(|n| n.is_finite() && *n > 0.0) else {
        return 0;
    };
    let mb = if num > BYTES_THRESHOLD {
        num / (1024.0 * 1024.0)
    } else {
        num
    };
    mb.round_ties_even() as u64
}

/// Finds, ranks and summarizes the last job in a raw job-history payload.
pub fn extract_last_job(raw: &Value) -> JobSummary {
    let candidates = collect_job_candidates(raw);
    match select_last_job(&candidates) {
        Some(selected) => {
            debug!(
                candidates = candidates.len(),
                job_id = ?selected.job_id(),
                "Selected last job"
            );
            JobSummary::from_candidate(&selected)
        }
        None => JobSummary::no_job(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn statuses(candidates: &[JobCandidate<'_>]) -> Vec<String> {
        candidates
            .iter()
            .map(|c| value_text(c.record.get("status").unwrap_or(&Value::Null)))
            .collect()
    }

    #[test]
    fn test_looks_like_job_markers() {
        assert!(looks_like_job(json!({"operation": "backup"}).as_object().unwrap()));
        assert!(!looks_like_job(json!({"state": "done"}).as_object().unwrap()));
    }

    #[test]
    fn test_collect_order_self_nested_then_tagged() {
        let raw = json!({
            "status": "self",
            "job-b": {"status": "tagged"},
            "latest": {"status": "latest"},
            "details": [{"status": "detail-1"}, "noise", {"status": "detail-2"}]
        });
        let candidates = collect_job_candidates(&raw);
        assert_eq!(
            statuses(&candidates),
            vec!["self", "detail-1", "detail-2", "latest", "tagged"]
        );
        assert_eq!(candidates[4].job_id().as_deref(), Some("job-b"));
        assert_eq!(candidates[0].job_id(), None);
    }

    #[test]
    fn test_collect_unwraps_envelopes_and_lists() {
        let raw = json!({"value": [{"value": {"status": "a"}}, {"summary": {"status": "b"}}]});
        let candidates = collect_job_candidates(&raw);
        assert_eq!(statuses(&candidates), vec!["a", "b"]);
    }

    #[test]
    fn test_collect_nothing_from_scalars_and_empty() {
        assert!(collect_job_candidates(&json!(null)).is_empty());
        assert!(collect_job_candidates(&json!({})).is_empty());
        assert!(collect_job_candidates(&json!("SUCCESS")).is_empty());
    }

    #[test]
    fn test_explicit_job_id_wins_over_key() {
        let raw = json!({"outer": {"status": "x", "_job_id": "20230505-101010"}});
        let candidates = collect_job_candidates(&raw);
        assert_eq!(candidates[0].job_id().as_deref(), Some("20230505-101010"));
    }

    #[test]
    fn test_rank_prefers_latest_end_then_start() {
        let raw = json!([
            {"status": "old", "end_time": "2024-01-01T00:00:00Z"},
            {"status": "new", "end_time": "2024-02-01T00:00:00Z", "start_time": "2024-01-31T23:00:00Z"},
            {"status": "new-later-start", "end_time": "2024-02-01T00:00:00Z", "start_time": "2024-01-31T23:30:00Z"},
            {"status": "undated"}
        ]);
        let candidates = collect_job_candidates(&raw);
        let selected = select_last_job(&candidates).unwrap();
        assert_eq!(selected.record["status"], json!("new-later-start"));
    }

    #[test]
    fn test_rank_ties_keep_collection_order() {
        let raw = json!([
            {"status": "first", "end_time": 1704100000},
            {"status": "second", "end_time": 1704100000}
        ]);
        let candidates = collect_job_candidates(&raw);
        let selected = select_last_job(&candidates).unwrap();
        assert_eq!(selected.record["status"], json!("first"));
    }

    #[test]
    fn test_job_id_fallback_only_without_explicit_end() {
        let raw = json!({
            "20240301-000000-a": {"status": "by-id"},
            "20250101-000000-b": {"status": "explicit", "end_time": "2024-02-01T00:00:00Z"}
        });
        let candidates = collect_job_candidates(&raw);
        let selected = select_last_job(&candidates).unwrap();
        assert_eq!(selected.record["status"], json!("by-id"));
        assert_eq!(
            candidates[1].end_score(),
            parse_timestamp(&json!("2024-02-01T00:00:00Z"))
        );
    }

    #[test]
    fn test_summary_from_full_record() {
        let raw = json!({
            "status": "success",
            "start_time": "2024-01-01T02:00:00Z",
            "end_time": "2024-01-01T02:15:00Z",
            "size": 500000000
        });
        let summary = extract_last_job(&raw);
        assert_eq!(summary.status, "SUCCESS");
        assert_eq!(summary.start, "2024-01-01 02:00:00 UTC");
        assert_eq!(summary.end, "2024-01-01 02:15:00 UTC");
        assert_eq!(summary.duration, "15m 0s");
        assert_eq!(summary.size_mb, 477);
    }

    #[test]
    fn test_summary_duration_field_fallback() {
        let raw = json!({"state": "failed", "duration": 3725, "backup_size": 3});
        let summary = extract_last_job(&raw);
        assert_eq!(summary.status, "FAILED");
        assert_eq!(summary.duration, "1h 2m 5s");
        assert_eq!(summary.size_mb, 3);
    }

    #[test]
    fn test_summary_unknown_status() {
        let raw = json!({"service": "vpxd", "start_time": 1704100000});
        let summary = extract_last_job(&raw);
        assert_eq!(summary.status, "UNKNOWN");
        assert_eq!(summary.end, NOT_AVAILABLE);
        assert_eq!(summary.duration, NOT_AVAILABLE);
    }

    #[test]
    fn test_summary_status_aliases() {
        let raw = json!({"status": "", "result": "partial", "operation": "backup"});
        assert_eq!(extract_last_job(&raw).status, "PARTIAL");
    }

    #[test]
    fn test_summary_unparseable_end_is_not_available() {
        let raw = json!({"status": "ok", "end_time": "garbage", "end": "2024-01-01T00:00:00Z"});
        let summary = extract_last_job(&raw);
        assert_eq!(summary.end, NOT_AVAILABLE);
        assert_eq!(summary.duration, NOT_AVAILABLE);
    }

    #[test]
    fn test_no_job_sentinel() {
        let summary = extract_last_job(&json!({}));
        assert_eq!(summary, JobSummary::no_job());
        assert_eq!(summary.status, NO_JOB_STATUS);
    }

    #[test]
    fn test_megabyte_rounding() {
        assert_eq!(to_megabytes(&json!(2.5)), 2);
        assert_eq!(to_megabytes(&json!(3.5)), 4);
        assert_eq!(to_megabytes(&json!(-100)), 0);
        assert_eq!(to_megabytes(&json!(10 * 1024 * 1024)), 10);
        assert_eq!(to_megabytes(&json!(5 * 1024 * 1024)), 5_242_880);
    }
}
