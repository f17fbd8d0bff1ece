//! Schema-tolerant extraction of backup configuration into report rows.
//!
//! Host records produced by different management APIs describe the same
//! backup facts under different key names, nesting depths and container
//! shapes. This crate reads them with a fixed vocabulary of aliases and
//! flattens each host into one or more [`ReportRow`]s:
//!
//! - [`unwrap_payload`] strips `{"value": ...}` response envelopes.
//! - [`find_all`] locates the first non-empty value for a set of aliases
//!   anywhere in a payload.
//! - [`normalize_schedules`] and [`ScheduleRecord`] turn list, id-keyed and
//!   wrapped schedule payloads into canonical schedule fields.
//! - [`collect_job_candidates`], [`select_last_job`] and [`JobSummary`]
//!   find the most recent job run in a host's job history.
//! - [`host_rows`] and [`build_rows`] combine everything into rows in
//!   [`REPORT_HEADERS`] order.
//!
//! Extraction never fails: a field that cannot be read is reported as
//! [`NOT_AVAILABLE`] (or `0`/`false`).
//!
//! # Example
//!
//! ```
//! use backup_report_core::build_rows;
//! use serde_json::json;
//!
//! let hosts = vec![json!({
//!     "hostname": "esxi-01",
//!     "schedules": [{
//!         "enabled": "true",
//!         "location": "nfs://backup1",
//!         "hour": 2,
//!         "minute": 30,
//!         "days": [1, 3, 5]
//!     }],
//!     "job_details": {
//!         "status": "SUCCESS",
//!         "start_time": "2024-01-01T02:00:00Z",
//!         "end_time": "2024-01-01T02:15:00Z",
//!         "size": 500000000
//!     }
//! })];
//!
//! let rows = build_rows(&hosts);
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].location_type, "NFS");
//! assert_eq!(rows[0].recurrence, "WEEKLY 02:30 MONDAY,WEDNESDAY,FRIDAY");
//! assert_eq!(rows[0].duration, "15m 0s");
//! assert_eq!(rows[0].size_mb, 477);
//! ```

mod job;
mod payload;
mod row;
mod schedule;
mod time;

/// Placeholder text for any field that could not be determined.
pub const NOT_AVAILABLE: &str = "N/A";

pub use job::{
    BYTES_THRESHOLD, JOB_CONTAINER_KEYS, JOB_ID_KEY, JOB_MARKER_KEYS, JobCandidate, JobSummary,
    NO_JOB_STATUS, collect_job_candidates, extract_last_job, looks_like_job, select_last_job,
    timestamp_from_job_id, to_megabytes,
};
pub use payload::{
    ENVELOPE_MAX_KEYS, FoundFields, find_all, find_all_in, first_truthy, is_empty_value,
    is_truthy, unwrap_payload, value_text,
};
pub use row::{HostIdentity, LAST_JOB_LABEL, REPORT_HEADERS, ReportRow, build_rows, host_rows};
pub use schedule::{
    ScheduleRecord, extract_enabled, extract_location, extract_location_type,
    extract_recurrence, extract_retention, normalize_schedules,
};
pub use time::{
    MILLIS_THRESHOLD, TIMESTAMP_FORMAT, duration_between, format_duration_value,
    format_seconds, format_timestamp, parse_timestamp,
};
