//! Flat report rows built from host records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::NOT_AVAILABLE;
use crate::job::{JobSummary, extract_last_job};
use crate::payload::{first_truthy, unwrap_payload, value_text};
use crate::schedule::{ScheduleRecord, normalize_schedules};

/// Column headers of the report, in output order.
pub const REPORT_HEADERS: [&str; 16] = [
    "vCenter",
    "Version",
    "Build",
    "Timezone",
    "Schedules",
    "Enabled",
    "Backup Location",
    "Type",
    "Recurrence",
    "Retention",
    "Last Job",
    "Status",
    "Start",
    "End",
    "Duration",
    "Size (MB)",
];

/// Value of the "Last Job" cell on schedule rows.
pub const LAST_JOB_LABEL: &str = "Last";

/// Host identity fields shared by every row of one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIdentity {
    /// Host name as given; `"N/A"` only when the key is missing.
    pub hostname: String,
    /// Appliance version.
    pub version: String,
    /// Appliance build number.
    pub build: String,
    /// Configured time zone.
    pub timezone: String,
}

impl HostIdentity {
    /// Reads identity fields from a host object.
    ///
    /// A present hostname is kept even when empty (`null` reads as empty).
    /// Version, build and timezone become `"N/A"` when missing or empty.
    pub fn from_host(host: &Map<String, Value>) -> Self {
        let field = |key: &str| {
            first_truthy(host, &[key])
                .map(value_text)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };
        let hostname = match host.get("hostname") {
            Some(Value::Null) => String::new(),
            Some(value) => value_text(value),
            None => NOT_AVAILABLE.to_string(),
        };
        Self {
            hostname,
            version: field("version"),
            build: field("build"),
            timezone: field("timezone"),
        }
    }
}

/// One line of the backup report.
///
/// Serializes with the report column headers as field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Host name of the appliance.
    #[serde(rename = "vCenter")]
    pub vcenter: String,
    /// Appliance version.
    #[serde(rename = "Version")]
    pub version: String,
    /// Appliance build number.
    #[serde(rename = "Build")]
    pub build: String,
    /// Configured time zone.
    #[serde(rename = "Timezone")]
    pub timezone: String,
    /// Total number of normalized schedules for the host.
    #[serde(rename = "Schedules")]
    pub schedules: usize,
    /// `None` on the placeholder row of a host without schedules.
    #[serde(rename = "Enabled")]
    pub enabled: Option<bool>,
    /// Backup destination URL or path.
    #[serde(rename = "Backup Location")]
    pub location: String,
    /// Uppercased destination protocol.
    #[serde(rename = "Type")]
    pub location_type: String,
    /// Formatted schedule recurrence.
    #[serde(rename = "Recurrence")]
    pub recurrence: String,
    /// Formatted retention policy.
    #[serde(rename = "Retention")]
    pub retention: String,
    /// `"Last"` on schedule rows, `"N/A"` on the placeholder row.
    #[serde(rename = "Last Job")]
    pub last_job: String,
    /// Uppercased status of the most recent job.
    #[serde(rename = "Status")]
    pub status: String,
    /// Job start time.
    #[serde(rename = "Start")]
    pub start: String,
    /// Job end time.
    #[serde(rename = "End")]
    pub end: String,
    /// Job duration, e.g. `"15m 0s"`.
    #[serde(rename = "Duration")]
    pub duration: String,
    /// Job size in whole megabytes.
    #[serde(rename = "Size (MB)")]
    pub size_mb: u64,
}

impl ReportRow {
    /// Row for one schedule of a host.
    pub fn for_schedule(
        identity: &HostIdentity,
        schedule_count: usize,
        schedule: ScheduleRecord,
        job: &JobSummary,
    ) -> Self {
        Self {
            vcenter: identity.hostname.clone(),
            version: identity.version.clone(),
            build: identity.build.clone(),
            timezone: identity.timezone.clone(),
            schedules: schedule_count,
            enabled: Some(schedule.enabled),
            location: schedule.location,
            location_type: schedule.location_type,
            recurrence: schedule.recurrence,
            retention: schedule.retention,
            last_job: LAST_JOB_LABEL.to_string(),
            status: job.status.clone(),
            start: job.start.clone(),
            end: job.end.clone(),
            duration: job.duration.clone(),
            size_mb: job.size_mb,
        }
    }

    /// Placeholder row for a host without schedules.
    pub fn without_schedule(identity: &HostIdentity, job: &JobSummary) -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            vcenter: identity.hostname.clone(),
            version: identity.version.clone(),
            build: identity.build.clone(),
            timezone: identity.timezone.clone(),
            schedules: 0,
            enabled: None,
            location: na(),
            location_type: na(),
            recurrence: na(),
            retention: na(),
            last_job: na(),
            status: job.status.clone(),
            start: job.start.clone(),
            end: job.end.clone(),
            duration: job.duration.clone(),
            size_mb: job.size_mb,
        }
    }

    /// Cell texts in [`REPORT_HEADERS`] order.
    pub fn cells(&self) -> [String; 16] {
        let enabled = match self.enabled {
            Some(true) => "1".to_string(),
            Some(false) => "0".to_string(),
            None => NOT_AVAILABLE.to_string(),
        };
        [
            self.vcenter.clone(),
            self.version.clone(),
            self.build.clone(),
            self.timezone.clone(),
            self.schedules.to_string(),
            enabled,
            self.location.clone(),
            self.location_type.clone(),
            self.recurrence.clone(),
            self.retention.clone(),
            self.last_job.clone(),
            self.status.clone(),
            self.start.clone(),
            self.end.clone(),
            self.duration.clone(),
            self.size_mb.to_string(),
        ]
    }
}

/// Builds the rows for one host record.
///
/// Always returns at least one row: one per normalized schedule, or a single
/// placeholder row when the host has none. Every row carries the same job
/// summary.
pub fn host_rows(host: &Value) -> Vec<ReportRow> {
    let empty = Map::new();
    let host = match unwrap_payload(host) {
        Value::Object(map) => map,
        other => {
            warn!(kind = %json_kind(other), "Host record is not an object; reporting placeholders");
            &empty
        }
    };

    let identity = HostIdentity::from_host(host);
    let schedules = host
        .get("schedules")
        .map(normalize_schedules)
        .unwrap_or_default();
    let job = host
        .get("job_details")
        .map(extract_last_job)
        .unwrap_or_default();

    debug!(
        host = %identity.hostname,
        schedules = schedules.len(),
        status = %job.status,
        "Built host summary"
    );

    if schedules.is_empty() {
        return vec![ReportRow::without_schedule(&identity, &job)];
    }

    let count = schedules.len();
    schedules
        .iter()
        .map(|schedule| {
            ReportRow::for_schedule(&identity, count, ScheduleRecord::from_schedule(schedule), &job)
        })
        .collect()
}

/// Builds the rows for every host, preserving host and schedule order.
pub fn build_rows(hosts: &[Value]) -> Vec<ReportRow> {
    hosts.iter().flat_map(host_rows).collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
