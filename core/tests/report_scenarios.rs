use backup_report_core::{
    JobCandidate, JobSummary, NOT_AVAILABLE, REPORT_HEADERS, build_rows, collect_job_candidates,
    host_rows, normalize_schedules, parse_timestamp, select_last_job, unwrap_payload,
};
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn cell<'a>(cells: &'a [String; 16], header: &str) -> &'a str {
    let index = REPORT_HEADERS
        .iter()
        .position(|h| *h == header)
        .unwrap_or_else(|| panic!("unknown header {header}"));
    &cells[index]
}

// ---------------------------------------------------------------------------
// End-to-end host scenarios
// ---------------------------------------------------------------------------

#[test]
fn weekly_nfs_schedule_with_successful_job() {
    let host = json!({
        "hostname": "esxi-01",
        "schedules": [{
            "enabled": "true",
            "location": "nfs://backup1",
            "hour": 2,
            "minute": 30,
            "days": [1, 3, 5]
        }],
        "job_details": {
            "status": "SUCCESS",
            "start_time": "2024-01-01T02:00:00Z",
            "end_time": "2024-01-01T02:15:00Z",
            "size": 500000000
        }
    });

    let rows = host_rows(&host);
    assert_eq!(rows.len(), 1);
    let cells = rows[0].cells();
    assert_eq!(cell(&cells, "vCenter"), "esxi-01");
    assert_eq!(cell(&cells, "Version"), NOT_AVAILABLE);
    assert_eq!(cell(&cells, "Schedules"), "1");
    assert_eq!(cell(&cells, "Enabled"), "1");
    assert_eq!(cell(&cells, "Backup Location"), "nfs://backup1");
    assert_eq!(cell(&cells, "Type"), "NFS");
    assert_eq!(
        cell(&cells, "Recurrence"),
        "WEEKLY 02:30 MONDAY,WEDNESDAY,FRIDAY"
    );
    assert_eq!(cell(&cells, "Last Job"), "Last");
    assert_eq!(cell(&cells, "Status"), "SUCCESS");
    assert_eq!(cell(&cells, "Start"), "2024-01-01 02:00:00 UTC");
    assert_eq!(cell(&cells, "End"), "2024-01-01 02:15:00 UTC");
    assert_eq!(cell(&cells, "Duration"), "15m 0s");
    assert_eq!(cell(&cells, "Size (MB)"), "477");
}

#[test]
fn host_without_schedules_or_jobs() {
    let rows = host_rows(&json!({"hostname": "vc-empty", "job_details": {}}));
    assert_eq!(rows.len(), 1);
    let cells = rows[0].cells();
    assert_eq!(cell(&cells, "Schedules"), "0");
    for header in ["Enabled", "Backup Location", "Type", "Recurrence", "Retention", "Last Job"] {
        assert_eq!(cell(&cells, header), NOT_AVAILABLE, "{header}");
    }
    assert_eq!(cell(&cells, "Status"), "NO JOB");
    assert_eq!(cell(&cells, "Start"), NOT_AVAILABLE);
    assert_eq!(cell(&cells, "Duration"), NOT_AVAILABLE);
    assert_eq!(cell(&cells, "Size (MB)"), "0");
}

#[test]
fn completed_epoch_without_start_has_no_duration() {
    let job = json!({"completed": 1704100000});
    let candidate = JobCandidate::direct(job.as_object().unwrap());
    assert_eq!(candidate.end_score(), parse_timestamp(&json!(1704100000)));
    assert_eq!(candidate.start_score(), None);

    let summary = JobSummary::from_candidate(&candidate);
    assert_eq!(summary.end, "2024-01-01 09:06:40 UTC");
    assert_eq!(summary.duration, NOT_AVAILABLE);
    assert_eq!(summary.status, "UNKNOWN");
}

#[test]
fn id_keyed_job_map_ranks_by_embedded_timestamp() {
    let jobs = json!({
        "20231231-230000-old": {"status": "FAILED"},
        "20240101-020000-abc": {"status": "OK"}
    });
    let candidates = collect_job_candidates(&jobs);
    assert_eq!(candidates.len(), 2);
    assert_eq!(
        candidates[1].end_score(),
        parse_timestamp(&json!("2024-01-01T02:00:00Z"))
    );

    let selected = select_last_job(&candidates).unwrap();
    assert_eq!(selected.job_id().as_deref(), Some("20240101-020000-abc"));
    let summary = JobSummary::from_candidate(&selected);
    assert_eq!(summary.status, "OK");
    assert_eq!(summary.end, NOT_AVAILABLE);
}

#[test]
fn wrapped_host_with_id_keyed_schedules_and_nested_jobs() {
    let host = json!({
        "value": {
            "hostname": "vcsa-02.lab",
            "version": "8.0.2",
            "build": "22617221",
            "timezone": "Europe/Berlin",
            "schedules": {
                "value": {
                    "default": {
                        "enable": true,
                        "location": "sftp://backup.lab/vcsa",
                        "recurrence_info": {"hour": 23, "minute": 0, "days": ["SATURDAY", "SUNDAY"]},
                        "retention_info": {"max_count": 3}
                    },
                    "hourly": {
                        "enable": false,
                        "storage": {"url": "smb://nas/share"},
                        "cron": "0 * * * *"
                    }
                }
            },
            "job_details": {
                "value": {
                    "20240302-230000-1": {"status": "SUCCEEDED", "end_time": "2024-03-02T23:20:00Z", "duration": 1200},
                    "20240303-230000-2": {"status": "FAILED", "start_time": "2024-03-03T23:00:00Z", "end_time": "2024-03-03T23:01:05Z", "bytes_transferred": 20971520}
                }
            }
        }
    });

    let rows = host_rows(&host);
    assert_eq!(rows.len(), 2);
    let first = rows[0].cells();
    let second = rows[1].cells();

    assert_eq!(cell(&first, "Version"), "8.0.2");
    assert_eq!(cell(&first, "Timezone"), "Europe/Berlin");
    assert_eq!(cell(&first, "Schedules"), "2");
    assert_eq!(cell(&first, "Type"), "SFTP");
    assert_eq!(cell(&first, "Recurrence"), "WEEKLY 23:00 SAT,SUN");
    // "days" doubles as a retention alias, so the weekday list is reported too.
    assert_eq!(
        cell(&first, "Retention"),
        "max_count=3, days=[SATURDAY, SUNDAY]"
    );

    assert_eq!(cell(&second, "Enabled"), "0");
    assert_eq!(cell(&second, "Backup Location"), "smb://nas/share");
    assert_eq!(cell(&second, "Type"), "SMB");
    assert_eq!(cell(&second, "Recurrence"), "CRON 0 * * * *");

    for cells in [&first, &second] {
        assert_eq!(cell(cells, "Status"), "FAILED");
        assert_eq!(cell(cells, "Duration"), "1m 5s");
        assert_eq!(cell(cells, "Size (MB)"), "20");
    }
}

#[test]
fn every_host_yields_rows_in_input_order() {
    let hosts: Vec<Value> = vec![
        json!({"hostname": "a", "schedules": [{"location": "nfs://1"}, {"location": "nfs://2"}, {"location": "nfs://3"}]}),
        json!(null),
        json!({"hostname": "c", "schedules": "none"}),
    ];
    let rows = build_rows(&hosts);
    let summary: Vec<(String, usize)> = rows
        .iter()
        .map(|row| (row.vcenter.clone(), row.schedules))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("a".to_string(), 3),
            ("a".to_string(), 3),
            ("a".to_string(), 3),
            (NOT_AVAILABLE.to_string(), 0),
            ("c".to_string(), 0),
        ]
    );
    let locations: Vec<&str> = rows[..3].iter().map(|row| row.location.as_str()).collect();
    assert_eq!(locations, vec!["nfs://1", "nfs://2", "nfs://3"]);
}

#[test]
fn normalization_and_unwrap_properties() {
    let samples = [
        json!(null),
        json!(true),
        json!(12.5),
        json!("schedules"),
        json!({"value": {"value": {"schedules": []}}}),
        json!([{"value": 1}, 2]),
    ];
    for sample in &samples {
        let once = unwrap_payload(sample);
        assert_eq!(unwrap_payload(once), once);
    }
    for scalar in &samples[..4] {
        assert!(normalize_schedules(scalar).is_empty());
    }
}
