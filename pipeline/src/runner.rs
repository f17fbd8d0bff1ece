//! Parallel row extraction across host records.

use backup_report_core::{ReportRow, host_rows};
use rayon::prelude::*;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

/// Builds report rows for every host on a dedicated worker pool.
///
/// Output order matches [`backup_report_core::build_rows`]: hosts in input
/// order, each host's schedule rows in schedule order. `jobs` of `None` or
/// `0` picks a thread count from the CPU count.
///
/// # Errors
///
/// Returns [`ThreadPool`](crate::PipelineError::ThreadPool) if the worker
/// pool cannot be built.
pub fn build_rows_parallel(hosts: &[Value], jobs: Option<usize>) -> Result<Vec<ReportRow>> {
    let jobs = jobs
        .filter(|jobs| *jobs > 0)
        .unwrap_or_else(|| default_parallel_jobs(hosts.len()));
    debug!(hosts = hosts.len(), jobs, "Building report rows");

    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    let per_host: Vec<Vec<ReportRow>> = pool.install(|| hosts.par_iter().map(host_rows).collect());
    Ok(per_host.into_iter().flatten().collect())
}

/// Thread count used when none is configured.
pub fn default_parallel_jobs(host_count: usize) -> usize {
    let cpu_count = std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(4);
    cpu_count.clamp(1, 8).min(host_count.max(1))
}
