//! Input, configuration and output plumbing around the backup report engine.
//!
//! [`backup_report_core`] turns host records into [`ReportRow`]s; this crate
//! loads those records from a file or inline JSON ([`load_input`],
//! [`host_records`]), runs extraction on a worker pool
//! ([`build_rows_parallel`]), and writes the rows as CSV, JSON, YAML,
//! Markdown or a plain-text table ([`write_report`]). Run settings can be
//! kept in a YAML [`ReportConfig`].
//!
//! # Example
//!
//! ```
//! use backup_report_pipeline::{OutputFormat, build_rows_parallel, host_records, load_input, render_report};
//!
//! let document = load_input(r#"[{"hostname": "vc01"}]"#).unwrap();
//! let hosts = host_records(document).unwrap();
//! let rows = build_rows_parallel(&hosts, Some(1)).unwrap();
//! let csv = render_report(&rows, OutputFormat::Csv).unwrap();
//! assert!(csv.lines().nth(1).unwrap().starts_with("vc01,N/A,N/A,N/A,0,N/A,"));
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod runner;

pub use backup_report_core::ReportRow;
pub use config::{OutputConfig, ProcessingConfig, ReportConfig};
pub use error::{PipelineError, Result};
pub use input::{NOT_A_LIST_MESSAGE, host_records, load_input};
pub use output::{DEFAULT_OUTPUT_PATH, OutputFormat, render_report, write_report};
pub use runner::{build_rows_parallel, default_parallel_jobs};
