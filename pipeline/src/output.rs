//! Output formatting for backup reports.

use std::path::Path;

use backup_report_core::{REPORT_HEADERS, ReportRow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Report path used when neither the command line nor the config names one.
pub const DEFAULT_OUTPUT_PATH: &str = "vcenter_backup_report.csv";

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Yaml,
    Markdown,
    Table,
}

/// Renders rows in the requested output format.
///
/// # Errors
///
/// Returns [`Json`](crate::PipelineError::Json) or
/// [`Yaml`](crate::PipelineError::Yaml) if serialization fails.
pub fn render_report(rows: &[ReportRow], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Csv => Ok(rows_to_csv(rows)),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(rows)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(rows)?),
        OutputFormat::Markdown => Ok(rows_to_markdown(rows)),
        OutputFormat::Table => Ok(rows_to_table(rows)),
    }
}

/// Renders rows and writes them to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`Io`](crate::PipelineError::Io) if the directory or file cannot
/// be written, or a serialization error from [`render_report`].
pub fn write_report(path: impl AsRef<Path>, rows: &[ReportRow], format: OutputFormat) -> Result<()> {
    let path = path.as_ref();
    let body = render_report(rows, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)?;
    debug!(path = %path.display(), rows = rows.len(), ?format, "Wrote report");
    Ok(())
}

fn rows_to_csv(rows: &[ReportRow]) -> String {
    let mut out = String::new();
    push_csv_record(&mut out, REPORT_HEADERS.iter().copied());
    for row in rows {
        let cells = row.cells();
        push_csv_record(&mut out, cells.iter().map(String::as_str));
    }
    out
}

fn push_csv_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (index, field) in fields.enumerate() {
        if index > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\r', '\n']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push_str("\r\n");
}

fn rows_to_markdown(rows: &[ReportRow]) -> String {
    let mut out = String::new();

    out.push_str("# Backup Report\n\n");
    out.push_str(&format!("| {} |\n", REPORT_HEADERS.join(" | ")));
    out.push_str(&format!(
        "|{}|\n",
        REPORT_HEADERS.map(|h| "-".repeat(h.len() + 2)).join("|")
    ));
    for row in rows {
        let cells = row.cells().map(|cell| cell.replace('|', "\\|").replace('\n', " "));
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    out
}

fn rows_to_table(rows: &[ReportRow]) -> String {
    let cells: Vec<[String; 16]> = rows.iter().map(ReportRow::cells).collect();
    let mut widths = REPORT_HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_table_line(&mut out, REPORT_HEADERS.iter().copied(), &widths);
    for row in &cells {
        push_table_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out.push_str(&format!("\n{} row(s)\n", rows.len()));
    out
}

fn push_table_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
