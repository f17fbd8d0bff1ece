//! Report run configuration.
//!
//! Every field is optional in the YAML file; missing values fall back to the
//! same defaults the command line uses. Command-line flags override the file.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! output:
//!   path: reports/backup.csv
//!   format: csv
//! processing:
//!   jobs: 4
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::output::{DEFAULT_OUTPUT_PATH, OutputFormat};

/// Where and how the report is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination file. Parent directories are created on write.
    pub path: PathBuf,
    /// Report format.
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            format: OutputFormat::Csv,
        }
    }
}

/// Settings controlling row extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Worker threads; `None` or `0` picks a value from the CPU count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

/// Top-level report configuration.
///
/// # Examples
///
/// ```
/// use backup_report_pipeline::{OutputFormat, ReportConfig};
///
/// let config: ReportConfig = serde_yaml::from_str("output: { format: json }").unwrap();
/// assert_eq!(config.output.format, OutputFormat::Json);
/// assert_eq!(config.output.path.to_str(), Some("vcenter_backup_report.csv"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            output: OutputConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::PipelineError::Io) if the file cannot be read,
    /// or [`Yaml`](crate::PipelineError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::PipelineError::Io) if the file cannot be
    /// written, or [`Yaml`](crate::PipelineError::Yaml) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
