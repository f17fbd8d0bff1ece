//! Loading host records from a file or an inline JSON document.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Message reported when the input is not a non-empty list.
pub const NOT_A_LIST_MESSAGE: &str = "Input JSON is empty or not a list";

/// Parses `arg` as JSON, reading it from disk first when it names a file.
///
/// # Errors
///
/// Returns [`Io`](PipelineError::Io) when the file cannot be read and
/// [`Json`](PipelineError::Json) when the text is not valid JSON.
pub fn load_input(arg: &str) -> Result<Value> {
    let path = Path::new(arg);
    if !arg.is_empty() && path.is_file() {
        debug!(path = %path.display(), "Reading input file");
        let raw = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&raw)?);
    }
    debug!(len = arg.len(), "Parsing inline JSON input");
    Ok(serde_json::from_str(arg)?)
}

/// Returns the host records of a loaded document.
///
/// # Errors
///
/// Returns [`InvalidInput`](PipelineError::InvalidInput) unless the document
/// is a non-empty array.
pub fn host_records(document: Value) -> Result<Vec<Value>> {
    match document {
        Value::Array(hosts) if !hosts.is_empty() => Ok(hosts),
        _ => Err(PipelineError::InvalidInput(NOT_A_LIST_MESSAGE.to_string())),
    }
}
