//! JSONL dataset reader: one JSON object per line.
//!
//! Empty lines are skipped; malformed lines are fatal.

use std::io::{BufRead, BufReader};
use std::{fs::File, path::Path};

use serde_json::Value;
use tracing::{debug, info};

use crate::{documents::Record, errors::DatasetError};

/// Reads up to `limit` records from a JSONL file (`None` reads everything).
///
/// # Errors
/// - [`DatasetError::Io`] if the file cannot be read.
/// - [`DatasetError::Parse`] if a line is not a JSON object.
pub fn read_records(path: impl AsRef<Path>, limit: Option<usize>) -> Result<Vec<Record>, DatasetError> {
    info!("Reading dataset JSONL: {:?}", path.as_ref());

    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        if limit.is_some_and(|n| out.len() >= n) {
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(&line) {
            Ok(Value::Object(map)) => out.push(map),
            Ok(_) => {
                return Err(DatasetError::Parse(format!(
                    "line {}: expected a JSON object",
                    i + 1
                )));
            }
            Err(e) => {
                return Err(DatasetError::Parse(format!("line {} parse error: {}", i + 1, e)));
            }
        }
    }

    debug!("Loaded {} dataset records", out.len());
    Ok(out)
}
