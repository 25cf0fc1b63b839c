//! Reading and writing record sequences as JSON documents.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::error::{AnalyzerError, Result};

/// Render `data` as pretty JSON with lexicographically sorted keys.
///
/// Going through `serde_json::Value` sorts every object's keys, independent
/// of struct field order.
pub fn render_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    let value = serde_json::to_value(data)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Write `data` to `path`. The document is rendered fully before the file is
/// created, so a serialization failure leaves no partial output behind.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let text = render_json(data)?;
    fs::write(path, text + "\n")?;
    Ok(())
}

/// Read a JSON array of records.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = fs::read_to_string(path).map_err(|e| AnalyzerError::missing_input(path, e))?;
    serde_json::from_str(&text).map_err(|e| AnalyzerError::InvalidInput {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
