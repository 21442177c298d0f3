// rook_core/src/storage/json.rs
use crate::error::EngineError;
use std::fs;
use std::path::Path;

/// Reads and parses a JSON document from disk.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, EngineError> {
    let text = fs::read_to_string(path).map_err(|e| EngineError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    serde_json::from_str(&text).map_err(|e| EngineError::Json {
        path: path.display().to_string(),
        source: e,
    })
}
