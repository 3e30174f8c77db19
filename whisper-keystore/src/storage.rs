//! Shared JSON-file persistence helpers for the file-backed stores.
//!
//! One record per file, written to a temp path and renamed into place
//! so readers never observe a half-written record.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

pub(crate) fn ensure_dir(dir: impl Into<PathBuf>) -> Result<PathBuf, StoreError> {
    let dir = dir.into();
    std::fs::create_dir_all(&dir)
        .map_err(|e| StoreError::Storage(format!("create dir: {}", e)))?;
    Ok(dir)
}

pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StoreError::Storage(format!("serialize: {}", e)))?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &json).map_err(|e| StoreError::Storage(format!("write: {}", e)))?;
    std::fs::rename(&tmp, path).map_err(|e| StoreError::Storage(format!("rename: {}", e)))?;
    Ok(())
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| StoreError::Storage(format!("read: {}", e)))?;
    serde_json::from_str(&data).map_err(|e| StoreError::Storage(format!("parse: {}", e)))
}

/// Every `.json` record in a directory.
pub(crate) fn read_dir_json<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, StoreError> {
    let mut records = Vec::new();
    let entries =
        std::fs::read_dir(dir).map_err(|e| StoreError::Storage(format!("readdir: {}", e)))?;
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::Storage(format!("entry: {}", e)))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            records.push(read_json(&path)?);
        }
    }
    Ok(records)
}
