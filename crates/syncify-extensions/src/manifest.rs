//! `extensions.json`: a JSON array of extension identifiers

use serde_json::Value;
use syncify_fs::{FileStore, NormalizedPath};

use crate::{Error, Result};

/// Read the manifest at `path`. A missing file is an empty manifest.
pub fn read_manifest(store: &dyn FileStore, path: &NormalizedPath) -> Result<Vec<String>> {
    if !store.exists(path) {
        return Ok(Vec::new());
    }

    let content = store.read(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let parse_error = |message: String| Error::ManifestParse {
        path: path.to_native(),
        message,
    };
    let value: Value = serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(parse_error("expected an array".into()));
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(id) => Ok(id),
            other => Err(parse_error(format!("expected a string, found {other}"))),
        })
        .collect()
}

/// Write `ids` as a sorted, de-duplicated manifest.
pub fn write_manifest(store: &dyn FileStore, path: &NormalizedPath, ids: &[String]) -> Result<()> {
    let mut ids: Vec<&String> = ids.iter().collect();
    ids.sort();
    ids.dedup();

    let mut content = serde_json::to_string_pretty(&ids).map_err(|e| Error::ManifestParse {
        path: path.to_native(),
        message: e.to_string(),
    })?;
    content.push('\n');
    store.write(path, content.as_bytes())?;

    tracing::debug!(path = %path, count = ids.len(), "Wrote extension manifest");
    Ok(())
}
