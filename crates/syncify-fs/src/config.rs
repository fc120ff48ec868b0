//! JSON configuration loading and saving

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, NormalizedPath, Result, io};

/// JSON configuration store.
///
/// Settings documents are plain JSON; writes go through
/// [`io::write_atomic`] so a crash never leaves a truncated document.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a JSON file.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let content = io::read_text(path)?;
        serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_native(),
            message: e.to_string(),
        })
    }

    /// Load a document, falling back to `T::default()` when the file is absent.
    pub fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        path: &NormalizedPath,
    ) -> Result<T> {
        if !path.exists() {
            tracing::debug!(path = %path, "Config file absent, using defaults");
            return Ok(T::default());
        }
        self.load(path)
    }

    /// Save a document as pretty-printed JSON.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let mut content = serde_json::to_string_pretty(value).map_err(|e| Error::ConfigSerialize {
            path: path.to_native(),
            message: e.to_string(),
        })?;
        content.push('\n');
        io::write_atomic(path, content.as_bytes())
    }
}
