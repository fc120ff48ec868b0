//! Error types for syncify-core

use std::path::PathBuf;

/// Result type for syncify-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in syncify-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No export target, or no usable current profile
    #[error("Syncify is not configured: {reason}")]
    NotConfigured { reason: String },

    /// The current profile name is blank or not listed in the shared settings
    #[error("Invalid profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    /// A version control operation failed
    #[error("Version control operation failed: {0}")]
    BackendUnavailable(#[from] syncify_git::Error),

    /// The user has not resolved the merge conflicts in a file
    #[error("Merge conflict in {path} is not resolved")]
    ConflictUnresolved { path: PathBuf },

    /// A transformed file no longer validates as JSON-with-comments
    #[error("Malformed output for {path}: {source}")]
    MalformedPragmaOutput {
        path: String,
        #[source]
        source: syncify_pragma::Error,
    },

    /// Another sync transaction holds the lock
    #[error("Another sync is already running (lock held at {path})")]
    Busy { path: PathBuf },

    /// The filesystem watcher could not be set up
    #[error("Cannot watch {path}: {message}")]
    Watch { path: PathBuf, message: String },

    /// The user backed out of a choice
    #[error("Cancelled")]
    Cancelled,

    // Transparent wrappers for underlying crate errors
    #[error(transparent)]
    Fs(#[from] syncify_fs::Error),

    #[error(transparent)]
    Extensions(#[from] syncify_extensions::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn not_configured(reason: impl Into<String>) -> Self {
        Self::NotConfigured {
            reason: reason.into(),
        }
    }

    /// Whether the caller should treat this as "please configure" rather
    /// than a failure.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured { .. } | Self::InvalidProfile { .. })
    }
}
