use std::path::PathBuf;

/// Errors that can occur while handling editor extensions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] syncify_fs::Error),

    /// The manifest is not a JSON array of strings.
    #[error("failed to parse extension manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// The editor command could not be started.
    #[error("editor command '{command}' is not available: {message}")]
    HostUnavailable { command: String, message: String },

    /// The editor command ran and failed.
    #[error("'{command}' failed with exit code {exit_code:?}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
