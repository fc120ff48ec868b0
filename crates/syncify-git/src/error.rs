//! Error types for syncify-git

use std::path::PathBuf;

/// Result type for syncify-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in syncify-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] syncify_fs::Error),

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Branch '{name}' not found")]
    BranchNotFound { name: String },

    #[error("Invalid branch name '{name}': {reason}")]
    InvalidBranchName { name: String, reason: String },

    #[error("Fetch failed: {message}")]
    FetchFailed { message: String },

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("Push rejected by remote: {message}")]
    PushRejected { message: String },

    #[error("Pull failed: {message}")]
    PullFailed { message: String },

    #[error("Refusing to merge unrelated histories on '{branch}'")]
    UnrelatedHistories { branch: String },

    #[error("Unresolved conflicts in: {}", paths.join(", "))]
    UnresolvedConflicts { paths: Vec<String> },

    #[error("Could not re-apply stashed changes: {message}")]
    StashPopFailed { message: String },
}
