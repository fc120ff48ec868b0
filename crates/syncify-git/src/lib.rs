//! Version control backend for Syncify
//!
//! The sync engine talks to version control only through the
//! [`VersionControl`] contract; [`GitBackend`] implements it with `git2`.

pub mod backend;
pub mod commits;
pub mod error;
pub mod git2_backend;
pub mod naming;

pub use backend::{
    BranchSummary, DEFAULT_REMOTE, PullOptions, PullOutcome, RefResolver, RemoteInfo,
    StashOutcome, VersionControl,
};
pub use commits::CommitInfo;
pub use error::{Error, Result};
pub use git2_backend::GitBackend;
pub use naming::{branch_to_folder, validate_branch_name};
