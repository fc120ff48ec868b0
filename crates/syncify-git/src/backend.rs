//! Version Control Backend contract

use crate::Result;
use syncify_fs::NormalizedPath;

/// Remote used when the caller does not name one.
pub const DEFAULT_REMOTE: &str = "origin";

/// A configured remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub name: String,
    pub url: Option<String>,
}

/// Local branches and the branch HEAD points at.
///
/// `current` is set even when HEAD points at a branch without commits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchSummary {
    pub current: Option<String>,
    pub all: Vec<String>,
}

/// Options for [`VersionControl::pull`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PullOptions {
    /// Reset the local branch to the remote tip instead of merging.
    pub force: bool,
    /// Merge even when the two branches share no history.
    pub allow_unrelated_histories: bool,
}

/// What a pull did to the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    UpToDate,
    FastForward,
    Merged,
    /// Hard reset to the remote tip (forced pull).
    Reset,
    /// Merge stopped with conflicts. Conflict markers are in the working
    /// tree and the merge stays in progress until the next commit.
    Conflicted(Vec<String>),
}

/// What re-applying the stash did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StashOutcome {
    /// There was no stash entry to apply.
    Empty,
    Applied,
    Conflicted(Vec<String>),
}

/// Revision lookups, split out so classification can run against any
/// history source.
pub trait RefResolver {
    /// Resolve a revision to a commit id; `None` when it does not exist.
    fn rev_parse(&self, rev: &str) -> Result<Option<String>>;

    /// Most recent common ancestor of two revisions; `None` when either
    /// revision is missing or they share no history.
    fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>>;
}

/// Version Control Backend operations consumed by the sync engine.
///
/// All operations act on the working tree at [`VersionControl::workdir`].
pub trait VersionControl: RefResolver + Send + Sync {
    fn workdir(&self) -> &NormalizedPath;

    fn init(&self) -> Result<()>;

    fn check_is_repo(&self) -> bool;

    fn get_remotes(&self) -> Result<Vec<RemoteInfo>>;

    fn add_remote(&self, name: &str, url: &str) -> Result<()>;

    fn remove_remote(&self, name: &str) -> Result<()>;

    /// Fetch every branch of `remote` into its remote-tracking refs.
    fn fetch(&self, remote: &str) -> Result<()>;

    /// Paths that differ between the working tree and HEAD, untracked included.
    fn diff(&self) -> Result<Vec<String>>;

    /// Stage every change in the working tree, deletions included.
    fn add(&self) -> Result<()>;

    /// Commit the index on the current branch and return the commit id.
    /// An in-progress merge is concluded with both parents.
    fn commit(&self, message: &str) -> Result<String>;

    fn push(&self, remote: &str, branch: &str, force: bool) -> Result<()>;

    fn pull(&self, remote: &str, branch: &str, options: PullOptions) -> Result<PullOutcome>;

    /// Abandon an in-progress merge and restore the tree of HEAD.
    /// Does nothing when no merge is in progress.
    fn abort_merge(&self) -> Result<()>;

    /// Stash local changes. Returns `false` when there was nothing to stash.
    fn stash(&self, message: &str) -> Result<bool>;

    /// Re-apply the newest stash entry. The entry is dropped only when it
    /// applied cleanly; on conflict it stays and the markers are left in
    /// the working tree.
    fn stash_pop(&self) -> Result<StashOutcome>;

    /// Drop the newest stash entry, if any.
    fn stash_drop(&self) -> Result<()>;

    /// Move the current branch to `commit` and make the working tree match
    /// it exactly, untracked files included. Clears any merge in progress.
    fn reset_hard(&self, commit: &str) -> Result<()>;

    fn branch_local(&self) -> Result<BranchSummary>;

    /// Remote-tracking branches as `remote/branch`.
    fn branch_remote(&self) -> Result<Vec<String>>;

    /// Point HEAD at `branch`, creating it from the remote-tracking branch
    /// when only that exists, or as an unborn branch otherwise.
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Branch names the remote currently has, fetched fresh.
    fn list_remote_heads(&self, remote: &str) -> Result<Vec<String>>;
}
