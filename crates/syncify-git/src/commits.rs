//! Recent history of a profile branch, shown by `syncify status`.

use chrono::{DateTime, Utc};
use git2::{Commit, Repository, Sort};

use crate::Result;
use crate::backend::DEFAULT_REMOTE;

const SHORT_HASH: usize = 7;

/// One commit of a profile branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    /// Summary line of the message
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    fn from_commit(commit: &Commit<'_>) -> Self {
        let id = commit.id().to_string();
        Self {
            hash: id[..SHORT_HASH.min(id.len())].to_string(),
            message: commit.summary().unwrap_or_default().to_string(),
            author: commit.author().name().unwrap_or("Unknown").to_string(),
            timestamp: DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or_default(),
        }
    }
}

/// Up to `max_count` commits of `branch`, newest first.
///
/// A branch not yet checked out on this machine is read from its
/// remote-tracking copy. Neither existing yields an empty list.
pub fn list_recent_commits(
    repo: &Repository,
    branch: &str,
    max_count: usize,
) -> Result<Vec<CommitInfo>> {
    let candidates = [
        format!("refs/heads/{branch}"),
        format!("refs/remotes/{DEFAULT_REMOTE}/{branch}"),
    ];
    let Some(tip) = candidates
        .iter()
        .find_map(|name| repo.refname_to_id(name).ok())
    else {
        return Ok(Vec::new());
    };

    let mut walk = repo.revwalk()?;
    walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    walk.push(tip)?;
    walk.take(max_count)
        .map(|oid| {
            let commit = repo.find_commit(oid?)?;
            Ok(CommitInfo::from_commit(&commit))
        })
        .collect()
}
