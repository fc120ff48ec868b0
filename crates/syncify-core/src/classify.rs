//! Local versus remote branch position

use syncify_git::RefResolver;

use crate::Result;

/// Where a local profile branch stands relative to its remote counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPosition {
    /// Local has commits the remote lacks
    Ahead,
    /// Remote has commits the local branch lacks
    Behind,
    UpToDate,
    /// The remote branch does not exist yet
    Unborn,
    /// Both sides have commits the other lacks
    Diverged,
}

impl SyncPosition {
    /// Whether remote work has to be merged before anything can be pushed.
    /// Divergence counts: it is never resolved by overwriting the remote.
    pub fn requires_merge(self) -> bool {
        matches!(self, Self::Behind | Self::Diverged)
    }
}

impl std::fmt::Display for SyncPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Ahead => "ahead",
            Self::Behind => "behind",
            Self::UpToDate => "up to date",
            Self::Unborn => "unborn",
            Self::Diverged => "diverged",
        };
        f.write_str(label)
    }
}

/// Classify `local_ref` against `remote_ref`.
///
/// Identical tips are up to date whatever the history looks like. Otherwise
/// the merge base decides: equal to the remote tip means ahead, equal to
/// the local tip means behind, anything else (including no common history)
/// is diverged.
pub fn classify<R>(refs: &R, local_ref: &str, remote_ref: &str) -> Result<SyncPosition>
where
    R: RefResolver + ?Sized,
{
    let Some(remote_tip) = refs.rev_parse(remote_ref)? else {
        return Ok(SyncPosition::Unborn);
    };
    let Some(local_tip) = refs.rev_parse(local_ref)? else {
        return Ok(SyncPosition::Behind);
    };

    if local_tip == remote_tip {
        return Ok(SyncPosition::UpToDate);
    }

    let position = match refs.merge_base(local_ref, remote_ref)? {
        Some(base) if base == remote_tip => SyncPosition::Ahead,
        Some(base) if base == local_tip => SyncPosition::Behind,
        _ => SyncPosition::Diverged,
    };
    tracing::debug!(local = %local_ref, remote = %remote_ref, %position, "Classified branch");
    Ok(position)
}
