//! `git2` implementation of the Version Control Backend

use git2::{
    AutotagOption, BranchType, ErrorCode, FetchOptions, FetchPrune, Index, IndexAddOption, Oid,
    PushOptions, RemoteCallbacks, Repository, RepositoryState, ResetType, Signature, StashFlags,
    Status, StatusOptions, build::CheckoutBuilder,
};
use syncify_fs::NormalizedPath;

use crate::backend::{
    BranchSummary, DEFAULT_REMOTE, PullOptions, PullOutcome, RefResolver, RemoteInfo,
    StashOutcome, VersionControl,
};
use crate::commits::{CommitInfo, list_recent_commits};
use crate::{Error, Result};

/// Identity used for commits when git has no `user.name`/`user.email`.
const FALLBACK_NAME: &str = "Syncify";
const FALLBACK_EMAIL: &str = "syncify@localhost";

/// Version control backend over a single git working tree.
///
/// The repository is reopened for every operation, so the backend holds no
/// libgit2 state between calls.
#[derive(Debug, Clone)]
pub struct GitBackend {
    workdir: NormalizedPath,
}

impl GitBackend {
    pub fn new(workdir: NormalizedPath) -> Self {
        Self { workdir }
    }

    fn open(&self) -> Result<Repository> {
        Repository::open(self.workdir.to_native()).map_err(|e| match e.code() {
            ErrorCode::NotFound => Error::NotARepository {
                path: self.workdir.to_native(),
            },
            _ => Error::Git(e),
        })
    }

    fn signature(repo: &Repository) -> Result<Signature<'static>> {
        match repo.signature() {
            Ok(signature) => Ok(signature),
            Err(_) => Ok(Signature::now(FALLBACK_NAME, FALLBACK_EMAIL)?),
        }
    }

    /// Last `max_count` commits of `branch`, newest first.
    pub fn recent_commits(&self, branch: &str, max_count: usize) -> Result<Vec<CommitInfo>> {
        let repo = self.open()?;
        list_recent_commits(&repo, branch, max_count)
    }
}

impl RefResolver for GitBackend {
    fn rev_parse(&self, rev: &str) -> Result<Option<String>> {
        let repo = self.open()?;
        match repo.revparse_single(rev) {
            Ok(object) => Ok(Some(object.peel_to_commit()?.id().to_string())),
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::UnbornBranch) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>> {
        let (Some(a), Some(b)) = (self.rev_parse(a)?, self.rev_parse(b)?) else {
            return Ok(None);
        };
        let repo = self.open()?;
        match repo.merge_base(Oid::from_str(&a)?, Oid::from_str(&b)?) {
            Ok(oid) => Ok(Some(oid.to_string())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl VersionControl for GitBackend {
    fn workdir(&self) -> &NormalizedPath {
        &self.workdir
    }

    fn init(&self) -> Result<()> {
        if self.check_is_repo() {
            return Ok(());
        }
        let native = self.workdir.to_native();
        std::fs::create_dir_all(&native).map_err(|e| syncify_fs::Error::io(&native, e))?;
        Repository::init(&native)?;
        tracing::info!(path = %self.workdir, "Initialized sync repository");
        Ok(())
    }

    fn check_is_repo(&self) -> bool {
        Repository::open(self.workdir.to_native()).is_ok()
    }

    fn get_remotes(&self) -> Result<Vec<RemoteInfo>> {
        let repo = self.open()?;
        let names = repo.remotes()?;
        let mut remotes = Vec::new();
        for name in names.iter().flatten() {
            let remote = repo.find_remote(name)?;
            remotes.push(RemoteInfo {
                name: name.to_string(),
                url: remote.url().map(str::to_string),
            });
        }
        Ok(remotes)
    }

    fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        let repo = self.open()?;
        repo.remote(name, url)?;
        tracing::debug!(remote = %name, url = %url, "Added remote");
        Ok(())
    }

    fn remove_remote(&self, name: &str) -> Result<()> {
        let repo = self.open()?;
        repo.remote_delete(name).map_err(|e| match e.code() {
            ErrorCode::NotFound => Error::RemoteNotFound {
                name: name.to_string(),
            },
            _ => Error::Git(e),
        })
    }

    fn fetch(&self, remote_name: &str) -> Result<()> {
        let repo = self.open()?;
        let mut remote = repo
            .find_remote(remote_name)
            .map_err(|_| Error::RemoteNotFound {
                name: remote_name.to_string(),
            })?;

        let refspec = format!("+refs/heads/*:refs/remotes/{remote_name}/*");
        let mut options = FetchOptions::new();
        options
            .prune(FetchPrune::On)
            .download_tags(AutotagOption::None);

        remote
            .fetch(&[refspec.as_str()], Some(&mut options), None)
            .map_err(|e| Error::FetchFailed {
                message: e.message().to_string(),
            })?;

        tracing::debug!(remote = %remote_name, "Fetched remote");
        Ok(())
    }

    fn diff(&self) -> Result<Vec<String>> {
        let repo = self.open()?;
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .filter(|entry| entry.status() != Status::CURRENT)
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect())
    }

    fn add(&self) -> Result<()> {
        let repo = self.open()?;
        let mut index = repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        let mut repo = self.open()?;
        let signature = Self::signature(&repo)?;

        // Read before anything borrows the repository
        let mut merge_heads = Vec::new();
        if repo.state() == RepositoryState::Merge {
            repo.mergehead_foreach(|oid| {
                merge_heads.push(*oid);
                true
            })?;
        }

        let mut index = repo.index()?;
        if index.has_conflicts() {
            return Err(Error::UnresolvedConflicts {
                paths: conflict_paths(&index)?,
            });
        }
        let tree = repo.find_tree(index.write_tree()?)?;

        let mut parents = Vec::new();
        if let Ok(head) = repo.head() {
            parents.push(head.peel_to_commit()?);
        }
        for oid in merge_heads {
            parents.push(repo.find_commit(oid)?);
        }
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let oid = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parent_refs,
        )?;

        if repo.state() != RepositoryState::Clean {
            repo.cleanup_state()?;
        }

        tracing::debug!(commit = %oid, parents = parent_refs.len(), "Created commit");
        Ok(oid.to_string())
    }

    fn push(&self, remote_name: &str, branch: &str, force: bool) -> Result<()> {
        let repo = self.open()?;
        let mut remote = repo
            .find_remote(remote_name)
            .map_err(|_| Error::RemoteNotFound {
                name: remote_name.to_string(),
            })?;

        let prefix = if force { "+" } else { "" };
        let refspec = format!("{prefix}refs/heads/{branch}:refs/heads/{branch}");

        let mut rejection = None;
        {
            let mut callbacks = RemoteCallbacks::new();
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    rejection = Some(format!("{refname}: {message}"));
                }
                Ok(())
            });
            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);

            remote
                .push(&[refspec.as_str()], Some(&mut options))
                .map_err(|e| Error::PushFailed {
                    message: e.message().to_string(),
                })?;
        }

        if let Some(message) = rejection {
            return Err(Error::PushRejected { message });
        }

        tracing::info!(remote = %remote_name, branch = %branch, force, "Pushed branch");
        Ok(())
    }

    fn pull(&self, remote_name: &str, branch: &str, options: PullOptions) -> Result<PullOutcome> {
        self.fetch(remote_name)?;

        let repo = self.open()?;
        let local_ref = format!("refs/heads/{branch}");
        let remote_ref = format!("refs/remotes/{remote_name}/{branch}");

        let remote_commit = repo
            .find_reference(&remote_ref)
            .map_err(|_| Error::BranchNotFound {
                name: format!("{remote_name}/{branch}"),
            })?
            .peel_to_commit()?;

        let local_exists = repo.find_reference(&local_ref).is_ok();
        if options.force || !local_exists {
            repo.reference(
                &local_ref,
                remote_commit.id(),
                true,
                &format!("pull: reset to {}", remote_commit.id()),
            )?;
            repo.set_head(&local_ref)?;
            repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
            return Ok(if local_exists {
                PullOutcome::Reset
            } else {
                PullOutcome::FastForward
            });
        }

        let annotated = repo.find_annotated_commit(remote_commit.id())?;
        let (analysis, _) = repo.merge_analysis(&[&annotated])?;

        if analysis.is_up_to_date() {
            return Ok(PullOutcome::UpToDate);
        }

        if analysis.is_fast_forward() {
            let mut reference = repo.find_reference(&local_ref)?;
            reference.set_target(
                remote_commit.id(),
                &format!("pull: fast-forward to {}", remote_commit.id()),
            )?;
            repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
            return Ok(PullOutcome::FastForward);
        }

        if !options.allow_unrelated_histories {
            let head = repo.head()?.peel_to_commit()?;
            if let Err(e) = repo.merge_base(head.id(), remote_commit.id()) {
                return Err(match e.code() {
                    ErrorCode::NotFound => Error::UnrelatedHistories {
                        branch: branch.to_string(),
                    },
                    _ => Error::Git(e),
                });
            }
        }

        repo.merge(&[&annotated], None, None)
            .map_err(|e| Error::PullFailed {
                message: e.message().to_string(),
            })?;

        let index = repo.index()?;
        if index.has_conflicts() {
            let paths = conflict_paths(&index)?;
            tracing::warn!(branch = %branch, conflicts = paths.len(), "Merge stopped with conflicts");
            return Ok(PullOutcome::Conflicted(paths));
        }
        drop(index);

        self.commit(&format!("Merge {remote_name}/{branch}"))?;
        Ok(PullOutcome::Merged)
    }

    fn abort_merge(&self) -> Result<()> {
        let repo = self.open()?;
        if repo.state() == RepositoryState::Clean {
            return Ok(());
        }
        let head = repo.head()?.peel_to_commit()?;
        repo.reset(head.as_object(), ResetType::Hard, None)?;
        repo.cleanup_state()?;
        tracing::info!(path = %self.workdir, "Aborted merge");
        Ok(())
    }

    fn stash(&self, message: &str) -> Result<bool> {
        if self.diff()?.is_empty() {
            return Ok(false);
        }

        let mut repo = self.open()?;
        if repo.head().is_err() {
            // Nothing to stash against on an unborn branch
            return Ok(false);
        }
        let signature = Self::signature(&repo)?;

        match repo.stash_save(&signature, message, Some(StashFlags::INCLUDE_UNTRACKED)) {
            Ok(oid) => {
                tracing::debug!(stash = %oid, "Stashed local changes");
                Ok(true)
            }
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn stash_pop(&self) -> Result<StashOutcome> {
        let mut repo = self.open()?;

        let mut has_stash = false;
        repo.stash_foreach(|_, _, _| {
            has_stash = true;
            false
        })?;
        if !has_stash {
            return Ok(StashOutcome::Empty);
        }

        repo.stash_apply(0, None).map_err(|e| Error::StashPopFailed {
            message: e.message().to_string(),
        })?;

        let index = repo.index()?;
        if index.has_conflicts() {
            // The entry stays until the conflict is settled
            return Ok(StashOutcome::Conflicted(conflict_paths(&index)?));
        }
        repo.stash_drop(0)?;
        Ok(StashOutcome::Applied)
    }

    fn stash_drop(&self) -> Result<()> {
        let mut repo = self.open()?;
        match repo.stash_drop(0) {
            Ok(()) => Ok(()),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn reset_hard(&self, commit: &str) -> Result<()> {
        let repo = self.open()?;
        let target = repo.find_commit(Oid::from_str(commit)?)?;
        let mut checkout = CheckoutBuilder::new();
        checkout.force().remove_untracked(true);
        repo.reset(target.as_object(), ResetType::Hard, Some(&mut checkout))?;
        repo.cleanup_state()?;
        tracing::info!(path = %self.workdir, commit = %commit, "Reset working tree");
        Ok(())
    }

    fn branch_local(&self) -> Result<BranchSummary> {
        let repo = self.open()?;
        let mut all = Vec::new();
        for entry in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()? {
                all.push(name.to_string());
            }
        }
        all.sort();
        Ok(BranchSummary {
            current: head_branch_name(&repo),
            all,
        })
    }

    fn branch_remote(&self) -> Result<Vec<String>> {
        let repo = self.open()?;
        let mut all = Vec::new();
        for entry in repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()?
                && !name.ends_with("/HEAD")
            {
                all.push(name.to_string());
            }
        }
        all.sort();
        Ok(all)
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        let repo = self.open()?;
        let local_ref = format!("refs/heads/{branch}");
        let tracking = format!("refs/remotes/{DEFAULT_REMOTE}/{branch}");
        let local_exists = repo.find_reference(&local_ref).is_ok();

        // An unborn HEAD on `branch` still picks up the remote-tracking tip
        if head_branch_name(&repo).as_deref() == Some(branch)
            && (local_exists || repo.find_reference(&tracking).is_err())
        {
            return Ok(());
        }

        if !local_exists {
            match repo.find_reference(&tracking) {
                Ok(reference) => {
                    let commit = reference.peel_to_commit()?;
                    repo.branch(branch, &commit, false)?;
                }
                Err(_) => {
                    repo.set_head(&local_ref)?;
                    clear_worktree(&repo)?;
                    tracing::debug!(branch = %branch, "Switched to unborn branch");
                    return Ok(());
                }
            }
        }

        repo.set_head(&local_ref)?;
        repo.checkout_head(Some(
            CheckoutBuilder::default().force().remove_untracked(true),
        ))?;
        tracing::debug!(branch = %branch, "Checked out branch");
        Ok(())
    }

    fn list_remote_heads(&self, remote_name: &str) -> Result<Vec<String>> {
        // Read back from a pruning fetch so an empty remote lists nothing
        self.fetch(remote_name)?;
        let prefix = format!("{remote_name}/");
        Ok(self
            .branch_remote()?
            .into_iter()
            .filter_map(|name| name.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }
}

/// Branch HEAD points at, read from the symbolic ref so unborn branches count.
fn head_branch_name(repo: &Repository) -> Option<String> {
    let head = repo.find_reference("HEAD").ok()?;
    head.symbolic_target()?
        .strip_prefix("refs/heads/")
        .map(str::to_string)
}

fn conflict_paths(index: &Index) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for conflict in index.conflicts()? {
        let conflict = conflict?;
        if let Some(entry) = conflict.our.or(conflict.their).or(conflict.ancestor) {
            paths.push(String::from_utf8_lossy(&entry.path).into_owned());
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Empty the working tree and index, keeping `.git`.
fn clear_worktree(repo: &Repository) -> Result<()> {
    let Some(workdir) = repo.workdir() else {
        return Ok(());
    };
    let entries = std::fs::read_dir(workdir).map_err(|e| syncify_fs::Error::io(workdir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| syncify_fs::Error::io(workdir, e))?;
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        let result = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        result.map_err(|e| syncify_fs::Error::io(&path, e))?;
    }

    let mut index = repo.index()?;
    index.clear()?;
    index.write()?;
    Ok(())
}
