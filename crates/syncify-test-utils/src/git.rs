//! Git fixtures built with `git2` only, so tests need no `git` binary.

use std::fs;
use std::path::{Path, PathBuf};

use git2::{Repository, Signature};

/// Creates a bare repository at `path` acting as the shared remote.
///
/// # Panics
/// Panics if the repository cannot be created.
pub fn bare_remote(path: &Path) -> PathBuf {
    Repository::init_bare(path)
        .unwrap_or_else(|e| panic!("bare_remote: failed to init at {}: {e}", path.display()));
    path.to_path_buf()
}

/// Clones `remote` into `path`.
///
/// Cloning an empty remote yields an empty repository with `origin` set.
///
/// # Panics
/// Panics if the clone fails.
pub fn clone_remote(remote: &Path, path: &Path) -> Repository {
    let url = remote.to_string_lossy().to_string();
    Repository::clone(&url, path)
        .unwrap_or_else(|e| panic!("clone_remote: failed to clone {url}: {e}"))
}

/// Writes `content` to `relative` inside the work tree of `repo`, stages
/// everything and commits on the current branch. Returns the commit id.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_file(repo: &Repository, relative: &str, content: &str, message: &str) -> String {
    let workdir = repo
        .workdir()
        .unwrap_or_else(|| panic!("commit_file: repository is bare"));
    let target = workdir.join(relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&target, content).unwrap();

    let mut index = repo.index().unwrap();
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let signature = Signature::now("Test User", "test@example.com").unwrap();
    let parent = repo.head().ok().map(|head| head.peel_to_commit().unwrap());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap_or_else(|e| panic!("commit_file: commit failed: {e}"))
        .to_string()
}

/// Points HEAD of `repo` at `branch` (unborn if it has no commits yet).
///
/// # Panics
/// Panics if HEAD cannot be updated.
pub fn set_head_branch(repo: &Repository, branch: &str) {
    repo.set_head(&format!("refs/heads/{branch}"))
        .unwrap_or_else(|e| panic!("set_head_branch: {e}"));
}

/// Pushes `branch` from `repo` to its `origin` remote.
///
/// # Panics
/// Panics if the push fails.
pub fn push_branch(repo: &Repository, branch: &str) {
    let mut remote = repo.find_remote("origin").unwrap();
    let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
    remote
        .push(&[refspec.as_str()], None)
        .unwrap_or_else(|e| panic!("push_branch: failed to push {branch}: {e}"));
}

/// Reads a file at `relative` from the tip of `branch` in any repository
/// (bare or not). Returns `None` when the branch or file is missing.
pub fn read_blob(repo_path: &Path, branch: &str, relative: &str) -> Option<String> {
    let repo = Repository::open(repo_path).ok()?;
    let commit = repo
        .find_reference(&format!("refs/heads/{branch}"))
        .ok()?
        .peel_to_commit()
        .ok()?;
    let entry = commit.tree().ok()?.get_path(Path::new(relative)).ok()?;
    let blob = repo.find_blob(entry.id()).ok()?;
    Some(String::from_utf8_lossy(blob.content()).into_owned())
}
