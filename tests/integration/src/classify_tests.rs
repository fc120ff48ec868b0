//! Branch classification against real repositories sharing a bare remote.

use std::fs;

use pretty_assertions::assert_eq;
use syncify_core::{SyncPosition, classify};
use syncify_fs::NormalizedPath;
use syncify_git::{DEFAULT_REMOTE, GitBackend, VersionControl};
use syncify_test_utils::git::bare_remote;
use tempfile::TempDir;

const LOCAL: &str = "refs/heads/main";
const REMOTE: &str = "refs/remotes/origin/main";

struct Checkout {
    dir: TempDir,
    backend: GitBackend,
}

impl Checkout {
    fn new(remote: &std::path::Path) -> Self {
        let dir = TempDir::new().unwrap();
        let backend = GitBackend::new(NormalizedPath::new(dir.path()));
        backend.init().unwrap();
        backend
            .add_remote(DEFAULT_REMOTE, &remote.to_string_lossy())
            .unwrap();
        backend.fetch(DEFAULT_REMOTE).unwrap();
        backend.checkout("main").unwrap();
        Self { dir, backend }
    }

    fn commit(&self, content: &str) {
        fs::write(self.dir.path().join("settings.json"), content).unwrap();
        self.backend.add().unwrap();
        self.backend.commit(content).unwrap();
    }

    fn push(&self) {
        self.backend.push(DEFAULT_REMOTE, "main", false).unwrap();
        self.backend.fetch(DEFAULT_REMOTE).unwrap();
    }

    fn position(&self) -> SyncPosition {
        self.backend.fetch(DEFAULT_REMOTE).unwrap();
        classify(&self.backend, LOCAL, REMOTE).unwrap()
    }
}

fn remote() -> (TempDir, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = bare_remote(&temp.path().join("remote.git"));
    (temp, path)
}

#[test]
fn test_empty_remote_is_unborn() {
    let (_temp, remote) = remote();
    let laptop = Checkout::new(&remote);
    assert_eq!(laptop.position(), SyncPosition::Unborn);

    laptop.commit("{\"k\":1}");
    assert_eq!(laptop.position(), SyncPosition::Unborn);
}

#[test]
fn test_identical_tips_are_up_to_date_after_long_history() {
    let (_temp, remote) = remote();
    let laptop = Checkout::new(&remote);
    for k in 1..=4 {
        laptop.commit(&format!("{{\"k\":{k}}}"));
    }
    laptop.push();

    assert_eq!(laptop.position(), SyncPosition::UpToDate);
}

#[test]
fn test_ahead_behind_and_diverged() {
    let (_temp, remote) = remote();
    let laptop = Checkout::new(&remote);
    laptop.commit("{\"k\":1}");
    laptop.push();

    let desktop = Checkout::new(&remote);
    assert_eq!(desktop.position(), SyncPosition::UpToDate);

    laptop.commit("{\"k\":2}");
    assert_eq!(laptop.position(), SyncPosition::Ahead);

    laptop.push();
    assert_eq!(desktop.position(), SyncPosition::Behind);

    desktop.commit("{\"k\":false}");
    assert_eq!(desktop.position(), SyncPosition::Diverged);
    assert!(desktop.position().requires_merge());
}
