//! Simulated machines sharing one export target.

#![allow(dead_code)]

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use syncify_core::{
    NullWatcher, SettingsStore, SyncContext, SyncEngine, SyncPaths, SyncerKind, UserSurface,
};
use syncify_extensions::ExtensionHost;
use syncify_fs::{LocalFileStore, NormalizedPath};
use syncify_test_utils::editor::EditorDir;
use syncify_test_utils::git::bare_remote;
use tempfile::TempDir;

/// A bare git remote in a temporary directory.
pub struct Remote {
    _temp: TempDir,
    pub path: PathBuf,
}

impl Remote {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let path = bare_remote(&temp.path().join("settings.git"));
        Self { _temp: temp, path }
    }

    pub fn read(&self, branch: &str, relative: &str) -> Option<String> {
        syncify_test_utils::git::read_blob(&self.path, branch, relative)
    }
}

#[derive(Default)]
pub struct Extensions {
    installed: Mutex<BTreeSet<String>>,
}

impl Extensions {
    pub fn installed(&self) -> Vec<String> {
        self.installed.lock().unwrap().iter().cloned().collect()
    }
}

impl ExtensionHost for Extensions {
    fn list_installed(&self) -> syncify_extensions::Result<Vec<String>> {
        Ok(self.installed())
    }

    fn install(&self, id: &str) -> syncify_extensions::Result<()> {
        self.installed.lock().unwrap().insert(id.to_string());
        Ok(())
    }

    fn uninstall(&self, id: &str) -> syncify_extensions::Result<bool> {
        Ok(self.installed.lock().unwrap().remove(id))
    }
}

/// Answers conflicts from a queue; an empty queue means the user walked
/// away. Records which files it was asked about.
#[derive(Default)]
pub struct User {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl User {
    pub fn will_resolve_with(&self, content: &str) {
        self.answers.lock().unwrap().push_back(content.to_string());
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl UserSurface for User {
    fn await_resolution(&self, path: &NormalizedPath, scratch: &NormalizedPath) -> bool {
        self.asked.lock().unwrap().push(path.to_string());
        match self.answers.lock().unwrap().pop_front() {
            Some(content) => {
                std::fs::write(scratch.to_native(), content).unwrap();
                true
            }
            None => false,
        }
    }

    fn confirm_reload(&self) -> bool {
        false
    }

    fn select_profile(&self, _names: &[String]) -> Option<String> {
        None
    }

    fn status(&self, _message: &str) {}
}

pub struct Machine {
    pub editor: EditorDir,
    local: TempDir,
    pub extensions: Arc<Extensions>,
    pub user: Arc<User>,
}

impl Machine {
    fn new(hostname: &str, syncer: SyncerKind, target: &Path) -> Self {
        let machine = Self {
            editor: EditorDir::new(),
            local: TempDir::new().unwrap(),
            extensions: Arc::new(Extensions::default()),
            user: Arc::new(User::default()),
        };
        let store = machine.settings();
        let mut local = store.get_local().unwrap();
        local.hostname = hostname.to_string();
        local.syncer = syncer;
        let target = Some(target.to_string_lossy().into_owned());
        match syncer {
            SyncerKind::Repo => local.repo.url = target,
            SyncerKind::File => local.file.path = target,
        }
        store.set_local(&local).unwrap();
        machine
    }

    pub fn repo(hostname: &str, remote: &Remote) -> Self {
        Self::new(hostname, SyncerKind::Repo, &remote.path)
    }

    pub fn folder(hostname: &str, folder: &Path) -> Self {
        Self::new(hostname, SyncerKind::File, folder)
    }

    pub fn with_extensions(self, ids: &[&str]) -> Self {
        for id in ids {
            self.extensions.install(id).unwrap();
        }
        self
    }

    pub fn paths(&self) -> SyncPaths {
        SyncPaths::new(
            NormalizedPath::new(self.editor.root()),
            NormalizedPath::new(self.local.path()),
        )
    }

    pub fn settings(&self) -> SettingsStore {
        SettingsStore::new(NormalizedPath::new(self.local.path()))
    }

    pub fn engine(&self) -> SyncEngine {
        let context = SyncContext::new(
            self.paths(),
            Arc::new(LocalFileStore::new()),
            self.extensions.clone(),
            Arc::new(NullWatcher),
            self.user.clone(),
        );
        SyncEngine::new(context).unwrap()
    }
}
