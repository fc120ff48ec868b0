//! Machines, fake extension hosts and scripted users for syncer tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use syncify_core::{
    LocalSettings, NullWatcher, SettingsStore, SyncContext, SyncEngine, SyncPaths, SyncerKind,
    UserSurface,
};
use syncify_extensions::ExtensionHost;
use syncify_fs::{LocalFileStore, NormalizedPath};
use syncify_test_utils::editor::EditorDir;
use tempfile::TempDir;

/// Extension host over an in-memory set. Uninstalling an installed
/// extension reports it as active.
#[derive(Default)]
pub struct FakeExtensions {
    installed: Mutex<BTreeSet<String>>,
}

impl FakeExtensions {
    pub fn with(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            installed: Mutex::new(ids.iter().map(|id| id.to_string()).collect()),
        })
    }

    pub fn installed(&self) -> Vec<String> {
        self.installed.lock().unwrap().iter().cloned().collect()
    }
}

impl ExtensionHost for FakeExtensions {
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

/// User that answers each conflict with the next queued resolution and
/// gives up once the queue is empty.
#[derive(Default)]
pub struct ScriptedSurface {
    resolutions: Mutex<VecDeque<String>>,
    statuses: Mutex<Vec<String>>,
    reloads: Mutex<usize>,
}

impl ScriptedSurface {
    pub fn resolve_with(&self, content: &str) {
        self.resolutions
            .lock()
            .unwrap()
            .push_back(content.to_string());
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn reloads(&self) -> usize {
        *self.reloads.lock().unwrap()
    }
}

impl UserSurface for ScriptedSurface {
    fn await_resolution(&self, _path: &NormalizedPath, scratch: &NormalizedPath) -> bool {
        match self.resolutions.lock().unwrap().pop_front() {
            Some(content) => {
                std::fs::write(scratch.to_native(), content).unwrap();
                true
            }
            None => false,
        }
    }

    fn confirm_reload(&self) -> bool {
        *self.reloads.lock().unwrap() += 1;
        true
    }

    fn select_profile(&self, names: &[String]) -> Option<String> {
        names.first().cloned()
    }

    fn status(&self, message: &str) {
        self.statuses.lock().unwrap().push(message.to_string());
    }
}

/// One editor installation: a user directory, a Syncify local directory and
/// the fakes its transactions talk to.
pub struct Machine {
    pub editor: EditorDir,
    local: TempDir,
    pub extensions: Arc<FakeExtensions>,
    pub surface: Arc<ScriptedSurface>,
}

impl Machine {
    pub fn new(hostname: &str, extensions: &[&str]) -> Self {
        let machine = Self {
            editor: EditorDir::new(),
            local: TempDir::new().unwrap(),
            extensions: FakeExtensions::with(extensions),
            surface: Arc::new(ScriptedSurface::default()),
        };
        machine.update(|local| local.hostname = hostname.to_string());
        machine
    }

    /// A machine syncing through the git remote at `remote`.
    pub fn repo(hostname: &str, remote: &Path, extensions: &[&str]) -> Self {
        let machine = Self::new(hostname, extensions);
        machine.update(|local| {
            local.syncer = SyncerKind::Repo;
            local.repo.url = Some(remote.to_string_lossy().into_owned());
        });
        machine
    }

    /// A machine syncing through the folder at `folder`.
    pub fn folder(hostname: &str, folder: &Path, extensions: &[&str]) -> Self {
        let machine = Self::new(hostname, extensions);
        machine.update(|local| {
            local.syncer = SyncerKind::File;
            local.file.path = Some(folder.to_string_lossy().into_owned());
        });
        machine
    }

    pub fn local_dir(&self) -> NormalizedPath {
        NormalizedPath::new(self.local.path())
    }

    pub fn paths(&self) -> SyncPaths {
        SyncPaths::new(NormalizedPath::new(self.editor.root()), self.local_dir())
    }

    pub fn settings(&self) -> SettingsStore {
        SettingsStore::new(self.local_dir())
    }

    pub fn update(&self, edit: impl FnOnce(&mut LocalSettings)) {
        let store = self.settings();
        let mut local = store.get_local().unwrap();
        edit(&mut local);
        store.set_local(&local).unwrap();
    }

    pub fn context(&self) -> SyncContext {
        SyncContext::new(
            self.paths(),
            Arc::new(LocalFileStore::new()),
            self.extensions.clone(),
            Arc::new(NullWatcher),
            self.surface.clone(),
        )
    }

    pub fn engine(&self) -> SyncEngine {
        SyncEngine::new(self.context()).unwrap()
    }
}
