//! Everything a sync transaction needs, built once at startup

use std::sync::Arc;

use syncify_extensions::ExtensionHost;
use syncify_fs::{FileStore, NormalizedPath};
use syncify_pragma::{PragmaContext, PragmaEngine};

use crate::settings::{LocalSettings, REPO_DIR, SettingsStore};
use crate::surface::UserSurface;
use crate::watch::Watcher;

/// Scratch copies of conflicted files, inside the local directory.
pub const CONFLICTS_DIR: &str = "conflicts";

/// The two directories a machine syncs between.
#[derive(Debug, Clone)]
pub struct SyncPaths {
    /// Editor user directory holding `settings.json`, `keybindings.json`, ...
    pub user_dir: NormalizedPath,
    /// Per-machine Syncify directory; never synced
    pub local_dir: NormalizedPath,
}

impl SyncPaths {
    pub fn new(user_dir: NormalizedPath, local_dir: NormalizedPath) -> Self {
        Self {
            user_dir,
            local_dir,
        }
    }

    pub fn repo_dir(&self) -> NormalizedPath {
        self.local_dir.join(REPO_DIR)
    }

    pub fn conflicts_dir(&self) -> NormalizedPath {
        self.local_dir.join(CONFLICTS_DIR)
    }
}

/// Collaborators shared by every component of a transaction.
pub struct SyncContext {
    pub paths: SyncPaths,
    pub settings: SettingsStore,
    pub files: Arc<dyn FileStore>,
    pub extensions: Arc<dyn ExtensionHost>,
    pub watcher: Arc<dyn Watcher>,
    pub surface: Arc<dyn UserSurface>,
}

impl SyncContext {
    pub fn new(
        paths: SyncPaths,
        files: Arc<dyn FileStore>,
        extensions: Arc<dyn ExtensionHost>,
        watcher: Arc<dyn Watcher>,
        surface: Arc<dyn UserSurface>,
    ) -> Self {
        let settings = SettingsStore::new(paths.local_dir.clone());
        Self {
            paths,
            settings,
            files,
            extensions,
            watcher,
            surface,
        }
    }

    /// Pragma transforms for this machine as `local` describes it.
    pub fn pragma(&self, local: &LocalSettings) -> PragmaEngine {
        PragmaEngine::new(PragmaContext::current(local.hostname.clone()))
    }
}
