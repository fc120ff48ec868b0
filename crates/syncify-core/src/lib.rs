//! Synchronization engine for Syncify
//!
//! This crate coordinates the lower crates into sync transactions:
//!
//! - **Settings**: per-machine [`LocalSettings`] and the [`SharedSettings`]
//!   profile list that travels with the export
//! - **Profiles**: resolving, switching and creating profiles
//! - **Syncers**: a git remote ([`RepoSyncer`]) or a plain folder
//!   ([`FolderSyncer`]) as export target
//! - **SyncEngine**: transaction wrapper with locking, watcher suspension
//!   and reporting
//!
//! ```text
//!                      CLI
//!                       |
//!                 syncify-core
//!                       |
//!     +----------+------+-------+-------------+
//!     |          |              |             |
//! syncify-fs syncify-git syncify-pragma syncify-extensions
//! ```

pub mod classify;
pub mod conflict;
pub mod context;
pub mod error;
pub mod lock;
pub mod profile;
pub mod settings;
pub mod surface;
pub mod sync;
pub mod watch;

pub use classify::{SyncPosition, classify};
pub use conflict::{ConflictResolver, has_conflict_markers};
pub use context::{CONFLICTS_DIR, SyncContext, SyncPaths};
pub use error::{Error, Result};
pub use lock::{LOCK_FILE, TransactionLock};
pub use profile::ProfileManager;
pub use settings::{
    FileSettings, LOCAL_SETTINGS_FILE, LocalSettings, Profile, REPO_DIR, RepoSettings,
    SHARED_SETTINGS_FILE, SettingsStore, SharedSettings, SyncerKind,
};
pub use surface::{Headless, UserSurface};
pub use sync::{
    ExportSummary, FolderSyncer, ImportSummary, RepoSyncer, SyncEngine, SyncOutcome, SyncReport,
    Syncer, Transfer, create_syncer,
};
pub use watch::{FsWatcher, NullWatcher, UploadScheduler, WatchGuard, Watcher};
