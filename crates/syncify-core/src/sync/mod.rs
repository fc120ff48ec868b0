//! Synchronization between the editor user directory and an export target
//!
//! This module provides:
//! - **engine**: transaction wrapper and the [`SyncReport`] it returns
//! - **syncer**: the [`Syncer`] contract and selection by settings
//! - **repo**: git remote target, one branch per profile
//! - **folder**: plain folder target, one subfolder per profile
//! - **transfer**: export and import of files and extensions

mod engine;
mod folder;
mod repo;
mod syncer;
mod transfer;

pub use engine::{SyncEngine, SyncOutcome, SyncReport};
pub use folder::FolderSyncer;
pub use repo::RepoSyncer;
pub use syncer::{Syncer, create_syncer};
pub use transfer::{ExportSummary, ImportSummary, RESERVED_FILES, Transfer, os_keybindings};
