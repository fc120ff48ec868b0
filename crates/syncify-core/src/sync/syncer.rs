//! Syncer contract and selection

use crate::Result;
use crate::context::{SyncContext, SyncPaths};
use crate::settings::SyncerKind;
use crate::sync::engine::SyncReport;
use crate::sync::folder::FolderSyncer;
use crate::sync::repo::RepoSyncer;

/// Moves configuration between the user directory and one kind of export
/// target.
///
/// Operations return `Err` for failures that abort the whole transaction;
/// per-file problems are recorded in the returned report.
pub trait Syncer: Send + Sync {
    fn kind(&self) -> SyncerKind;

    /// Whether the target and the current profile are both usable.
    fn is_configured(&self, ctx: &SyncContext) -> bool;

    /// Create the export target if needed.
    fn init(&self, ctx: &SyncContext) -> Result<()>;

    /// Upload or download, whichever the current state calls for.
    fn sync(&self, ctx: &SyncContext) -> Result<SyncReport>;

    fn upload(&self, ctx: &SyncContext) -> Result<SyncReport>;

    fn download(&self, ctx: &SyncContext) -> Result<SyncReport>;
}

pub fn create_syncer(kind: SyncerKind, paths: &SyncPaths) -> Box<dyn Syncer> {
    match kind {
        SyncerKind::Repo => Box::new(RepoSyncer::new(paths)),
        SyncerKind::File => Box::new(FolderSyncer::new()),
    }
}
