//! Folder syncer: one subfolder per profile under a plain directory

use syncify_fs::NormalizedPath;
use syncify_git::branch_to_folder;

use crate::conflict::ConflictResolver;
use crate::context::SyncContext;
use crate::profile::ProfileManager;
use crate::settings::{LocalSettings, Profile, SyncerKind};
use crate::sync::engine::{SyncOutcome, SyncReport};
use crate::sync::syncer::Syncer;
use crate::sync::transfer::{Transfer, record_import};
use crate::{Error, Result};

struct Session {
    local: LocalSettings,
    profile: Profile,
    /// `<root>/<profile folder>`
    dir: NormalizedPath,
}

fn export_root(local: &LocalSettings) -> Option<NormalizedPath> {
    local
        .file
        .path
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(NormalizedPath::new)
}

/// [`Syncer`] writing to a folder, typically one another tool replicates.
///
/// The shared `syncify.json` sits at the folder root; each profile's files
/// live in a subfolder named after its branch.
#[derive(Debug, Default, Clone, Copy)]
pub struct FolderSyncer;

impl FolderSyncer {
    pub fn new() -> Self {
        Self
    }

    fn prepare(&self, ctx: &SyncContext) -> Result<Session> {
        let local = ctx.settings.get_local()?;
        let root = export_root(&local).ok_or_else(|| Error::not_configured("no export folder set"))?;
        ctx.files.mkdir(&root)?;
        if !ctx.settings.has_shared()? {
            ctx.settings.set_shared(&ctx.settings.get_shared()?)?;
        }

        let profile = ProfileManager::new(&ctx.settings).get_current()?;
        let dir = root.join(&branch_to_folder(&profile.branch));
        Ok(Session {
            local,
            profile,
            dir,
        })
    }

    fn upload_session(&self, ctx: &SyncContext, session: &Session) -> Result<SyncReport> {
        let mut report = SyncReport::success();
        let transfer = Transfer::new(ctx, &session.local);
        let summary = transfer.export(&session.dir, false)?;
        let manifest_changed = transfer.record_extensions(&session.dir, false, &mut report)?;

        for path in &summary.changed {
            report.action(format!("Exported {path}"));
        }
        for path in &summary.removed {
            report.action(format!("Removed {path} from the export"));
        }
        report.warnings.extend(summary.warnings.iter().cloned());

        if summary.is_empty() && !manifest_changed && !session.local.force_upload {
            return Ok(report.with_outcome(SyncOutcome::UpToDate));
        }
        tracing::info!(
            profile = %session.profile.name,
            dir = %session.dir,
            changed = summary.changed.len(),
            "Uploaded profile"
        );
        Ok(report.with_outcome(SyncOutcome::Uploaded))
    }

    fn download_session(&self, ctx: &SyncContext, session: &Session) -> Result<SyncReport> {
        if !session.dir.is_dir() {
            return Ok(SyncReport::success()
                .with_action(format!(
                    "Export folder has no data for profile '{}' yet",
                    session.profile.name
                ))
                .with_outcome(SyncOutcome::NoRemoteData));
        }

        let mut report = SyncReport::success();
        let resolver = ConflictResolver::new(
            ctx.files.as_ref(),
            ctx.surface.as_ref(),
            ctx.paths.conflicts_dir(),
        );
        let transfer = Transfer::new(ctx, &session.local);
        let summary = transfer.import(&session.dir, &resolver)?;
        record_import(summary, &mut report);
        transfer.apply_extensions(&session.dir, &session.profile, &mut report)?;
        Ok(report.with_outcome(SyncOutcome::Downloaded))
    }
}

impl Syncer for FolderSyncer {
    fn kind(&self) -> SyncerKind {
        SyncerKind::File
    }

    fn is_configured(&self, ctx: &SyncContext) -> bool {
        let Ok(local) = ctx.settings.get_local() else {
            return false;
        };
        export_root(&local).is_some() && ProfileManager::new(&ctx.settings).get_current().is_ok()
    }

    fn init(&self, ctx: &SyncContext) -> Result<()> {
        let session = self.prepare(ctx)?;
        ctx.files.mkdir(&session.dir)?;
        Ok(())
    }

    /// Upload when the export folder is missing or would change, otherwise
    /// report up to date.
    fn sync(&self, ctx: &SyncContext) -> Result<SyncReport> {
        let session = self.prepare(ctx)?;
        if session.dir.is_dir() {
            let transfer = Transfer::new(ctx, &session.local);
            let pending = transfer.export(&session.dir, true)?;
            let mut scratch = SyncReport::success();
            let manifest_pending = transfer.record_extensions(&session.dir, true, &mut scratch)?;
            if pending.is_empty() && !manifest_pending {
                return Ok(SyncReport::success()
                    .with_action("Everything is up to date")
                    .with_outcome(SyncOutcome::UpToDate));
            }
        }
        self.upload_session(ctx, &session)
    }

    fn upload(&self, ctx: &SyncContext) -> Result<SyncReport> {
        let session = self.prepare(ctx)?;
        self.upload_session(ctx, &session)
    }

    fn download(&self, ctx: &SyncContext) -> Result<SyncReport> {
        let session = self.prepare(ctx)?;
        self.download_session(ctx, &session)
    }
}
