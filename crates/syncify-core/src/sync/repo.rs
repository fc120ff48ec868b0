//! Version-control syncer: one branch per profile on a git remote
//!
//! The working tree lives in `<local>/repo`. Exported files sit at the
//! root of the tree next to `extensions.json` and the shared `syncify.json`.

use chrono::Utc;
use syncify_fs::NormalizedPath;
use syncify_git::{
    DEFAULT_REMOTE, GitBackend, PullOptions, PullOutcome, StashOutcome, VersionControl,
};

use crate::classify::{SyncPosition, classify};
use crate::conflict::ConflictResolver;
use crate::context::{SyncContext, SyncPaths};
use crate::profile::ProfileManager;
use crate::settings::{LocalSettings, Profile, SyncerKind};
use crate::sync::engine::{SyncOutcome, SyncReport};
use crate::sync::syncer::Syncer;
use crate::sync::transfer::{Transfer, record_import};
use crate::{Error, Result};

/// Settings and profile a transaction runs against.
struct Session {
    local: LocalSettings,
    profile: Profile,
    /// The profile branch had no local commits before this transaction
    fresh: bool,
}

impl Session {
    fn branch(&self) -> &str {
        &self.profile.branch
    }

    fn local_ref(&self) -> String {
        format!("refs/heads/{}", self.profile.branch)
    }

    fn remote_ref(&self) -> String {
        format!("refs/remotes/{DEFAULT_REMOTE}/{}", self.profile.branch)
    }

    fn commit_message(&self) -> String {
        let host = match self.local.hostname.trim() {
            "" => "unknown host",
            host => host,
        };
        format!(
            "Update profile '{}' from {} at {}",
            self.profile.name,
            host,
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

fn remote_url(local: &LocalSettings) -> Option<&str> {
    local
        .repo
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
}

fn describe_pull(outcome: &PullOutcome, branch: &str) -> String {
    match outcome {
        PullOutcome::UpToDate => format!("Branch '{branch}' already up to date"),
        PullOutcome::FastForward => format!("Fast-forwarded '{branch}'"),
        PullOutcome::Merged => format!("Merged remote changes into '{branch}'"),
        PullOutcome::Reset => format!("Reset '{branch}' to the remote"),
        PullOutcome::Conflicted(paths) => {
            format!("Merge of '{branch}' stopped on {} conflict(s)", paths.len())
        }
    }
}

/// [`Syncer`] backed by a git remote.
pub struct RepoSyncer {
    vcs: Box<dyn VersionControl>,
}

impl RepoSyncer {
    pub fn new(paths: &SyncPaths) -> Self {
        Self::with_backend(Box::new(GitBackend::new(paths.repo_dir())))
    }

    /// Use another backend. Its working tree must be `<local>/repo`, where
    /// the settings store looks for the shared settings.
    pub fn with_backend(vcs: Box<dyn VersionControl>) -> Self {
        Self { vcs }
    }

    fn tree(&self) -> &NormalizedPath {
        self.vcs.workdir()
    }

    fn ensure_remote(&self, url: &str) -> Result<()> {
        let remotes = self.vcs.get_remotes()?;
        match remotes.iter().find(|remote| remote.name == DEFAULT_REMOTE) {
            Some(remote) if remote.url.as_deref() == Some(url) => return Ok(()),
            Some(_) => {
                self.vcs.remove_remote(DEFAULT_REMOTE)?;
                tracing::info!(url = %url, "Repository URL changed");
            }
            None => {}
        }
        self.vcs.add_remote(DEFAULT_REMOTE, url)?;
        Ok(())
    }

    /// Open the tree on the current profile's branch.
    ///
    /// The shared settings are carried across the checkout so a branch
    /// without its own copy still knows the profile list.
    fn prepare(&self, ctx: &SyncContext) -> Result<Session> {
        let local = ctx.settings.get_local()?;
        let url = remote_url(&local)
            .ok_or_else(|| Error::not_configured("no repository URL set"))?
            .to_string();

        self.vcs.init()?;
        self.ensure_remote(&url)?;
        let profile = ProfileManager::new(&ctx.settings).get_current()?;
        let shared = ctx.settings.get_shared()?;

        let fresh = self
            .vcs
            .rev_parse(&format!("refs/heads/{}", profile.branch))?
            .is_none();

        self.vcs.fetch(DEFAULT_REMOTE)?;
        self.vcs.checkout(&profile.branch)?;
        if !ctx.settings.has_shared()? {
            ctx.settings.set_shared(&shared)?;
        }
        Ok(Session {
            local,
            profile,
            fresh,
        })
    }

    fn position(&self, session: &Session) -> Result<SyncPosition> {
        classify(
            self.vcs.as_ref(),
            &session.local_ref(),
            &session.remote_ref(),
        )
    }

    fn export(&self, ctx: &SyncContext, session: &Session, report: &mut SyncReport) -> Result<()> {
        let transfer = Transfer::new(ctx, &session.local);
        let summary = transfer.export(self.tree(), false)?;
        report.warnings.extend(summary.warnings);
        transfer.record_extensions(self.tree(), false, report)?;
        if !ctx.settings.has_shared()? {
            ctx.settings.set_shared(&ctx.settings.get_shared()?)?;
        }
        Ok(())
    }

    /// Commit the exported tree and bring the remote up to date with it.
    fn publish(
        &self,
        ctx: &SyncContext,
        session: &Session,
        mut report: SyncReport,
    ) -> Result<SyncReport> {
        let changed = self.vcs.diff()?;
        if !changed.is_empty() || session.local.force_upload {
            self.vcs.add()?;
            let id = self.vcs.commit(&session.commit_message())?;
            report.action(format!(
                "Committed {} changed file(s) as {}",
                changed.len(),
                &id[..id.len().min(8)]
            ));
        }

        let position = self.position(session)?;
        tracing::debug!(branch = %session.branch(), %position, "Publishing");
        if position == SyncPosition::UpToDate {
            return Ok(report
                .with_action("Remote already has these settings")
                .with_outcome(SyncOutcome::UpToDate));
        }
        if position.requires_merge() && !session.local.force_upload {
            return self.merge_remote(ctx, session, report);
        }
        if self.vcs.rev_parse(&session.local_ref())?.is_none() {
            return Ok(report
                .with_action("Nothing to upload")
                .with_outcome(SyncOutcome::UpToDate));
        }

        let force = position.requires_merge();
        self.vcs.push(DEFAULT_REMOTE, session.branch(), force)?;
        if force {
            report.warn(format!(
                "Remote history of '{}' was overwritten",
                session.branch()
            ));
        }
        report.action(format!(
            "Uploaded profile '{}' to branch '{}'",
            session.profile.name,
            session.branch()
        ));
        Ok(report.with_outcome(SyncOutcome::Uploaded))
    }

    /// The remote moved on: merge it, import the result, then push.
    fn merge_remote(
        &self,
        ctx: &SyncContext,
        session: &Session,
        mut report: SyncReport,
    ) -> Result<SyncReport> {
        report.action("Remote has newer changes; merging before upload");
        let outcome = self.vcs.pull(
            DEFAULT_REMOTE,
            session.branch(),
            PullOptions {
                force: false,
                allow_unrelated_histories: true,
            },
        )?;
        report.action(describe_pull(&outcome, session.branch()));

        if self.apply_remote(ctx, session, &outcome, &mut report)? {
            self.vcs.push(DEFAULT_REMOTE, session.branch(), false)?;
            report.action(format!("Uploaded merged profile '{}'", session.profile.name));
        }
        Ok(report.with_outcome(SyncOutcome::Merged))
    }

    /// Import the tree after a pull, concluding a conflicted merge once
    /// every conflict is resolved. An unresolved conflict aborts the merge.
    /// Returns whether the tree is consistent.
    fn apply_remote(
        &self,
        ctx: &SyncContext,
        session: &Session,
        outcome: &PullOutcome,
        report: &mut SyncReport,
    ) -> Result<bool> {
        if let PullOutcome::Conflicted(paths) = outcome {
            report.warn(format!("Merge conflicts in: {}", paths.join(", ")));
        }

        let resolver = ConflictResolver::new(
            ctx.files.as_ref(),
            ctx.surface.as_ref(),
            ctx.paths.conflicts_dir(),
        );
        let summary = Transfer::new(ctx, &session.local).import(self.tree(), &resolver)?;
        let unresolved = !summary.unresolved.is_empty();
        record_import(summary, report);

        if !matches!(outcome, PullOutcome::Conflicted(_)) {
            return Ok(!unresolved);
        }
        if unresolved {
            self.vcs.abort_merge()?;
            report.warn("Merge abandoned; the remote changes will be offered again");
            return Ok(false);
        }
        self.vcs.add()?;
        self.vcs
            .commit(&format!("Merge remote profile '{}'", session.branch()))?;
        report.action("Committed resolved merge");
        Ok(true)
    }

    /// Pull the remote profile into the tree and import it. Local edits are
    /// stashed around the pull; when re-applying them conflicts and the user
    /// does not resolve it, the tree is rolled back to where it started so
    /// the next run offers the same conflict again.
    fn download_session(
        &self,
        ctx: &SyncContext,
        session: &Session,
        mut report: SyncReport,
    ) -> Result<SyncReport> {
        // `prepare` fetched, so the tracking ref answers for the remote
        if self.vcs.rev_parse(&session.remote_ref())?.is_none() {
            return Ok(report
                .with_action(format!(
                    "Remote has no data for profile '{}' yet",
                    session.profile.name
                ))
                .with_outcome(SyncOutcome::NoRemoteData));
        }

        let force = session.local.force_download;
        let start = self.vcs.rev_parse(&session.local_ref())?;
        let stashed = self.vcs.stash("syncify: local changes before download")?;
        let outcome = self.vcs.pull(
            DEFAULT_REMOTE,
            session.branch(),
            PullOptions {
                force,
                allow_unrelated_histories: true,
            },
        )?;
        report.action(describe_pull(&outcome, session.branch()));

        let mut stash_conflicted = false;
        if stashed {
            if force || matches!(outcome, PullOutcome::Conflicted(_)) {
                report.warn("Local changes were left in the stash");
            } else {
                match self.vcs.stash_pop() {
                    Ok(StashOutcome::Conflicted(paths)) => {
                        stash_conflicted = true;
                        report.warn(format!(
                            "Local changes conflict with the remote in: {}",
                            paths.join(", ")
                        ));
                    }
                    Ok(_) => {}
                    Err(e) => report.warn(format!("Local changes remain stashed: {e}")),
                }
            }
        }

        let consistent = self.apply_remote(ctx, session, &outcome, &mut report)?;
        if stash_conflicted {
            if consistent {
                // Settle the conflict entries the stash left in the index
                self.vcs.add()?;
                self.vcs.stash_drop()?;
                report.action("Combined local changes with the remote");
            } else if let Some(start) = start.as_deref() {
                self.vcs.reset_hard(start)?;
                self.vcs.stash_pop()?;
                report.warn("Download rolled back; the remote changes will be offered again");
                return Ok(report.with_outcome(SyncOutcome::Downloaded));
            }
        }
        if consistent {
            Transfer::new(ctx, &session.local).apply_extensions(
                self.tree(),
                &session.profile,
                &mut report,
            )?;
        }
        Ok(report.with_outcome(SyncOutcome::Downloaded))
    }
}

impl Syncer for RepoSyncer {
    fn kind(&self) -> SyncerKind {
        SyncerKind::Repo
    }

    fn is_configured(&self, ctx: &SyncContext) -> bool {
        let Ok(local) = ctx.settings.get_local() else {
            return false;
        };
        remote_url(&local).is_some() && ProfileManager::new(&ctx.settings).get_current().is_ok()
    }

    fn init(&self, ctx: &SyncContext) -> Result<()> {
        self.prepare(ctx).map(|_| ())
    }

    fn sync(&self, ctx: &SyncContext) -> Result<SyncReport> {
        let session = self.prepare(ctx)?;
        let position = self.position(&session)?;
        if session.fresh && position != SyncPosition::Unborn {
            // First sync of an existing profile on this machine
            tracing::info!(branch = %session.branch(), "Taking the remote profile first");
            return self.download_session(ctx, &session, SyncReport::success());
        }

        let mut report = SyncReport::success();
        self.export(ctx, &session, &mut report)?;

        let dirty = !self.vcs.diff()?.is_empty() || position == SyncPosition::Ahead;
        tracing::info!(branch = %session.branch(), %position, dirty, "Sync state");

        if dirty && position != SyncPosition::Behind {
            self.publish(ctx, &session, report)
        } else if matches!(
            position,
            SyncPosition::Behind | SyncPosition::Unborn | SyncPosition::Diverged
        ) {
            self.download_session(ctx, &session, report)
        } else {
            Ok(report
                .with_action("Everything is up to date")
                .with_outcome(SyncOutcome::UpToDate))
        }
    }

    fn upload(&self, ctx: &SyncContext) -> Result<SyncReport> {
        let session = self.prepare(ctx)?;
        let mut report = SyncReport::success();
        self.export(ctx, &session, &mut report)?;
        self.publish(ctx, &session, report)
    }

    fn download(&self, ctx: &SyncContext) -> Result<SyncReport> {
        let session = self.prepare(ctx)?;
        self.download_session(ctx, &session, SyncReport::success())
    }
}
