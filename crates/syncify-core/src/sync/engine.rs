//! SyncEngine: the transaction wrapper around a syncer

use serde::Serialize;

use crate::context::SyncContext;
use crate::lock::TransactionLock;
use crate::profile::ProfileManager;
use crate::settings::SyncerKind;
use crate::sync::syncer::{Syncer, create_syncer};
use crate::watch::WatchGuard;
use crate::{Error, Result};

/// What a completed operation ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Uploaded,
    Downloaded,
    UpToDate,
    /// The remote holds nothing for the current profile yet
    NoRemoteData,
    /// Remote changes were merged before uploading
    Merged,
    NotConfigured,
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Uploaded => "uploaded",
            Self::Downloaded => "downloaded",
            Self::UpToDate => "up to date",
            Self::NoRemoteData => "no remote data",
            Self::Merged => "merged",
            Self::NotConfigured => "not configured",
        };
        f.write_str(label)
    }
}

/// Report from a sync, upload or download
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Whether the operation completed without errors
    pub success: bool,
    pub outcome: Option<SyncOutcome>,
    /// Actions taken during the operation
    pub actions: Vec<String>,
    pub warnings: Vec<String>,
    /// Errors encountered during the operation
    pub errors: Vec<String>,
    /// An uninstalled extension was active; the editor should reload
    pub reload_required: bool,
}

impl SyncReport {
    /// Create a successful sync report
    pub fn success() -> Self {
        Self {
            success: true,
            outcome: None,
            actions: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            reload_required: false,
        }
    }

    /// Create a failed sync report
    pub fn failure(error: impl Into<String>) -> Self {
        let mut report = Self::success();
        report.error(error);
        report
    }

    /// Report for an engine that has nowhere to sync to yet.
    pub fn not_configured(reason: impl Into<String>) -> Self {
        let mut report = Self::success().with_outcome(SyncOutcome::NotConfigured);
        report.success = false;
        report.warn(reason);
        report
    }

    pub fn with_outcome(mut self, outcome: SyncOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Add an action to the report
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action(action);
        self
    }

    pub fn action(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Record an error; the report is no longer successful.
    pub fn error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.success = false;
    }

    pub fn is_not_configured(&self) -> bool {
        self.outcome == Some(SyncOutcome::NotConfigured)
    }
}

/// Runs syncer operations as transactions.
///
/// Every operation checks configuration first, then holds the transaction
/// lock and keeps the settings watcher suspended until it returns. Errors
/// come back as failed reports rather than `Err`.
pub struct SyncEngine {
    context: SyncContext,
    syncer: Box<dyn Syncer>,
}

impl SyncEngine {
    /// Create an engine using the syncer the local settings select.
    ///
    /// # Errors
    ///
    /// Returns an error if the local settings cannot be read.
    pub fn new(context: SyncContext) -> Result<Self> {
        let local = context.settings.get_local()?;
        let syncer = create_syncer(local.syncer, &context.paths);
        Ok(Self { context, syncer })
    }

    pub fn with_syncer(context: SyncContext, syncer: Box<dyn Syncer>) -> Self {
        Self { context, syncer }
    }

    pub fn context(&self) -> &SyncContext {
        &self.context
    }

    pub fn syncer(&self) -> &dyn Syncer {
        self.syncer.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.syncer.is_configured(&self.context)
    }

    /// Prepare the export target without moving any settings.
    pub fn init(&self) -> SyncReport {
        self.run("init", |syncer, ctx| {
            syncer.init(ctx)?;
            Ok(SyncReport::success().with_action("Export target is ready"))
        })
    }

    /// Upload or download, whichever the current state calls for.
    pub fn sync(&self) -> SyncReport {
        self.run("sync", |syncer, ctx| syncer.sync(ctx))
    }

    pub fn upload(&self) -> SyncReport {
        self.run("upload", |syncer, ctx| syncer.upload(ctx))
    }

    pub fn download(&self) -> SyncReport {
        self.run("download", |syncer, ctx| syncer.download(ctx))
    }

    /// Make `name` (or a profile the user picks) current, then download it.
    pub fn switch_profile(&self, name: Option<&str>) -> SyncReport {
        let manager = ProfileManager::new(&self.context.settings);
        match manager.switch(name, self.context.surface.as_ref()) {
            Ok(selected) => {
                let mut report = self.download();
                report
                    .actions
                    .insert(0, format!("Switched to profile '{selected}'"));
                report
            }
            Err(Error::Cancelled) => SyncReport::success().with_action("Profile switch cancelled"),
            Err(e) if e.is_not_configured() => SyncReport::not_configured(e.to_string()),
            Err(e) => SyncReport::failure(e.to_string()),
        }
    }

    fn run<F>(&self, operation: &str, f: F) -> SyncReport
    where
        F: FnOnce(&dyn Syncer, &SyncContext) -> Result<SyncReport>,
    {
        if !self.is_configured() {
            tracing::info!(operation, "Sync target is not configured");
            let missing = match self.syncer.kind() {
                SyncerKind::Repo => "a repository URL",
                SyncerKind::File => "an export folder",
            };
            return SyncReport::not_configured(format!("Set {missing} before running {operation}"));
        }

        let _lock = match TransactionLock::acquire(&self.context.paths.local_dir) {
            Ok(lock) => lock,
            Err(e) => {
                tracing::warn!(operation, error = %e, "Transaction refused");
                return SyncReport::failure(e.to_string());
            }
        };

        let watcher = self.context.watcher.as_ref();
        let restart = watcher.is_running()
            || self
                .context
                .settings
                .get_local()
                .is_ok_and(|local| local.watch_settings);
        let _watch = WatchGuard::suspend(watcher, restart);

        tracing::info!(operation, syncer = %self.syncer.kind(), "Starting transaction");
        match f(self.syncer.as_ref(), &self.context) {
            Ok(report) => {
                if report.reload_required && self.context.surface.confirm_reload() {
                    tracing::info!("Reload accepted");
                }
                if let Some(outcome) = report.outcome {
                    self.context
                        .surface
                        .status(&format!("Syncify: {operation} {outcome}"));
                }
                report
            }
            Err(e) if e.is_not_configured() => SyncReport::not_configured(e.to_string()),
            Err(e) => {
                tracing::error!(operation, error = %e, "Transaction failed");
                SyncReport::failure(e.to_string())
            }
        }
    }
}
