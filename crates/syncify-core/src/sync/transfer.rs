//! Moving files between the editor user directory and an exported tree
//!
//! Export mirrors the user directory into the tree, with `.json` files run
//! through the outgoing pragma transform. Import copies the tree back,
//! routes every file through the conflict resolver first, and never deletes
//! anything in the user directory.

use std::collections::BTreeSet;

use syncify_extensions::{ExtensionDelta, MANIFEST_FILENAME, read_manifest, write_manifest};
use syncify_fs::{IgnoreSet, NormalizedPath};
use syncify_pragma::{Os, PragmaEngine};

use crate::conflict::ConflictResolver;
use crate::context::SyncContext;
use crate::profile::ProfileManager;
use crate::settings::{LocalSettings, Profile, SHARED_SETTINGS_FILE};
use crate::sync::engine::SyncReport;
use crate::{Error, Result};

/// Files at the root of an exported tree that belong to Syncify itself.
pub const RESERVED_FILES: [&str; 2] = [MANIFEST_FILENAME, SHARED_SETTINGS_FILE];

const KEYBINDINGS: &str = "keybindings.json";
const ALL_OS: [Os; 3] = [Os::Windows, Os::Linux, Os::Mac];

/// Exported name of `keybindings.json` for one operating system.
pub fn os_keybindings(os: Os) -> String {
    format!("keybindings-{os}.json")
}

fn is_os_keybindings(name: &str) -> bool {
    ALL_OS.iter().any(|os| name == os_keybindings(*os))
}

fn is_reserved(name: &str) -> bool {
    RESERVED_FILES.contains(&name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Tree paths written (or, in a dry run, that would be written)
    pub changed: Vec<NormalizedPath>,
    /// Tree paths with no counterpart in the user directory
    pub removed: Vec<NormalizedPath>,
    pub warnings: Vec<String>,
}

impl ExportSummary {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// User directory paths that were written
    pub written: Vec<NormalizedPath>,
    /// Tree paths whose conflicts the user resolved
    pub resolved: Vec<NormalizedPath>,
    /// Tree paths still holding conflict markers
    pub unresolved: Vec<NormalizedPath>,
    pub warnings: Vec<String>,
}

/// One direction of file movement for a single transaction.
pub struct Transfer<'a> {
    ctx: &'a SyncContext,
    local: &'a LocalSettings,
    pragma: PragmaEngine,
}

impl<'a> Transfer<'a> {
    pub fn new(ctx: &'a SyncContext, local: &'a LocalSettings) -> Self {
        Self {
            ctx,
            local,
            pragma: ctx.pragma(local),
        }
    }

    fn user_dir(&self) -> &NormalizedPath {
        &self.ctx.paths.user_dir
    }

    fn user_ignore(&self) -> Result<IgnoreSet> {
        Ok(IgnoreSet::new(self.user_dir(), &self.local.ignored_items)?)
    }

    /// Tree name for a user directory file, `None` when it is not exported.
    fn exported_name(&self, relative: &NormalizedPath) -> Option<String> {
        let name = relative.as_str();
        if is_reserved(name) || is_os_keybindings(name) {
            return None;
        }
        if name == KEYBINDINGS
            && self.local.separate_keybindings
            && let Some(os) = Os::current()
        {
            return Some(os_keybindings(os));
        }
        Some(name.to_string())
    }

    /// User directory name for a tree file, `None` when it is not imported.
    fn imported_name(&self, relative: &NormalizedPath) -> Option<String> {
        let name = relative.as_str();
        if is_reserved(name) {
            return None;
        }
        if self.local.separate_keybindings
            && let Some(os) = Os::current()
        {
            if name == os_keybindings(os) {
                return Some(KEYBINDINGS.to_string());
            }
            if name == KEYBINDINGS {
                return None;
            }
        }
        if is_os_keybindings(name) {
            return None;
        }
        Some(name.to_string())
    }

    fn differs(&self, path: &NormalizedPath, content: &[u8]) -> Result<bool> {
        if !self.ctx.files.exists(path) {
            return Ok(true);
        }
        Ok(self.ctx.files.read_binary(path)? != content)
    }

    fn malformed(
        relative: &NormalizedPath,
        issue: syncify_pragma::Error,
        warnings: &mut Vec<String>,
    ) {
        let error = Error::MalformedPragmaOutput {
            path: relative.to_string(),
            source: issue,
        };
        tracing::warn!(error = %error, "Transformed file does not validate");
        warnings.push(error.to_string());
    }

    fn outgoing_content(
        &self,
        relative: &NormalizedPath,
        raw: Vec<u8>,
        warnings: &mut Vec<String>,
    ) -> Vec<u8> {
        if relative.extension() != Some("json") {
            return raw;
        }
        let Ok(text) = std::str::from_utf8(&raw) else {
            return raw;
        };
        let transformed = self.pragma.outgoing(text);
        if let Some(issue) = transformed.issue {
            Self::malformed(relative, issue, warnings);
        }
        transformed.text.into_bytes()
    }

    fn incoming_content(
        &self,
        relative: &NormalizedPath,
        target: &NormalizedPath,
        resolved: Vec<u8>,
        warnings: &mut Vec<String>,
    ) -> Vec<u8> {
        if relative.extension() != Some("json") {
            return resolved;
        }
        let Ok(text) = std::str::from_utf8(&resolved) else {
            return resolved;
        };
        let prior = if self.ctx.files.exists(target) {
            self.ctx.files.read(target).ok()
        } else {
            None
        };
        let transformed = self.pragma.incoming(text, prior.as_deref());
        if let Some(issue) = transformed.issue {
            Self::malformed(relative, issue, warnings);
        }
        transformed.text.into_bytes()
    }

    /// Mirror the user directory into `target`.
    ///
    /// Only files whose content differs are written. Tree files with no
    /// counterpart are removed, except Syncify's own files, `.git/`, the
    /// per-OS keybindings of other machines and anything matching the ignore
    /// list. With `dry_run` nothing is written.
    pub fn export(&self, target: &NormalizedPath, dry_run: bool) -> Result<ExportSummary> {
        let files = self.ctx.files.as_ref();
        let mut summary = ExportSummary::default();
        let mut exported = BTreeSet::new();

        for relative in files.list_files(self.user_dir(), &self.user_ignore()?)? {
            let Some(name) = self.exported_name(&relative) else {
                tracing::debug!(path = %relative, "Not exported");
                continue;
            };
            let raw = files.read_binary(&self.user_dir().join(relative.as_str()))?;
            let content = self.outgoing_content(&relative, raw, &mut summary.warnings);

            let destination = target.join(&name);
            if self.differs(&destination, &content)? {
                if !dry_run {
                    files.write(&destination, &content)?;
                }
                summary.changed.push(NormalizedPath::new(&name));
            }
            exported.insert(name);
        }

        let mut kept = self.local.ignored_items.clone();
        kept.push(".git/".to_string());
        let tree_ignore = IgnoreSet::new(target, &kept)?;
        for relative in files.list_files(target, &tree_ignore)? {
            let name = relative.as_str();
            if exported.contains(name) || is_reserved(name) || is_os_keybindings(name) {
                continue;
            }
            if !dry_run {
                files.remove(&target.join(name))?;
            }
            summary.removed.push(relative);
        }

        tracing::debug!(
            target = %target,
            changed = summary.changed.len(),
            removed = summary.removed.len(),
            dry_run,
            "Exported user directory"
        );
        Ok(summary)
    }

    /// Copy `source` into the user directory.
    ///
    /// Every tree file passes through `resolver`; resolved content is written
    /// back into the tree. A file the user leaves unresolved is recorded and
    /// skipped while the rest carry on.
    pub fn import(
        &self,
        source: &NormalizedPath,
        resolver: &ConflictResolver<'_>,
    ) -> Result<ImportSummary> {
        let files = self.ctx.files.as_ref();
        let mut summary = ImportSummary::default();
        let source_ignore = IgnoreSet::new(source, &[".git/".to_string()])?;
        let user_ignore = self.user_ignore()?;

        for relative in files.list_files(source, &source_ignore)? {
            let tree_path = source.join(relative.as_str());
            let original = files.read_binary(&tree_path)?;
            let resolved = match resolver.resolve(&relative, &original) {
                Ok(content) => content,
                Err(Error::ConflictUnresolved { .. }) => {
                    summary.unresolved.push(relative);
                    continue;
                }
                Err(e) => return Err(e),
            };
            if resolved != original {
                files.write(&tree_path, &resolved)?;
                summary.resolved.push(relative.clone());
            }

            let Some(name) = self.imported_name(&relative) else {
                continue;
            };
            let destination = self.user_dir().join(&name);
            if user_ignore.is_ignored(&destination, false) {
                continue;
            }
            let content =
                self.incoming_content(&relative, &destination, resolved, &mut summary.warnings);
            if self.differs(&destination, &content)? {
                files.write(&destination, &content)?;
                summary.written.push(NormalizedPath::new(&name));
            }
        }

        tracing::debug!(
            source = %source,
            written = summary.written.len(),
            unresolved = summary.unresolved.len(),
            "Imported exported tree"
        );
        Ok(summary)
    }

    /// Record the installed extensions in `profile_dir` and in the current
    /// profile. Returns whether the manifest changed.
    ///
    /// An unavailable extension host is a warning, not an error.
    pub fn record_extensions(
        &self,
        profile_dir: &NormalizedPath,
        dry_run: bool,
        report: &mut SyncReport,
    ) -> Result<bool> {
        if !self.local.sync_extensions {
            return Ok(false);
        }
        let mut installed = match self.ctx.extensions.list_installed() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list installed extensions");
                report.warn(format!("Extensions were not recorded: {e}"));
                return Ok(false);
            }
        };
        installed.sort();
        installed.dedup();

        let path = profile_dir.join(MANIFEST_FILENAME);
        let files = self.ctx.files.as_ref();
        if files.exists(&path) && read_manifest(files, &path)? == installed {
            return Ok(false);
        }
        if !dry_run {
            write_manifest(files, &path, &installed)?;
            ProfileManager::new(&self.ctx.settings).update(&installed)?;
            report.action(format!("Recorded {} installed extension(s)", installed.len()));
        }
        Ok(true)
    }

    /// Bring installed extensions in line with the manifest in
    /// `profile_dir`, falling back to the list stored on `profile`.
    ///
    /// Each failed install or uninstall is reported and the rest continue.
    pub fn apply_extensions(
        &self,
        profile_dir: &NormalizedPath,
        profile: &Profile,
        report: &mut SyncReport,
    ) -> Result<()> {
        if !self.local.sync_extensions {
            return Ok(());
        }
        let files = self.ctx.files.as_ref();
        let path = profile_dir.join(MANIFEST_FILENAME);
        let manifest = if files.exists(&path) {
            read_manifest(files, &path)?
        } else {
            profile.extensions.clone()
        };

        let installed = match self.ctx.extensions.list_installed() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list installed extensions");
                report.warn(format!("Extensions were not updated: {e}"));
                return Ok(());
            }
        };

        let delta = ExtensionDelta::compute(&installed, &manifest);
        for id in &delta.to_install {
            match self.ctx.extensions.install(id) {
                Ok(()) => report.action(format!("Installed extension {id}")),
                Err(e) => report.error(format!("Failed to install extension {id}: {e}")),
            }
        }

        if !self.local.remove_extensions {
            if !delta.to_remove.is_empty() {
                report.warn(format!(
                    "Kept {} extension(s) not in the profile",
                    delta.to_remove.len()
                ));
            }
            return Ok(());
        }
        for id in &delta.to_remove {
            match self.ctx.extensions.uninstall(id) {
                Ok(was_active) => {
                    report.reload_required |= was_active;
                    report.action(format!("Uninstalled extension {id}"));
                }
                Err(e) => report.error(format!("Failed to uninstall extension {id}: {e}")),
            }
        }
        Ok(())
    }
}

/// Fold an import into `report`. Unresolved conflicts become errors.
pub fn record_import(summary: ImportSummary, report: &mut SyncReport) {
    for path in &summary.written {
        report.action(format!("Updated {path}"));
    }
    for path in &summary.resolved {
        report.action(format!("Resolved conflict in {path}"));
    }
    for path in &summary.unresolved {
        report.error(
            Error::ConflictUnresolved {
                path: path.to_native(),
            }
            .to_string(),
        );
    }
    report.warnings.extend(summary.warnings);
}
