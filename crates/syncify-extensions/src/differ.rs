//! Extension set differences
//!
//! Identifiers compare without regard to case, as the editor treats them;
//! results keep the spelling of the list they came from.

use std::collections::BTreeSet;

/// Whether two identifiers name the same extension.
pub fn same_extension(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Extensions listed in `manifest` but not installed.
pub fn missing(installed: &[String], manifest: &[String]) -> BTreeSet<String> {
    let installed: BTreeSet<String> =
        installed.iter().map(|id| id.to_ascii_lowercase()).collect();
    manifest
        .iter()
        .filter(|id| !installed.contains(&id.to_ascii_lowercase()))
        .cloned()
        .collect()
}

/// Installed extensions the manifest does not list.
pub fn unneeded(installed: &[String], manifest: &[String]) -> BTreeSet<String> {
    missing(manifest, installed)
}

/// The install and uninstall work needed to match a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionDelta {
    pub to_install: BTreeSet<String>,
    pub to_remove: BTreeSet<String>,
}

impl ExtensionDelta {
    pub fn compute(installed: &[String], manifest: &[String]) -> Self {
        Self {
            to_install: missing(installed, manifest),
            to_remove: unneeded(installed, manifest),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_install.is_empty() && self.to_remove.is_empty()
    }
}
