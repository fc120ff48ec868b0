//! Merge conflicts in imported files

use syncify_fs::{FileStore, NormalizedPath};

use crate::surface::UserSurface;
use crate::{Error, Result};

const MARKERS: [&str; 3] = ["<<<<<<<", "=======", ">>>>>>>"];

/// Whether `content` holds a full set of conflict markers, each at the
/// start of a line.
pub fn has_conflict_markers(content: &[u8]) -> bool {
    let text = String::from_utf8_lossy(content);
    MARKERS
        .iter()
        .all(|marker| text.lines().any(|line| line.starts_with(marker)))
}

/// Holds a conflicted file back until the user has fixed it.
///
/// The conflicted content is written to a scratch copy under
/// `scratch_root`, the user edits that copy, and the edited content becomes
/// the file's final content.
pub struct ConflictResolver<'a> {
    files: &'a dyn FileStore,
    surface: &'a dyn UserSurface,
    scratch_root: NormalizedPath,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(
        files: &'a dyn FileStore,
        surface: &'a dyn UserSurface,
        scratch_root: NormalizedPath,
    ) -> Self {
        Self {
            files,
            surface,
            scratch_root,
        }
    }

    pub fn scratch_path(&self, relative: &NormalizedPath) -> NormalizedPath {
        self.scratch_root.join(relative.as_str())
    }

    /// Return the final content for `relative`.
    ///
    /// Content without conflict markers passes through. Otherwise this
    /// blocks on the user surface until the scratch copy is free of markers;
    /// the scratch copy is then removed.
    ///
    /// # Errors
    ///
    /// [`Error::ConflictUnresolved`] when the user gives up. The scratch copy
    /// is left in place.
    pub fn resolve(&self, relative: &NormalizedPath, incoming: &[u8]) -> Result<Vec<u8>> {
        if !has_conflict_markers(incoming) {
            return Ok(incoming.to_vec());
        }

        let scratch = self.scratch_path(relative);
        self.files.write(&scratch, incoming)?;
        tracing::warn!(path = %relative, scratch = %scratch, "Merge conflict in imported file");
        self.surface
            .status(&format!("Merge conflict in {relative}; edit {scratch} to resolve it"));

        loop {
            if !self.surface.await_resolution(relative, &scratch) {
                return Err(Error::ConflictUnresolved {
                    path: relative.to_native(),
                });
            }
            let edited = self.files.read_binary(&scratch)?;
            if has_conflict_markers(&edited) {
                self.surface
                    .status(&format!("{scratch} still contains conflict markers"));
                continue;
            }
            self.files.remove(&scratch)?;
            tracing::info!(path = %relative, "Conflict resolved");
            return Ok(edited);
        }
    }
}
