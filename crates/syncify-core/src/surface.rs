//! The user-facing side of a sync transaction

use syncify_fs::NormalizedPath;

/// Callbacks into whatever presents the sync to the user.
pub trait UserSurface: Send + Sync {
    /// Ask the user to resolve the conflict in `scratch` (a copy of the
    /// conflicted `path`) and block until they confirm or give up.
    /// Returns `true` once the user marks it resolved.
    fn await_resolution(&self, path: &NormalizedPath, scratch: &NormalizedPath) -> bool;

    /// Ask whether the editor should be reloaded now.
    fn confirm_reload(&self) -> bool;

    /// Pick one of `names`; `None` when the user backs out.
    fn select_profile(&self, names: &[String]) -> Option<String>;

    fn status(&self, message: &str);
}

/// Surface for unattended runs: conflicts stay unresolved, no reloads, no
/// selection. Status messages go to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl UserSurface for Headless {
    fn await_resolution(&self, path: &NormalizedPath, scratch: &NormalizedPath) -> bool {
        tracing::warn!(path = %path, scratch = %scratch, "Conflict needs manual resolution");
        false
    }

    fn confirm_reload(&self) -> bool {
        false
    }

    fn select_profile(&self, _names: &[String]) -> Option<String> {
        None
    }

    fn status(&self, message: &str) {
        tracing::info!("{message}");
    }
}
