//! Directories and collaborators for one command run

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use syncify_core::{
    Headless, NullWatcher, SyncContext, SyncEngine, SyncPaths, UserSurface, Watcher,
};
use syncify_extensions::EditorCliHost;
use syncify_fs::{LocalFileStore, NormalizedPath};

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::interactive::TerminalSurface;

/// Resolved command-line environment.
#[derive(Debug, Clone)]
pub struct AppContext {
    paths: SyncPaths,
    editor_cli: String,
    interactive: bool,
}

fn config_dir(suffix: &[&str], flag: &str) -> Result<PathBuf> {
    let mut dir = dirs::config_dir().ok_or_else(|| {
        CliError::user(format!(
            "Could not determine the configuration directory; pass {flag}"
        ))
    })?;
    dir.extend(suffix);
    Ok(dir)
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let local_dir = match &cli.local_dir {
            Some(dir) => dir.clone(),
            None => config_dir(&["syncify"], "--local-dir")?,
        };
        let user_dir = match &cli.user_dir {
            Some(dir) => dir.clone(),
            None => config_dir(&["Code", "User"], "--user-dir")?,
        };
        tracing::debug!(
            local_dir = %local_dir.display(),
            user_dir = %user_dir.display(),
            "Resolved directories"
        );

        Ok(Self {
            paths: SyncPaths::new(NormalizedPath::new(&user_dir), NormalizedPath::new(&local_dir)),
            editor_cli: cli.editor_cli.clone(),
            interactive: !cli.non_interactive && std::io::stdin().is_terminal(),
        })
    }

    pub fn paths(&self) -> &SyncPaths {
        &self.paths
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn surface(&self) -> Arc<dyn UserSurface> {
        if self.interactive {
            Arc::new(TerminalSurface)
        } else {
            Arc::new(Headless)
        }
    }

    pub fn sync_context(&self) -> SyncContext {
        self.sync_context_with(Arc::new(NullWatcher))
    }

    pub fn sync_context_with(&self, watcher: Arc<dyn Watcher>) -> SyncContext {
        SyncContext::new(
            self.paths.clone(),
            Arc::new(LocalFileStore::new()),
            Arc::new(EditorCliHost::new(self.editor_cli.clone())),
            watcher,
            self.surface(),
        )
    }

    pub fn engine(&self) -> Result<SyncEngine> {
        Ok(SyncEngine::new(self.sync_context())?)
    }
}
