//! Extension Host contract and the editor CLI implementation

use std::process::{Command, Output};

use crate::differ::same_extension;
use crate::{Error, Result};

/// Installs, removes and lists editor extensions.
pub trait ExtensionHost: Send + Sync {
    fn list_installed(&self) -> Result<Vec<String>>;

    fn install(&self, id: &str) -> Result<()>;

    /// Uninstall `id`. Returns whether the extension was active, meaning the
    /// editor needs a reload to drop it.
    fn uninstall(&self, id: &str) -> Result<bool>;
}

/// [`ExtensionHost`] driving the editor's command line
/// (`code --list-extensions`, `--install-extension`, `--uninstall-extension`).
#[derive(Debug, Clone)]
pub struct EditorCliHost {
    command: String,
}

impl Default for EditorCliHost {
    fn default() -> Self {
        Self::new("code")
    }
}

impl EditorCliHost {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new(&self.command)
            .args(args)
            .output()
            .map_err(|e| Error::HostUnavailable {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: format!("{} {}", self.command, args.join(" ")),
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

impl ExtensionHost for EditorCliHost {
    fn list_installed(&self) -> Result<Vec<String>> {
        let output = self.run(&["--list-extensions"])?;
        Ok(parse_extension_list(&String::from_utf8_lossy(&output.stdout)))
    }

    fn install(&self, id: &str) -> Result<()> {
        self.run(&["--install-extension", id])?;
        tracing::info!(extension = %id, "Installed extension");
        Ok(())
    }

    fn uninstall(&self, id: &str) -> Result<bool> {
        let installed = self.list_installed()?;
        if !installed.iter().any(|known| same_extension(known, id)) {
            tracing::debug!(extension = %id, "Extension not installed, nothing to remove");
            return Ok(false);
        }
        self.run(&["--uninstall-extension", id])?;
        tracing::info!(extension = %id, "Uninstalled extension");
        // Listed extensions are loaded by a running editor
        Ok(true)
    }
}

/// One identifier per line; blank lines and `@version` suffixes dropped.
fn parse_extension_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split_once('@').map_or(line, |(id, _)| id).to_string())
        .collect()
}
