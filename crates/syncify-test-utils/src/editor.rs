//! [`EditorDir`] builder for a fake editor user directory.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary editor user directory (the folder holding `settings.json`,
/// `keybindings.json`, `snippets/`, ...).
///
/// # Example
///
/// ```rust,no_run
/// use syncify_test_utils::editor::EditorDir;
///
/// let editor = EditorDir::new();
/// editor.write("settings.json", "{\"k\": 1}");
/// editor.assert_file_contains("settings.json", "\"k\"");
/// ```
pub struct EditorDir {
    temp_dir: TempDir,
}

impl Default for EditorDir {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` at `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let target = self.path(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(target, content).unwrap();
    }

    /// Read the file at `relative`.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative))
            .unwrap_or_else(|_| panic!("Could not read file: {}", self.path(relative).display()))
    }

    /// Assert that the file at `relative` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let file_content = self.read(relative);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            relative,
            content,
            file_content
        );
    }
}
