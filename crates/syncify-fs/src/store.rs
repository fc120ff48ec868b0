//! File Store contract and the local-disk implementation.

use std::fs;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::WalkDir;

use crate::{Error, NormalizedPath, Result, io};

/// Compiled set of ignore globs, matched against paths relative to a root.
///
/// Patterns use gitignore syntax (`workspaceStorage/**`, `*.log`, `**/.git/**`).
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    matcher: Gitignore,
}

impl IgnoreSet {
    /// Compile `patterns` relative to `root`.
    pub fn new(root: &NormalizedPath, patterns: &[String]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root.to_native());
        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .map_err(|e| Error::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
        }
        let matcher = builder.build().map_err(|e| Error::InvalidPattern {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })?;
        Ok(Self { matcher })
    }

    /// An empty set that ignores nothing.
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
        }
    }

    /// Whether the path (absolute, below the root) is ignored.
    pub fn is_ignored(&self, path: &NormalizedPath, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(path.to_native(), is_dir)
            .is_ignore()
    }
}

/// File operations consumed by the sync engine.
///
/// Paths are absolute. `list_files` returns files only, relative to `root`,
/// sorted, with ignored entries (and everything below ignored directories)
/// excluded.
pub trait FileStore: Send + Sync {
    fn exists(&self, path: &NormalizedPath) -> bool;
    fn mkdir(&self, path: &NormalizedPath) -> Result<()>;
    fn read(&self, path: &NormalizedPath) -> Result<String>;
    fn read_binary(&self, path: &NormalizedPath) -> Result<Vec<u8>>;
    fn write(&self, path: &NormalizedPath, content: &[u8]) -> Result<()>;
    fn copy(&self, from: &NormalizedPath, to: &NormalizedPath) -> Result<()>;
    fn remove(&self, path: &NormalizedPath) -> Result<()>;
    fn list_files(&self, root: &NormalizedPath, ignore: &IgnoreSet) -> Result<Vec<NormalizedPath>>;
}

/// [`FileStore`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

impl FileStore for LocalFileStore {
    fn exists(&self, path: &NormalizedPath) -> bool {
        path.exists()
    }

    fn mkdir(&self, path: &NormalizedPath) -> Result<()> {
        let native = path.to_native();
        fs::create_dir_all(&native).map_err(|e| Error::io(native, e))
    }

    fn read(&self, path: &NormalizedPath) -> Result<String> {
        io::read_text(path)
    }

    fn read_binary(&self, path: &NormalizedPath) -> Result<Vec<u8>> {
        io::read_bytes(path)
    }

    fn write(&self, path: &NormalizedPath, content: &[u8]) -> Result<()> {
        io::write_atomic(path, content)
    }

    fn copy(&self, from: &NormalizedPath, to: &NormalizedPath) -> Result<()> {
        let content = io::read_bytes(from)?;
        io::write_atomic(to, &content)
    }

    fn remove(&self, path: &NormalizedPath) -> Result<()> {
        let native = path.to_native();
        let result = if native.is_dir() {
            fs::remove_dir_all(&native)
        } else {
            fs::remove_file(&native)
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(native, e)),
        }
    }

    fn list_files(&self, root: &NormalizedPath, ignore: &IgnoreSet) -> Result<Vec<NormalizedPath>> {
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root.to_native())
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                let path = NormalizedPath::new(entry.path());
                !ignore.is_ignored(&path, entry.file_type().is_dir())
            });

        for entry in walker {
            let entry = entry.map_err(|e| Error::Walk {
                root: root.to_native(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(relative) = NormalizedPath::new(entry.path()).relative_to(root) {
                files.push(relative);
            }
        }

        files.sort();
        Ok(files)
    }
}
