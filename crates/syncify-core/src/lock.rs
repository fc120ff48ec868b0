//! One sync transaction at a time per machine

use std::fs::{File, OpenOptions};

use fs2::FileExt;
use syncify_fs::NormalizedPath;

use crate::{Error, Result};

/// Lock file name inside the local directory.
pub const LOCK_FILE: &str = "sync.lock";

/// Exclusive lock on `<local dir>/sync.lock`, held for the duration of a
/// transaction and released on drop.
#[derive(Debug)]
pub struct TransactionLock {
    file: File,
    path: NormalizedPath,
}

impl TransactionLock {
    /// Take the lock without waiting.
    ///
    /// # Errors
    ///
    /// [`Error::Busy`] when another transaction holds it.
    pub fn acquire(local_dir: &NormalizedPath) -> Result<Self> {
        let native_dir = local_dir.to_native();
        std::fs::create_dir_all(&native_dir)
            .map_err(|e| syncify_fs::Error::io(&native_dir, e))?;

        let path = local_dir.join(LOCK_FILE);
        let native = path.to_native();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&native)
            .map_err(|e| syncify_fs::Error::io(&native, e))?;

        if file.try_lock_exclusive().is_err() {
            return Err(Error::Busy { path: native });
        }

        tracing::debug!(path = %path, "Acquired sync lock");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }
}

impl Drop for TransactionLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path, error = %e, "Failed to release sync lock");
        }
    }
}
