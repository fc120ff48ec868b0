//! Filesystem abstraction for Syncify
//!
//! Provides normalized path handling, atomic I/O, the JSON configuration
//! store, and the [`FileStore`] contract consumed by the sync engine.

pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod store;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use store::{FileStore, IgnoreSet, LocalFileStore};
