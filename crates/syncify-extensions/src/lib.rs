//! Editor extensions for Syncify.
//!
//! This crate provides the extension manifest recorded per profile, the
//! set differences that turn a manifest into install/uninstall work, and the
//! [`ExtensionHost`] contract with an implementation driving the editor CLI.

pub mod differ;
pub mod error;
pub mod host;
pub mod manifest;

/// File name of the extension manifest inside a profile's exported tree.
pub const MANIFEST_FILENAME: &str = "extensions.json";

pub use differ::{ExtensionDelta, missing, same_extension, unneeded};
pub use error::{Error, Result};
pub use host::{EditorCliHost, ExtensionHost};
pub use manifest::{read_manifest, write_manifest};
