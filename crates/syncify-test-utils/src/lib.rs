//! Shared test utilities for the syncify workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: bare remotes, working clones and commit helpers
//! - [`editor`]: [`EditorDir`] builder for a fake editor user directory

pub mod editor;
pub mod git;
