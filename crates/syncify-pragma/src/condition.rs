//! Evaluating `@sync` conditions against the running machine

use std::collections::HashSet;

use crate::annotation::{Pragma, PragmaKind};

/// Operating systems an `os=` condition can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    Linux,
    Mac,
}

impl Os {
    /// Parse an `os=` value. Returns `None` for unrecognized names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "windows" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "mac" => Some(Self::Mac),
            _ => None,
        }
    }

    /// The operating system this binary runs on, if it is one of the three.
    pub fn current() -> Option<Self> {
        match std::env::consts::OS {
            "windows" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::Mac),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Mac => "mac",
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Show,
    Hide,
    /// Leave the block exactly as it is.
    Keep,
}

/// The machine facts conditions are evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PragmaContext {
    pub os: Option<Os>,
    pub hostname: String,
    pub env_vars: HashSet<String>,
}

impl PragmaContext {
    pub fn new(os: Option<Os>, hostname: impl Into<String>) -> Self {
        Self {
            os,
            hostname: hostname.into(),
            env_vars: HashSet::new(),
        }
    }

    /// Context of the running process: its OS and the names of every
    /// environment variable currently set.
    pub fn current(hostname: impl Into<String>) -> Self {
        let env_vars = std::env::vars_os()
            .filter_map(|(name, _)| name.into_string().ok())
            .collect();
        Self {
            os: Os::current(),
            hostname: hostname.into(),
            env_vars,
        }
    }

    pub fn with_env(mut self, name: impl Into<String>) -> Self {
        self.env_vars.insert(name.into());
        self
    }

    /// Decide what an annotated block should look like on this machine.
    ///
    /// `@sync` blocks are shown when every present condition holds and
    /// hidden otherwise. An `os=` value that names no known OS keeps the
    /// block untouched. `@sync-ignore` blocks are always hidden.
    pub fn evaluate(&self, pragma: &Pragma) -> Verdict {
        if pragma.kind == PragmaKind::SyncIgnore {
            return Verdict::Hide;
        }

        let mut holds = true;

        if let Some(value) = pragma.get("os") {
            let Some(wanted) = Os::parse(value) else {
                return Verdict::Keep;
            };
            holds &= self.os == Some(wanted);
        }

        if let Some(value) = pragma.get("host") {
            holds &= !self.hostname.is_empty()
                && value.to_lowercase() == self.hostname.to_lowercase();
        }

        if let Some(value) = pragma.get("env") {
            holds &= self.env_vars.contains(value);
        }

        if holds { Verdict::Show } else { Verdict::Hide }
    }
}
