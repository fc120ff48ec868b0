//! Pragma annotation lines

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Matches `// @sync ...` and `// @sync-ignore ...`, capturing the name and
/// the argument list.
static ANNOTATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*//\s*@(sync-ignore|sync)(?:\s+(.*?))?\s*$").unwrap());

/// Argument keys a `@sync` annotation understands. Anything else is ignored.
pub const KNOWN_KEYS: [&str; 3] = ["host", "os", "env"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PragmaKind {
    /// Visible only where every condition holds.
    Sync,
    /// Never exported; kept per machine.
    SyncIgnore,
}

impl PragmaKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::SyncIgnore => "sync-ignore",
        }
    }
}

/// A parsed annotation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pragma {
    pub kind: PragmaKind,
    pub args: BTreeMap<String, String>,
}

impl Pragma {
    /// Parse `line` as an annotation. Returns `None` for any other line.
    ///
    /// Arguments are `key=value` pairs separated by whitespace. Keys are
    /// case-insensitive; unknown keys and tokens without `=` are dropped.
    pub fn parse(line: &str) -> Option<Self> {
        let captures = ANNOTATION_PATTERN.captures(line)?;
        let kind = match captures.get(1)?.as_str() {
            "sync-ignore" => PragmaKind::SyncIgnore,
            _ => PragmaKind::Sync,
        };

        let mut args = BTreeMap::new();
        if let Some(raw) = captures.get(2) {
            for token in raw.as_str().split_whitespace() {
                let Some((key, value)) = token.split_once('=') else {
                    continue;
                };
                let key = key.to_ascii_lowercase();
                if KNOWN_KEYS.contains(&key.as_str()) && !value.is_empty() {
                    args.insert(key, value.to_string());
                }
            }
        }

        Some(Self { kind, args })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    /// True if `line` is an annotation line.
    pub fn is_annotation(line: &str) -> bool {
        ANNOTATION_PATTERN.is_match(line)
    }
}
