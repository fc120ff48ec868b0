//! Outgoing and incoming transforms

use crate::Error;
use crate::annotation::{Pragma, PragmaKind};
use crate::condition::{PragmaContext, Verdict};
use crate::jsonc;
use crate::scanner::{LineAction, LineRole, ScannedLine, Scanner, comment_line, uncomment_line};

/// A transformed document.
///
/// `issue` is set when the text no longer validates as JSON-with-comments.
/// The text is still the best-effort result and callers decide whether to
/// write it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub text: String,
    pub issue: Option<Error>,
}

impl Transformed {
    fn validated(text: String) -> Self {
        let issue = jsonc::validate(&text).err();
        Self { text, issue }
    }

    pub fn is_valid(&self) -> bool {
        self.issue.is_none()
    }
}

/// Prepare `content` for export: every `@sync` and `@sync-ignore` block is
/// commented out. Nothing is deleted, so the export can be reversed.
pub fn outgoing(content: &str) -> Transformed {
    let lines = render(Scanner::new(content, |_| LineAction::Comment));
    Transformed::validated(lines.join("\n"))
}

/// Apply an exported document on this machine.
///
/// `@sync` blocks are shown or hidden according to `context`. When `prior`
/// (the machine's current copy of the file) is given, the exported
/// `@sync-ignore` blocks are dropped and the local ones from `prior` are
/// inserted right after the document's opening `{`. Without `prior` the
/// exported `@sync-ignore` blocks stay commented.
pub fn incoming(content: &str, prior: Option<&str>, context: &PragmaContext) -> Transformed {
    let policy = |pragma: &Pragma| match pragma.kind {
        PragmaKind::Sync => match context.evaluate(pragma) {
            Verdict::Show => LineAction::Uncomment,
            Verdict::Hide => LineAction::Comment,
            Verdict::Keep => LineAction::Keep,
        },
        PragmaKind::SyncIgnore if prior.is_some() => LineAction::Drop,
        PragmaKind::SyncIgnore => LineAction::Comment,
    };
    let mut lines = render(Scanner::new(content, policy));

    if let Some(prior) = prior {
        let preserved = ignored_blocks(prior);
        if !preserved.is_empty() {
            let at = lines
                .iter()
                .position(|line| line.trim_start().starts_with('{'))
                .map_or(0, |index| index + 1);
            lines.splice(at..at, preserved);
        }
    }

    Transformed::validated(lines.join("\n"))
}

/// Every `@sync-ignore` annotation in `content` together with its block,
/// verbatim.
pub fn ignored_blocks(content: &str) -> Vec<String> {
    Scanner::new(content, |_| LineAction::Keep)
        .filter(|line| {
            matches!(
                line.role,
                LineRole::Annotation(PragmaKind::SyncIgnore) | LineRole::Body(PragmaKind::SyncIgnore)
            )
        })
        .map(|line| line.text.to_string())
        .collect()
}

fn render<'a>(lines: impl Iterator<Item = ScannedLine<'a>>) -> Vec<String> {
    lines
        .filter_map(|line| match line.action {
            // Blank lines are never touched
            _ if line.text.trim().is_empty() => Some(line.text.to_string()),
            LineAction::Keep => Some(line.text.to_string()),
            LineAction::Comment => Some(comment_line(line.text)),
            LineAction::Uncomment => Some(uncomment_line(line.text)),
            LineAction::Drop => None,
        })
        .collect()
}

/// Pragma transforms bound to one machine's context.
#[derive(Debug, Clone)]
pub struct PragmaEngine {
    context: PragmaContext,
}

impl PragmaEngine {
    pub fn new(context: PragmaContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &PragmaContext {
        &self.context
    }

    pub fn outgoing(&self, content: &str) -> Transformed {
        outgoing(content)
    }

    pub fn incoming(&self, content: &str, prior: Option<&str>) -> Transformed {
        incoming(content, prior, &self.context)
    }
}
