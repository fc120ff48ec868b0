//! Block scanner
//!
//! Walks a document line by line with two states. Outside a block, lines are
//! left alone until an annotation line opens one. The first line after the
//! annotation decides the block's extent: if it leaves braces or brackets
//! open, the block runs until they are closed again; otherwise the block is
//! that single line. Every body line carries the action chosen for its
//! block by the caller's policy.
//!
//! Extents are computed on the uncommented form of each line, so a block
//! spans the same lines whether it is currently shown or hidden.

use std::str::Split;

use crate::annotation::{Pragma, PragmaKind};

/// What to do with a scanned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    Keep,
    Comment,
    Uncomment,
    Drop,
}

/// Where a scanned line sits relative to annotated blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Outside,
    Annotation(PragmaKind),
    Body(PragmaKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedLine<'a> {
    pub text: &'a str,
    pub role: LineRole,
    pub action: LineAction,
}

#[derive(Debug, Clone, Copy)]
struct Block {
    kind: PragmaKind,
    action: LineAction,
    /// Open nesting depth; `None` until the first body line is seen.
    depth: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Outside,
    Inside(Block),
}

/// Lazy iterator of `(line, action)` pairs over one document.
///
/// `policy` picks the action for each annotated block. Annotation lines
/// themselves are only ever kept or dropped.
pub struct Scanner<'a, F> {
    lines: Split<'a, char>,
    state: State,
    policy: F,
}

impl<'a, F> Scanner<'a, F>
where
    F: FnMut(&Pragma) -> LineAction,
{
    pub fn new(content: &'a str, policy: F) -> Self {
        Self {
            lines: content.split('\n'),
            state: State::Outside,
            policy,
        }
    }

    fn outside(&mut self, text: &'a str) -> ScannedLine<'a> {
        let Some(pragma) = Pragma::parse(text) else {
            self.state = State::Outside;
            return ScannedLine {
                text,
                role: LineRole::Outside,
                action: LineAction::Keep,
            };
        };

        let action = (self.policy)(&pragma);
        self.state = State::Inside(Block {
            kind: pragma.kind,
            action,
            depth: None,
        });
        ScannedLine {
            text,
            role: LineRole::Annotation(pragma.kind),
            action: if action == LineAction::Drop {
                LineAction::Drop
            } else {
                LineAction::Keep
            },
        }
    }

    fn inside(&mut self, text: &'a str, mut block: Block) -> ScannedLine<'a> {
        let depth = match block.depth {
            Some(depth) => depth + nesting_delta(uncommented(text)),
            None => {
                // An annotation or blank line right after an annotation
                // leaves the block empty.
                if text.trim().is_empty() || Pragma::is_annotation(text) {
                    return self.outside(text);
                }
                nesting_delta(uncommented(text))
            }
        };

        if depth > 0 {
            block.depth = Some(depth);
            self.state = State::Inside(block);
        } else {
            self.state = State::Outside;
        }

        ScannedLine {
            text,
            role: LineRole::Body(block.kind),
            action: block.action,
        }
    }
}

impl<'a, F> Iterator for Scanner<'a, F>
where
    F: FnMut(&Pragma) -> LineAction,
{
    type Item = ScannedLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.lines.next()?;
        let line = match self.state {
            State::Outside => self.outside(text),
            State::Inside(block) => self.inside(text, block),
        };
        Some(line)
    }
}

/// The line with a leading `//` (and one following space) removed.
pub fn uncommented(line: &str) -> &str {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix("//") {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => trimmed,
    }
}

/// Net change in brace/bracket nesting on one line, ignoring string
/// contents and anything after a `//` comment.
pub fn nesting_delta(line: &str) -> i64 {
    let mut delta = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '/' if chars.peek() == Some(&'/') => break,
            '{' | '[' => delta += 1,
            '}' | ']' => delta -= 1,
            _ => {}
        }
    }

    delta
}

/// Hide `line` behind `// `, keeping its indentation. Blank and already
/// commented lines are returned unchanged.
pub fn comment_line(line: &str) -> String {
    let trimmed = line.trim_start();
    if trimmed.trim().is_empty() || trimmed.starts_with("//") {
        return line.to_string();
    }
    let indent = &line[..line.len() - trimmed.len()];
    format!("{indent}// {trimmed}")
}

/// Remove a leading `//` (and one following space), keeping indentation.
/// Lines that are not commented are returned unchanged.
pub fn uncomment_line(line: &str) -> String {
    let trimmed = line.trim_start();
    let Some(rest) = trimmed.strip_prefix("//") else {
        return line.to_string();
    };
    let indent = &line[..line.len() - trimmed.len()];
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    format!("{indent}{rest}")
}
