//! Source text access for nodes and ranges.

use unlodash_common::Span;
use unlodash_parser::{NodeArena, NodeIndex};

/// Read-only text view over a parsed unit.
#[derive(Clone, Copy)]
pub struct SourceText<'a> {
    arena: &'a NodeArena,
}

impl<'a> SourceText<'a> {
    pub fn new(arena: &'a NodeArena) -> Self {
        Self { arena }
    }

    #[inline]
    pub fn text(&self) -> &'a str {
        self.arena.source_text()
    }

    /// Text of `node`, without surrounding trivia.
    #[inline]
    pub fn of(&self, node: NodeIndex) -> &'a str {
        self.arena.node_text(node)
    }

    #[inline]
    pub fn of_range(&self, span: Span) -> &'a str {
        span.slice(self.text())
    }

    /// Texts of `nodes` joined with `", "`.
    pub fn join(&self, nodes: impl IntoIterator<Item = NodeIndex>) -> String {
        let mut out = String::new();
        for (i, node) in nodes.into_iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(self.of(node));
        }
        out
    }

    /// Offset of the first byte of the line containing `pos`.
    pub fn line_start(&self, pos: u32) -> u32 {
        let bytes = self.text().as_bytes();
        let end = (pos as usize).min(bytes.len());
        memchr::memrchr(b'\n', &bytes[..end]).map_or(0, |nl| nl as u32 + 1)
    }

    /// True when only spaces and tabs precede `pos` on its line.
    pub fn is_first_on_line(&self, pos: u32) -> bool {
        let start = self.line_start(pos);
        self.of_range(Span::new(start, pos))
            .bytes()
            .all(|b| b == b' ' || b == b'\t')
    }

    /// Leading whitespace of the line `pos` starts on, or `""` when `pos` is
    /// not the first token on its line.
    pub fn indentation_at(&self, pos: u32) -> &'a str {
        if !self.is_first_on_line(pos) {
            return "";
        }
        self.of_range(Span::new(self.line_start(pos), pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn arena(text: &str) -> NodeArena {
        let mut arena = NodeArena::new();
        arena.set_source_text(Arc::from(text));
        arena
    }

    #[test]
    fn indentation_of_first_token_on_line() {
        let arena = arena("function f() {\n    return g();\n}");
        let text = SourceText::new(&arena);
        let pos = text.text().find("return").unwrap() as u32;
        assert!(text.is_first_on_line(pos));
        assert_eq!(text.indentation_at(pos), "    ");
    }

    #[test]
    fn no_indentation_after_other_code() {
        let arena = arena("const a = 1; const b = 2;");
        let text = SourceText::new(&arena);
        let pos = text.text().rfind("const").unwrap() as u32;
        assert!(!text.is_first_on_line(pos));
        assert_eq!(text.indentation_at(pos), "");
        assert_eq!(text.indentation_at(0), "");
    }

    #[test]
    fn tabs_and_crlf_lines() {
        let arena = arena("a();\r\n\t\tb();");
        let text = SourceText::new(&arena);
        let pos = text.text().find('b').unwrap() as u32;
        assert_eq!(text.line_start(pos), 6);
        assert_eq!(text.indentation_at(pos), "\t\t");
    }
}
