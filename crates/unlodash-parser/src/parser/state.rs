//! Parser state: token handling, context flags and diagnostics.
//!
//! `ParserState` is a recursive-descent parser over `ScannerState` that
//! builds a `NodeArena`. Statement parsing lives in `state_statements.rs`,
//! expression parsing in `state_expressions.rs`.

use super::node::NodeArena;
use std::sync::Arc;
use tracing::{debug, trace};
use unlodash_common::diagnostics::diagnostic_codes;
use unlodash_common::limits::MAX_PARSER_RECURSION_DEPTH;
use unlodash_scanner::{ScannerState, SyntaxKind};

// =============================================================================
// Context Flags
// =============================================================================

/// `in` is not a binary operator (head of a `for` statement).
pub const CONTEXT_FLAG_DISALLOW_IN: u32 = 1 << 0;
/// Inside an async function body: `await` is an operator.
pub const CONTEXT_FLAG_ASYNC: u32 = 1 << 1;
/// Inside a generator body: `yield` is an operator.
pub const CONTEXT_FLAG_GENERATOR: u32 = 1 << 2;
/// Inside any function body.
pub const CONTEXT_FLAG_IN_FUNCTION: u32 = 1 << 3;

/// A syntax error found while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub start: u32,
    pub length: u32,
    pub message: String,
    pub code: u32,
}

/// Recursive-descent parser producing a `NodeArena`.
pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub(crate) arena: NodeArena,
    pub(crate) file_name: String,
    pub(crate) parse_diagnostics: Vec<ParseDiagnostic>,
    pub(crate) current_token: SyntaxKind,
    pub(crate) context_flags: u32,
    /// End of the most recently consumed token
    pub(crate) prev_token_end: u32,
    pub(crate) recursion_depth: u32,
    depth_error_reported: bool,
}

impl ParserState {
    pub fn new(file_name: impl Into<String>, source_text: impl Into<Arc<str>>) -> ParserState {
        let source_text: Arc<str> = source_text.into();
        let mut arena = NodeArena::with_capacity(source_text.len() / 4);
        arena.set_source_text(Arc::clone(&source_text));
        ParserState {
            scanner: ScannerState::new(source_text),
            arena,
            file_name: file_name.into(),
            parse_diagnostics: Vec::new(),
            current_token: SyntaxKind::Unknown,
            context_flags: 0,
            prev_token_end: 0,
            recursion_depth: 0,
            depth_error_reported: false,
        }
    }

    // =========================================================================
    // Results
    // =========================================================================

    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn into_arena(self) -> NodeArena {
        self.arena
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Parser diagnostics followed by scanner diagnostics.
    pub fn get_diagnostics(&self) -> Vec<ParseDiagnostic> {
        let mut out = self.parse_diagnostics.clone();
        out.extend(
            self.scanner
                .get_scanner_diagnostics()
                .iter()
                .map(|d| ParseDiagnostic {
                    start: d.pos as u32,
                    length: d.length as u32,
                    message: d.message.to_string(),
                    code: d.code,
                }),
        );
        out.sort_by_key(|d| d.start);
        out
    }

    pub fn has_errors(&self) -> bool {
        !self.parse_diagnostics.is_empty() || !self.scanner.get_scanner_diagnostics().is_empty()
    }

    // =========================================================================
    // Token Access
    // =========================================================================

    #[inline]
    pub(crate) fn token(&self) -> SyntaxKind {
        self.current_token
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current_token == kind
    }

    /// True if the current token is the identifier `text` (contextual keyword).
    #[inline]
    pub(crate) fn is_contextual(&self, text: &str) -> bool {
        self.current_token == SyntaxKind::Identifier && self.scanner.get_token_text() == text
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.get_token_pos() as u32
    }

    #[inline]
    pub(crate) fn token_end(&self) -> u32 {
        self.scanner.get_token_end() as u32
    }

    #[inline]
    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.prev_token_end = self.token_end();
        self.current_token = self.scanner.scan();
        self.current_token
    }

    /// Consume `kind` if present.
    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or report `'x' expected.`
    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        let message = format!("'{}' expected.", kind.text());
        self.parse_error_at_current_token(&message, diagnostic_codes::TOKEN_EXPECTED);
        false
    }

    /// Consume a statement terminator, applying automatic semicolon insertion.
    pub(crate) fn parse_semicolon(&mut self) -> bool {
        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return true;
        }
        if self.can_insert_semicolon() {
            return true;
        }
        self.parse_error_at_current_token("';' expected.", diagnostic_codes::TOKEN_EXPECTED);
        false
    }

    #[inline]
    pub(crate) fn can_insert_semicolon(&self) -> bool {
        matches!(
            self.current_token,
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) || self.has_preceding_line_break()
    }

    // =========================================================================
    // Lookahead
    // =========================================================================

    /// Run `f` and restore the scanner position afterwards.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.scanner.save_state();
        let current = self.current_token;
        let prev_end = self.prev_token_end;
        let result = f(self);
        self.scanner.restore_state(snapshot);
        self.current_token = current;
        self.prev_token_end = prev_end;
        result
    }

    /// Kind of the token after the current one, and whether a line break
    /// precedes it.
    pub(crate) fn peek_token(&mut self) -> (SyntaxKind, bool) {
        self.look_ahead(|p| {
            let kind = p.next_token();
            (kind, p.has_preceding_line_break())
        })
    }

    // =========================================================================
    // Context
    // =========================================================================

    #[inline]
    pub(crate) fn in_context(&self, flag: u32) -> bool {
        self.context_flags & flag != 0
    }

    /// Run `f` with `set` flags added and `clear` flags removed.
    pub(crate) fn with_context<T>(
        &mut self,
        set: u32,
        clear: u32,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = self.context_flags;
        self.context_flags = (saved | set) & !clear;
        let result = f(self);
        self.context_flags = saved;
        result
    }

    /// Enter one nesting level. Returns false (after reporting once) when
    /// the nesting limit is reached; callers must then not descend.
    pub(crate) fn enter_recursion(&mut self) -> bool {
        if self.recursion_depth >= MAX_PARSER_RECURSION_DEPTH {
            if !self.depth_error_reported {
                self.depth_error_reported = true;
                debug!(
                    file = %self.file_name,
                    pos = self.token_pos(),
                    "parser nesting limit reached"
                );
                self.parse_error_at_current_token(
                    "Maximum nesting depth exceeded.",
                    diagnostic_codes::MAXIMUM_NESTING_DEPTH_EXCEEDED,
                );
            }
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    #[inline]
    pub(crate) fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn parse_error_at(&mut self, start: u32, length: u32, message: &str, code: u32) {
        // One diagnostic per position keeps recovery from cascading.
        if self.parse_diagnostics.last().is_some_and(|d| d.start == start) {
            return;
        }
        trace!(start, code, message, "parse error");
        self.parse_diagnostics.push(ParseDiagnostic {
            start,
            length,
            message: message.to_string(),
            code,
        });
    }

    pub(crate) fn parse_error_at_current_token(&mut self, message: &str, code: u32) {
        let start = self.token_pos();
        let length = self.token_end().saturating_sub(start);
        self.parse_error_at(start, length, message, code);
    }

    pub(crate) fn error_expression_expected(&mut self) {
        self.parse_error_at_current_token(
            "Expression expected.",
            diagnostic_codes::EXPRESSION_EXPECTED,
        );
    }

    pub(crate) fn error_identifier_expected(&mut self) {
        self.parse_error_at_current_token(
            "Identifier expected.",
            diagnostic_codes::IDENTIFIER_EXPECTED,
        );
    }
}
