//! Scanner implementation.
//!
//! `ScannerState` turns source text into tokens on demand. The parser drives
//! it one token at a time and asks for a rescan where JavaScript's grammar is
//! context dependent: `/` may start a regular expression, and `}` may resume
//! a template literal.

use crate::syntax_kind::{SyntaxKind, keyword_kind};
use std::sync::Arc;
use unlodash_common::diagnostics::diagnostic_codes;

/// A problem found while scanning (unterminated literal, stray character).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerDiagnostic {
    pub pos: usize,
    pub length: usize,
    pub message: &'static str,
    pub code: u32,
}

/// Saved scanner position for speculative parsing.
#[derive(Clone, Copy, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    full_start: usize,
    token_start: usize,
    token: SyntaxKind,
    preceding_line_break: bool,
    diagnostics_len: usize,
}

pub struct ScannerState {
    source: Arc<str>,
    /// Current byte offset (end of the current token once scanned)
    pos: usize,
    /// Start of the current token including leading trivia
    full_start: usize,
    /// Start of the current token excluding trivia
    token_start: usize,
    token: SyntaxKind,
    preceding_line_break: bool,
    diagnostics: Vec<ScannerDiagnostic>,
}

impl ScannerState {
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        ScannerState {
            source: source.into(),
            pos: 0,
            full_start: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            preceding_line_break: false,
            diagnostics: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn source_text(&self) -> &str {
        &self.source
    }

    pub fn source_text_arc(&self) -> Arc<str> {
        Arc::clone(&self.source)
    }

    #[inline]
    pub fn get_token(&self) -> SyntaxKind {
        self.token
    }

    /// Start of the current token, excluding leading trivia.
    #[inline]
    pub fn get_token_pos(&self) -> usize {
        self.token_start
    }

    /// Start of the current token, including leading trivia.
    #[inline]
    pub fn get_token_full_start(&self) -> usize {
        self.full_start
    }

    #[inline]
    pub fn get_token_end(&self) -> usize {
        self.pos
    }

    /// Raw source text of the current token.
    pub fn get_token_text(&self) -> &str {
        self.source.get(self.token_start..self.pos).unwrap_or("")
    }

    /// True when a line terminator appeared between the previous token and
    /// the current one (used for automatic semicolon insertion).
    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.preceding_line_break
    }

    pub fn get_scanner_diagnostics(&self) -> &[ScannerDiagnostic] {
        &self.diagnostics
    }

    pub fn save_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            full_start: self.full_start,
            token_start: self.token_start,
            token: self.token,
            preceding_line_break: self.preceding_line_break,
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub fn restore_state(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.full_start = snapshot.full_start;
        self.token_start = snapshot.token_start;
        self.token = snapshot.token;
        self.preceding_line_break = snapshot.preceding_line_break;
        self.diagnostics.truncate(snapshot.diagnostics_len);
    }

    // =========================================================================
    // Character helpers
    // =========================================================================

    #[inline]
    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.source.as_bytes().get(pos).copied()
    }

    #[inline]
    fn char_at(&self, pos: usize) -> Option<char> {
        self.source.get(pos..).and_then(|rest| rest.chars().next())
    }

    #[inline]
    fn advance_char(&mut self) {
        if let Some(ch) = self.char_at(self.pos) {
            self.pos += ch.len_utf8();
        } else {
            self.pos = self.source.len();
        }
    }

    fn error(&mut self, pos: usize, length: usize, message: &'static str, code: u32) {
        self.diagnostics.push(ScannerDiagnostic {
            pos,
            length,
            message,
            code,
        });
    }

    // =========================================================================
    // Trivia
    // =========================================================================

    /// Skip a `#!` line at the very start of the file.
    pub fn scan_shebang_trivia(&mut self) {
        if self.pos == 0 && self.source.starts_with("#!") {
            while let Some(ch) = self.char_at(self.pos) {
                if is_line_terminator(ch) {
                    break;
                }
                self.pos += ch.len_utf8();
            }
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.char_at(self.pos) {
            if is_line_terminator(ch) {
                self.preceding_line_break = true;
                self.pos += ch.len_utf8();
            } else if is_whitespace(ch) {
                self.pos += ch.len_utf8();
            } else if ch == '/' && self.byte_at(self.pos + 1) == Some(b'/') {
                self.pos += 2;
                while let Some(c) = self.char_at(self.pos) {
                    if is_line_terminator(c) {
                        break;
                    }
                    self.pos += c.len_utf8();
                }
            } else if ch == '/' && self.byte_at(self.pos + 1) == Some(b'*') {
                let start = self.pos;
                self.pos += 2;
                let mut closed = false;
                while let Some(c) = self.char_at(self.pos) {
                    if c == '*' && self.byte_at(self.pos + 1) == Some(b'/') {
                        self.pos += 2;
                        closed = true;
                        break;
                    }
                    if is_line_terminator(c) {
                        self.preceding_line_break = true;
                    }
                    self.pos += c.len_utf8();
                }
                if !closed {
                    self.error(
                        start,
                        self.pos - start,
                        "'*/' expected.",
                        diagnostic_codes::UNTERMINATED_COMMENT,
                    );
                }
            } else {
                break;
            }
        }
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.full_start = self.pos;
        self.preceding_line_break = false;
        self.skip_trivia();
        self.token_start = self.pos;

        let Some(ch) = self.char_at(self.pos) else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match ch {
            '{' => self.punct(1, SyntaxKind::OpenBraceToken),
            '}' => self.punct(1, SyntaxKind::CloseBraceToken),
            '(' => self.punct(1, SyntaxKind::OpenParenToken),
            ')' => self.punct(1, SyntaxKind::CloseParenToken),
            '[' => self.punct(1, SyntaxKind::OpenBracketToken),
            ']' => self.punct(1, SyntaxKind::CloseBracketToken),
            ';' => self.punct(1, SyntaxKind::SemicolonToken),
            ',' => self.punct(1, SyntaxKind::CommaToken),
            ':' => self.punct(1, SyntaxKind::ColonToken),
            '~' => self.punct(1, SyntaxKind::TildeToken),
            '@' => self.punct(1, SyntaxKind::AtToken),
            '.' => {
                if self.byte_at(self.pos + 1).is_some_and(|b| b.is_ascii_digit()) {
                    self.scan_number()
                } else if self.starts_with_at(self.pos, "...") {
                    self.punct(3, SyntaxKind::DotDotDotToken)
                } else {
                    self.punct(1, SyntaxKind::DotToken)
                }
            }
            '?' => {
                if self.starts_with_at(self.pos, "??=") {
                    self.punct(3, SyntaxKind::QuestionQuestionEqualsToken)
                } else if self.starts_with_at(self.pos, "??") {
                    self.punct(2, SyntaxKind::QuestionQuestionToken)
                } else if self.byte_at(self.pos + 1) == Some(b'.')
                    && !self.byte_at(self.pos + 2).is_some_and(|b| b.is_ascii_digit())
                {
                    self.punct(2, SyntaxKind::QuestionDotToken)
                } else {
                    self.punct(1, SyntaxKind::QuestionToken)
                }
            }
            '=' => self.longest(&[
                ("===", SyntaxKind::EqualsEqualsEqualsToken),
                ("==", SyntaxKind::EqualsEqualsToken),
                ("=>", SyntaxKind::EqualsGreaterThanToken),
                ("=", SyntaxKind::EqualsToken),
            ]),
            '!' => self.longest(&[
                ("!==", SyntaxKind::ExclamationEqualsEqualsToken),
                ("!=", SyntaxKind::ExclamationEqualsToken),
                ("!", SyntaxKind::ExclamationToken),
            ]),
            '+' => self.longest(&[
                ("++", SyntaxKind::PlusPlusToken),
                ("+=", SyntaxKind::PlusEqualsToken),
                ("+", SyntaxKind::PlusToken),
            ]),
            '-' => self.longest(&[
                ("--", SyntaxKind::MinusMinusToken),
                ("-=", SyntaxKind::MinusEqualsToken),
                ("-", SyntaxKind::MinusToken),
            ]),
            '*' => self.longest(&[
                ("**=", SyntaxKind::AsteriskAsteriskEqualsToken),
                ("**", SyntaxKind::AsteriskAsteriskToken),
                ("*=", SyntaxKind::AsteriskEqualsToken),
                ("*", SyntaxKind::AsteriskToken),
            ]),
            '/' => self.longest(&[
                ("/=", SyntaxKind::SlashEqualsToken),
                ("/", SyntaxKind::SlashToken),
            ]),
            '%' => self.longest(&[
                ("%=", SyntaxKind::PercentEqualsToken),
                ("%", SyntaxKind::PercentToken),
            ]),
            '<' => self.longest(&[
                ("<<=", SyntaxKind::LessThanLessThanEqualsToken),
                ("<<", SyntaxKind::LessThanLessThanToken),
                ("<=", SyntaxKind::LessThanEqualsToken),
                ("<", SyntaxKind::LessThanToken),
            ]),
            '>' => self.longest(&[
                (">>>=", SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken),
                (">>>", SyntaxKind::GreaterThanGreaterThanGreaterThanToken),
                (">>=", SyntaxKind::GreaterThanGreaterThanEqualsToken),
                (">>", SyntaxKind::GreaterThanGreaterThanToken),
                (">=", SyntaxKind::GreaterThanEqualsToken),
                (">", SyntaxKind::GreaterThanToken),
            ]),
            '&' => self.longest(&[
                ("&&=", SyntaxKind::AmpersandAmpersandEqualsToken),
                ("&&", SyntaxKind::AmpersandAmpersandToken),
                ("&=", SyntaxKind::AmpersandEqualsToken),
                ("&", SyntaxKind::AmpersandToken),
            ]),
            '|' => self.longest(&[
                ("||=", SyntaxKind::BarBarEqualsToken),
                ("||", SyntaxKind::BarBarToken),
                ("|=", SyntaxKind::BarEqualsToken),
                ("|", SyntaxKind::BarToken),
            ]),
            '^' => self.longest(&[
                ("^=", SyntaxKind::CaretEqualsToken),
                ("^", SyntaxKind::CaretToken),
            ]),
            '#' => {
                if self.char_at(self.pos + 1).is_some_and(is_identifier_start) {
                    self.pos += 1;
                    self.scan_identifier_rest();
                    SyntaxKind::PrivateIdentifier
                } else {
                    self.punct(1, SyntaxKind::HashToken)
                }
            }
            '"' | '\'' => self.scan_string(ch),
            '`' => {
                self.pos += 1;
                self.scan_template_body(true)
            }
            '0'..='9' => self.scan_number(),
            c if is_identifier_start(c)
                || (c == '\\' && self.byte_at(self.pos + 1) == Some(b'u')) =>
            {
                self.scan_identifier_rest();
                let text = &self.source[self.token_start..self.pos];
                keyword_kind(text).unwrap_or(SyntaxKind::Identifier)
            }
            c => {
                self.pos += c.len_utf8();
                self.error(
                    self.token_start,
                    c.len_utf8(),
                    "Invalid character.",
                    diagnostic_codes::INVALID_CHARACTER,
                );
                SyntaxKind::Unknown
            }
        };
        self.token
    }

    #[inline]
    fn starts_with_at(&self, pos: usize, text: &str) -> bool {
        self.source
            .get(pos..)
            .is_some_and(|rest| rest.starts_with(text))
    }

    #[inline]
    fn punct(&mut self, len: usize, kind: SyntaxKind) -> SyntaxKind {
        self.pos += len;
        kind
    }

    fn longest(&mut self, candidates: &[(&str, SyntaxKind)]) -> SyntaxKind {
        for &(text, kind) in candidates {
            if self.starts_with_at(self.pos, text) {
                self.pos += text.len();
                return kind;
            }
        }
        self.pos += 1;
        SyntaxKind::Unknown
    }

    fn scan_identifier_rest(&mut self) {
        while let Some(ch) = self.char_at(self.pos) {
            if ch == '\\' && self.byte_at(self.pos + 1) == Some(b'u') {
                self.pos += 2;
                if self.byte_at(self.pos) == Some(b'{') {
                    while let Some(b) = self.byte_at(self.pos) {
                        self.pos += 1;
                        if b == b'}' {
                            break;
                        }
                    }
                } else {
                    let mut count = 0;
                    while count < 4 && self.byte_at(self.pos).is_some_and(|b| b.is_ascii_hexdigit())
                    {
                        self.pos += 1;
                        count += 1;
                    }
                }
            } else if is_identifier_part(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    fn scan_string(&mut self, quote: char) -> SyntaxKind {
        self.pos += 1;
        loop {
            let Some(ch) = self.char_at(self.pos) else {
                self.error(
                    self.token_start,
                    self.pos - self.token_start,
                    "Unterminated string literal.",
                    diagnostic_codes::UNTERMINATED_STRING_LITERAL,
                );
                break;
            };
            if ch == quote {
                self.pos += 1;
                break;
            }
            if ch == '\\' {
                self.pos += 1;
                // Line continuations and escaped quotes are both consumed here
                if self.byte_at(self.pos) == Some(b'\r') && self.byte_at(self.pos + 1) == Some(b'\n')
                {
                    self.pos += 2;
                } else {
                    self.advance_char();
                }
                continue;
            }
            if ch == '\n' || ch == '\r' {
                self.error(
                    self.token_start,
                    self.pos - self.token_start,
                    "Unterminated string literal.",
                    diagnostic_codes::UNTERMINATED_STRING_LITERAL,
                );
                break;
            }
            self.pos += ch.len_utf8();
        }
        SyntaxKind::StringLiteral
    }

    /// Scan template characters after a backtick or a closing `}`.
    fn scan_template_body(&mut self, is_head: bool) -> SyntaxKind {
        loop {
            let Some(ch) = self.char_at(self.pos) else {
                self.error(
                    self.token_start,
                    self.pos - self.token_start,
                    "Unterminated template literal.",
                    diagnostic_codes::UNTERMINATED_TEMPLATE_LITERAL,
                );
                return if is_head {
                    SyntaxKind::NoSubstitutionTemplateLiteral
                } else {
                    SyntaxKind::TemplateTail
                };
            };
            match ch {
                '`' => {
                    self.pos += 1;
                    return if is_head {
                        SyntaxKind::NoSubstitutionTemplateLiteral
                    } else {
                        SyntaxKind::TemplateTail
                    };
                }
                '$' if self.byte_at(self.pos + 1) == Some(b'{') => {
                    self.pos += 2;
                    return if is_head {
                        SyntaxKind::TemplateHead
                    } else {
                        SyntaxKind::TemplateMiddle
                    };
                }
                '\\' => {
                    self.pos += 1;
                    self.advance_char();
                }
                c => self.pos += c.len_utf8(),
            }
        }
    }

    fn scan_digits(&mut self, accept: fn(u8) -> bool) {
        while let Some(b) = self.byte_at(self.pos) {
            if accept(b) || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let radix_prefix = self.byte_at(self.pos) == Some(b'0')
            && matches!(
                self.byte_at(self.pos + 1),
                Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B')
            );
        if radix_prefix {
            self.pos += 2;
            self.scan_digits(|b| b.is_ascii_hexdigit());
        } else {
            self.scan_digits(|b| b.is_ascii_digit());
            if self.byte_at(self.pos) == Some(b'.') {
                self.pos += 1;
                self.scan_digits(|b| b.is_ascii_digit());
            }
            if matches!(self.byte_at(self.pos), Some(b'e' | b'E')) {
                let save = self.pos;
                self.pos += 1;
                if matches!(self.byte_at(self.pos), Some(b'+' | b'-')) {
                    self.pos += 1;
                }
                if self.byte_at(self.pos).is_some_and(|b| b.is_ascii_digit()) {
                    self.scan_digits(|b| b.is_ascii_digit());
                } else {
                    self.pos = save;
                }
            }
        }
        if self.byte_at(self.pos) == Some(b'n') {
            self.pos += 1;
            return SyntaxKind::BigIntLiteral;
        }
        SyntaxKind::NumericLiteral
    }

    // =========================================================================
    // Rescans
    // =========================================================================

    /// Re-scan a `/` or `/=` token as a regular expression literal.
    pub fn re_scan_slash_token(&mut self) -> SyntaxKind {
        if !matches!(
            self.token,
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken
        ) {
            return self.token;
        }
        self.pos = self.token_start + 1;
        let mut in_class = false;
        loop {
            let Some(ch) = self.char_at(self.pos) else {
                self.error(
                    self.token_start,
                    self.pos - self.token_start,
                    "Unterminated regular expression literal.",
                    diagnostic_codes::UNTERMINATED_REGULAR_EXPRESSION_LITERAL,
                );
                break;
            };
            if is_line_terminator(ch) {
                self.error(
                    self.token_start,
                    self.pos - self.token_start,
                    "Unterminated regular expression literal.",
                    diagnostic_codes::UNTERMINATED_REGULAR_EXPRESSION_LITERAL,
                );
                break;
            }
            match ch {
                '\\' => {
                    self.pos += 1;
                    self.advance_char();
                    continue;
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    self.pos += 1;
                    break;
                }
                _ => {}
            }
            self.pos += ch.len_utf8();
        }
        while self.char_at(self.pos).is_some_and(is_identifier_part) {
            self.advance_char();
        }
        self.token = SyntaxKind::RegularExpressionLiteral;
        self.token
    }

    /// Re-scan a `}` token as the continuation of a template literal.
    pub fn re_scan_template_token(&mut self) -> SyntaxKind {
        if self.token != SyntaxKind::CloseBraceToken {
            return self.token;
        }
        self.pos = self.token_start + 1;
        self.token = self.scan_template_body(false);
        self.token
    }
}

#[inline]
fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[inline]
fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{FEFF}')
        || (!ch.is_ascii() && ch.is_whitespace() && !is_line_terminator(ch))
}

/// True for characters that may start an identifier.
#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '$' || ch == '_' || (!ch.is_ascii() && ch.is_alphabetic())
}

/// True for characters that may continue an identifier.
#[inline]
pub fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || ch == '$'
        || ch == '_'
        || (!ch.is_ascii() && (ch.is_alphanumeric() || ch == '\u{200C}' || ch == '\u{200D}'))
}
