//! JavaScript scanner/tokenizer for the unlodash rewriter.
//!
//! This crate provides the lexical analysis phase:
//! - `SyntaxKind` - Token types
//! - `ScannerState` - Tokenizer state machine with regex/template rescans

pub mod syntax_kind;
pub use syntax_kind::{SyntaxKind, keyword_kind};

pub mod scanner_impl;
pub use scanner_impl::{ScannerDiagnostic, ScannerSnapshot, ScannerState};
