//! Common types and utilities for the unlodash rewriter.
//!
//! This crate provides foundational types used across all unlodash crates:
//! - Source spans (`Span`)
//! - Line/column positions (`LineMap`, `Position`)
//! - Diagnostics produced by the scanner and parser
//! - Centralized limits and thresholds

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Position/line map types for line/column source locations
pub mod position;
pub use position::{LineMap, Position};

// Diagnostics shared by scanner and parser
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};

// Centralized limits and thresholds
pub mod limits;
