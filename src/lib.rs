//! unlodash: replaces lodash `_.map(collection, callback)` calls with the
//! native `Array.prototype.map`, adding an `Array.isArray` guard where the
//! collection cannot be proven to be an array.
//!
//! The analysis lives in the workspace crates (`unlodash-scanner`,
//! `unlodash-parser`, `unlodash-binder`, `unlodash-rules`). This crate runs
//! them over one source unit at a time (`lint_source`, `fix_source`), applies
//! fixes as text edits (`apply_fixes`) and hosts the command-line driver.

use tracing::{debug, warn};
use unlodash_binder::BinderState;
use unlodash_common::diagnostics::diagnostic_codes;
use unlodash_common::limits::MAX_FIX_PASSES;
use unlodash_parser::ParserState;
use unlodash_rules::{BinderResolver, PreferNativeMap};

pub use unlodash_common::{Diagnostic, DiagnosticCategory, LineMap, Position, Span};
pub use unlodash_rules::{Disposition, Finding, Fix, MessageKind, RuleConfig};

// Fix application (text edits, overlap resolution)
pub mod fix;
pub use fix::{AppliedFixes, apply_fixes};
#[cfg(test)]
#[path = "tests/fix_tests.rs"]
mod fix_tests;

// Tracing configuration (text / tree / JSON output for debugging)
pub mod tracing_config;

// Native CLI
pub mod cli;

/// Outcome of linting one source unit.
#[derive(Clone, Debug, Default)]
pub struct LintResult {
    /// Rule findings in source order. Empty when the unit did not parse.
    pub findings: Vec<Finding>,
    /// Parse errors. A unit with any of these is not linted.
    pub diagnostics: Vec<Diagnostic>,
}

impl LintResult {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn fixable_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_fixable()).count()
    }

    /// Findings as `Diagnostic`s (warnings with the rule's code).
    pub fn finding_diagnostics(&self, file_name: &str) -> Vec<Diagnostic> {
        self.findings
            .iter()
            .map(|finding| {
                Diagnostic::warning(
                    file_name,
                    finding.range.start,
                    finding.range.len(),
                    finding.message.clone(),
                    finding.message_kind.code(),
                )
            })
            .collect()
    }
}

/// Outcome of fixing one source unit to a fixed point.
#[derive(Clone, Debug)]
pub struct FixResult {
    /// Source text after the last successful pass.
    pub text: String,
    /// Passes that changed the text.
    pub passes: usize,
    /// Fixes applied across all passes.
    pub applied: usize,
    /// Lint result for `text`: findings without a fix, or whatever was left
    /// when the pass limit was hit.
    pub remaining: LintResult,
}

impl FixResult {
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// Parse, bind and run the rule over one unit.
pub fn lint_source(file_name: &str, text: &str, config: &RuleConfig) -> LintResult {
    let _span = tracing::debug_span!("lint_source", file = file_name).entered();

    let mut parser = ParserState::new(file_name, text);
    let root = parser.parse_source_file();
    let parse_diagnostics = parser.get_diagnostics();
    if !parse_diagnostics.is_empty() {
        debug!(
            errors = parse_diagnostics.len(),
            "parse failed, unit not linted"
        );
        return LintResult {
            findings: Vec::new(),
            diagnostics: parse_diagnostics
                .into_iter()
                .map(|d| Diagnostic::error(file_name, d.start, d.length, d.message, d.code))
                .collect(),
        };
    }

    let arena = parser.get_arena();
    let mut binder = BinderState::new();
    binder.bind_source_file(arena, root);
    if binder.truncated {
        // Scope information is incomplete; a rewrite could capture names.
        return LintResult {
            findings: Vec::new(),
            diagnostics: vec![Diagnostic::error(
                file_name,
                0,
                0,
                "Maximum nesting depth exceeded.",
                diagnostic_codes::MAXIMUM_NESTING_DEPTH_EXCEEDED,
            )],
        };
    }

    let resolver = BinderResolver::new(arena, &binder);
    let findings = PreferNativeMap::new(config.clone()).run(arena, root, &resolver);
    LintResult {
        findings,
        diagnostics: Vec::new(),
    }
}

/// Lint and apply fixes until no fix applies, re-parsing between passes.
///
/// Bounded by `MAX_FIX_PASSES`. A pass whose output no longer parses is
/// discarded and the text from the previous pass is returned.
pub fn fix_source(file_name: &str, text: &str, config: &RuleConfig) -> FixResult {
    let mut current = text.to_string();
    let mut result = lint_source(file_name, &current, config);
    let mut passes = 0;
    let mut applied = 0;

    while !result.has_errors() && passes < MAX_FIX_PASSES {
        let pass = apply_fixes(
            &current,
            result.findings.iter().filter_map(|f| f.fix.as_ref()),
        );
        if pass.applied == 0 {
            break;
        }
        let next = lint_source(file_name, &pass.text, config);
        if next.has_errors() {
            warn!(
                file = file_name,
                pass = passes + 1,
                "fixed output does not parse, keeping previous pass"
            );
            break;
        }
        passes += 1;
        applied += pass.applied;
        current = pass.text;
        result = next;
    }

    if passes == MAX_FIX_PASSES && result.fixable_count() > 0 {
        warn!(
            file = file_name,
            fixable = result.fixable_count(),
            "fix pass limit reached"
        );
    }
    debug!(file = file_name, passes, applied, "fix_source done");

    FixResult {
        text: current,
        passes,
        applied,
        remaining: result,
    }
}
