//! Applying rule fixes to source text.
//!
//! A fix is a set of insertions plus one replacement. Fixes are applied in
//! replacement order; a fix that conflicts with an already accepted one is
//! left for the next pass, so nested call sites are rewritten outside-in.
//! Sibling fixes hoisting before the same statement apply together, their
//! declarations in source order.

use std::cmp::Reverse;
use tracing::trace;
use unlodash_common::Span;
use unlodash_rules::Fix;

/// Result of one application pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedFixes {
    pub text: String,
    pub applied: usize,
    /// Fixes deferred because they conflicted with an accepted fix.
    pub skipped: usize,
}

pub fn apply_fixes<'a>(text: &str, fixes: impl IntoIterator<Item = &'a Fix>) -> AppliedFixes {
    let mut fixes: Vec<&Fix> = fixes.into_iter().collect();
    // Outermost first among replacements starting at the same offset.
    fixes.sort_by_key(|fix| {
        let range = fix.replacement.range;
        (range.start, Reverse(range.end))
    });

    let mut accepted: Vec<&Fix> = Vec::with_capacity(fixes.len());
    let mut skipped = 0;
    for fix in fixes {
        if accepted.iter().any(|a| a.conflicts_with(fix)) {
            let range = fix.replacement.range;
            trace!(start = range.start, end = range.end, "conflicting fix deferred");
            skipped += 1;
            continue;
        }
        accepted.push(fix);
    }

    // Insertions at an offset go ahead of a replacement starting there, and
    // keep the accepted order among themselves.
    let mut edits: Vec<(Span, &str)> = accepted.iter().flat_map(|fix| fix.edits()).collect();
    edits.sort_by_key(|(span, _)| (span.start, !span.is_empty()));

    let added: usize = edits.iter().map(|(_, t)| t.len()).sum();
    let mut out = String::with_capacity(text.len() + added);
    let mut cursor = 0usize;
    for (span, replacement) in edits {
        let start = span.start as usize;
        if start > cursor {
            out.push_str(text.get(cursor..start).unwrap_or(""));
        }
        out.push_str(replacement);
        cursor = cursor.max(span.end as usize);
    }
    out.push_str(text.get(cursor..).unwrap_or(""));

    AppliedFixes {
        text: out,
        applied: accepted.len(),
        skipped,
    }
}
