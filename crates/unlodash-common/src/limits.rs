//! Centralized limits and thresholds.
//!
//! Recursion depths and iteration caps used by the parser, binder, rule and
//! fix driver. Keeping them in one place avoids inconsistent duplicates.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth of expressions and statements in the parser.
///
/// Deeply nested input such as `((((((...))))))` or `f(f(f(...)))` adds one
/// stack frame per level; past this depth the parser reports a diagnostic
/// and stops descending.
pub const MAX_PARSER_RECURSION_DEPTH: u32 = 256;

/// Maximum tree depth the binder and the rule descend into.
///
/// Member chains and left-associative binary operators are parsed in loops,
/// so the tree can be deeper than the parser's recursion limit. Files whose
/// trees exceed this depth are bound partially and reported as too complex.
pub const MAX_TREE_WALK_DEPTH: u32 = 4_096;

// =============================================================================
// Operation Count Limits
// =============================================================================

/// Maximum number of scopes visited while resolving a single name.
pub const MAX_SCOPE_WALK_ITERATIONS: usize = 10_000;

/// Maximum number of parent links followed by any upward tree walk.
pub const MAX_PARENT_WALK: usize = 100_000;

/// Maximum number of lint-and-fix passes before giving up on a fixed point.
///
/// Nested candidate calls (`_.map(_.map(a, f), g)`) need one pass per level
/// because overlapping fixes are deferred to the next pass.
pub const MAX_FIX_PASSES: usize = 10;

/// Maximum integer suffix tried by the hygienic name allocator.
pub const MAX_NAME_SUFFIX: u32 = 100_000;
