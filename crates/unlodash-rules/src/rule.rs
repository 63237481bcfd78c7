//! The `prefer-native-map` rule.

use crate::alias::alias_is_compromised;
use crate::classify::{ArgumentShape, Classification, classify};
use crate::config::RuleConfig;
use crate::guard::resolve_guard;
use crate::matcher::{CallSite, CallSiteMatcher};
use crate::names::NameAllocator;
use crate::resolver::ScopeResolver;
use crate::synth::{Disposition, Insertion, NoFixReason, Replacement, Synthesis, Synthesizer};
use serde::Serialize;
use tracing::{debug, trace};
use unlodash_common::Span;
use unlodash_common::diagnostics::diagnostic_codes;
use unlodash_parser::{NodeArena, NodeIndex, NodeKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    PreferNativeMap,
}

impl MessageKind {
    /// Stable identifier used in reports (`UL001`).
    pub fn code(self) -> u32 {
        match self {
            MessageKind::PreferNativeMap => diagnostic_codes::PREFER_NATIVE_MAP,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            MessageKind::PreferNativeMap => "preferNativeMap",
        }
    }
}

/// Edits for one finding: hoisted declarations, then the call replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fix {
    pub insertions: Vec<Insertion>,
    pub replacement: Replacement,
}

impl Fix {
    /// From the first insertion to the end of the replacement. Two fixes
    /// whose spans overlap cannot be applied in the same pass.
    pub fn span(&self) -> Span {
        self.insertions
            .iter()
            .fold(self.replacement.range, |span, ins| span.cover(Span::at(ins.pos)))
    }

    /// True when the two fixes cannot be applied in the same pass: their
    /// replacements overlap, or one inserts inside the other's replacement.
    /// Sibling call sites hoisting before the same statement do not conflict.
    pub fn conflicts_with(&self, other: &Fix) -> bool {
        let inserts_into = |fix: &Fix, range: Span| {
            fix.insertions
                .iter()
                .any(|ins| Span::at(ins.pos).overlaps(range))
        };
        self.replacement.range.overlaps(other.replacement.range)
            || inserts_into(self, other.replacement.range)
            || inserts_into(other, self.replacement.range)
    }

    /// Every edit as `(range, text)`, in application order.
    pub fn edits(&self) -> impl Iterator<Item = (Span, &str)> + '_ {
        self.insertions
            .iter()
            .map(|ins| (Span::at(ins.pos), ins.text.as_str()))
            .chain(std::iter::once((
                self.replacement.range,
                self.replacement.text.as_str(),
            )))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    pub range: Span,
    pub disposition: Disposition,
    pub message_kind: MessageKind,
    pub message: String,
    pub fix: Option<Fix>,
    /// Set when a rewrite was chosen but could not be emitted safely.
    pub no_fix_reason: Option<NoFixReason>,
}

impl Finding {
    #[inline]
    pub fn is_fixable(&self) -> bool {
        self.fix.is_some()
    }
}

/// Flags `<alias>.<method>(collection, callback)` calls that can use the
/// native array method instead.
#[derive(Clone, Debug, Default)]
pub struct PreferNativeMap {
    config: RuleConfig,
}

impl PreferNativeMap {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    pub fn message(&self) -> String {
        format!(
            "Use native JavaScript Array.{}() instead of {}.{}()",
            self.config.native_method_name, self.config.alias_name, self.config.map_method_name
        )
    }

    /// Run over the tree rooted at `root`. Findings come back in source
    /// order. Nested call sites may get overlapping fixes; the applier keeps
    /// the outermost and the next pass picks up the rest.
    pub fn run(
        &self,
        arena: &NodeArena,
        root: NodeIndex,
        resolver: &dyn ScopeResolver,
    ) -> Vec<Finding> {
        let synthesizer = Synthesizer::new(arena, resolver, &self.config);
        let mut names = NameAllocator::new();
        let findings: Vec<Finding> = CallSiteMatcher::new(arena, &self.config, root)
            .filter_map(|site| self.check(arena, resolver, &synthesizer, &site, &mut names))
            .collect();
        debug!(
            findings = findings.len(),
            fixable = findings.iter().filter(|f| f.is_fixable()).count(),
            "[RULE] prefer-native-map done"
        );
        findings
    }

    fn check(
        &self,
        arena: &NodeArena,
        resolver: &dyn ScopeResolver,
        synthesizer: &Synthesizer<'_>,
        site: &CallSite,
        names: &mut NameAllocator,
    ) -> Option<Finding> {
        if alias_is_compromised(arena, resolver, site.call, &self.config.alias_name) {
            trace!(pos = site.range.start, "[RULE] alias reassigned before call");
            return None;
        }
        if is_iteratee_shorthand(arena, site.callback) {
            trace!(pos = site.range.start, "[RULE] iteratee shorthand");
            return None;
        }

        let classification = classify(arena, resolver, site.collection);
        let guard = if classification == Classification::ProvenObjectLike {
            None
        } else {
            resolve_guard(arena, resolver, site.call, site.collection)
                .and_then(|guard| guard.decision())
        };
        let disposition = crate::synth::decide(classification, guard);
        trace!(
            pos = site.range.start,
            ?classification,
            ?guard,
            ?disposition,
            "[RULE] call site"
        );

        let (disposition, fix, no_fix_reason) =
            match synthesizer.synthesize(site, disposition, names) {
                Synthesis::Skip => return None,
                Synthesis::Plan(plan) => (
                    plan.disposition,
                    Some(Fix {
                        insertions: plan.insertions,
                        replacement: plan.replacement,
                    }),
                    None,
                ),
                Synthesis::NoFix {
                    disposition,
                    reason,
                } => {
                    debug!(pos = site.range.start, ?reason, "[RULE] finding without fix");
                    (disposition, None, Some(reason))
                }
            };

        Some(Finding {
            range: site.range,
            disposition,
            message_kind: MessageKind::PreferNativeMap,
            message: self.message(),
            fix,
            no_fix_reason,
        })
    }
}

/// lodash's property, matches and matchesProperty shorthands have no native
/// equivalent.
fn is_iteratee_shorthand(arena: &NodeArena, callback: NodeIndex) -> bool {
    match ArgumentShape::of(arena, callback) {
        ArgumentShape::ArrayLiteral | ArgumentShape::ObjectLiteral => true,
        ArgumentShape::Literal => matches!(
            arena.kind(arena.skip_parentheses(callback)),
            Some(
                NodeKind::StringLiteral
                    | NodeKind::NumericLiteral
                    | NodeKind::NoSubstitutionTemplateLiteral
            )
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_span_covers_insertions() {
        let fix = Fix {
            insertions: vec![Insertion {
                before: NodeIndex(0),
                pos: 4,
                text: "const c = g();\n".into(),
            }],
            replacement: Replacement {
                range: Span::new(14, 30),
                text: "c.map(f)".into(),
            },
        };
        assert_eq!(fix.span(), Span::new(4, 30));
        let edits: Vec<(Span, &str)> = fix.edits().collect();
        assert_eq!(
            edits,
            vec![
                (Span::at(4), "const c = g();\n"),
                (Span::new(14, 30), "c.map(f)")
            ]
        );
    }

    #[test]
    fn sibling_fixes_sharing_an_anchor_do_not_conflict() {
        let fix = |start: u32, end: u32| Fix {
            insertions: vec![Insertion {
                before: NodeIndex(0),
                pos: 0,
                text: "const c = g();\n".into(),
            }],
            replacement: Replacement {
                range: Span::new(start, end),
                text: "c.map(f)".into(),
            },
        };
        assert!(!fix(2, 10).conflicts_with(&fix(12, 20)));
        assert!(fix(2, 20).conflicts_with(&fix(12, 18)));
        let inner_anchor = Fix {
            insertions: vec![Insertion {
                before: NodeIndex(0),
                pos: 15,
                text: "const d = h();\n".into(),
            }],
            ..fix(16, 18)
        };
        assert!(fix(2, 20).conflicts_with(&inner_anchor));
    }

    #[test]
    fn message_uses_configured_names() {
        let rule = PreferNativeMap::new(RuleConfig {
            alias_name: "lodash".into(),
            ..RuleConfig::default()
        });
        assert_eq!(
            rule.message(),
            "Use native JavaScript Array.map() instead of lodash.map()"
        );
        assert_eq!(MessageKind::PreferNativeMap.code(), 1);
    }
}
