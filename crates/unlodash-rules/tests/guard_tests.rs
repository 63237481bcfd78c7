//! Tests for `Array.isArray` guard detection and its effect on the rule.
use unlodash_binder::BinderState;
use unlodash_parser::{NodeIndex, NodeKind, ParserState};
use unlodash_rules::guard::{find_enclosing_conditional, resolve_guard};
use unlodash_rules::{
    BinderResolver, Branch, Disposition, Finding, GuardDecision, NoFixReason, Polarity,
    PreferNativeMap, RuleConfig,
};

struct Bound {
    parser: ParserState,
    root: NodeIndex,
    binder: BinderState,
}

fn bind(source: &str) -> Bound {
    let mut parser = ParserState::new("test.js", source);
    let root = parser.parse_source_file();
    assert!(
        parser.get_diagnostics().is_empty(),
        "{source}: {:?}",
        parser.get_diagnostics()
    );
    let mut binder = BinderState::new();
    binder.bind_source_file(parser.get_arena(), root);
    Bound {
        parser,
        root,
        binder,
    }
}

fn lint(source: &str) -> Vec<Finding> {
    let bound = bind(source);
    let arena = bound.parser.get_arena();
    let resolver = BinderResolver::new(arena, &bound.binder);
    PreferNativeMap::new(RuleConfig::default()).run(arena, bound.root, &resolver)
}

/// Replacement text of the only finding.
fn rewrite(source: &str) -> String {
    let findings = lint(source);
    assert_eq!(findings.len(), 1, "{source}: {findings:?}");
    let fix = findings[0].fix.as_ref().expect("fixable");
    assert!(fix.insertions.is_empty());
    fix.replacement.text.clone()
}

/// The `_.map(...)` call in `source`.
fn map_call(bound: &Bound) -> NodeIndex {
    let arena = bound.parser.get_arena();
    (0..arena.len() as u32)
        .map(NodeIndex)
        .find(|&idx| {
            arena.kind(idx) == Some(NodeKind::CallExpression)
                && arena.node_text(idx).starts_with("_.map(")
        })
        .unwrap()
}

fn first_argument(bound: &Bound, call: NodeIndex) -> NodeIndex {
    bound
        .parser
        .get_arena()
        .get_call_arguments(call)
        .and_then(|args| args.get(0))
        .unwrap()
}

// =============================================================================
// Guard table
// =============================================================================

#[test]
fn positive_guard_consequent_replaces_directly() {
    assert_eq!(
        rewrite("if (Array.isArray(xs)) { r = _.map(xs, f); }"),
        "xs.map(f)"
    );
    assert_eq!(
        rewrite("const r1 = Array.isArray(collection) ? _.map(collection, fn1) : asd();"),
        "collection.map(fn1)"
    );
}

#[test]
fn positive_guard_alternate_is_skipped() {
    assert!(lint("if (Array.isArray(xs)) {} else { r = _.map(xs, f); }").is_empty());
    assert!(lint("r = Array.isArray(xs) ? xs : _.map(xs, f);").is_empty());
}

#[test]
fn negative_guard_consequent_is_skipped() {
    assert!(lint("if (!Array.isArray(xs)) { r = _.map(xs, f); }").is_empty());
    assert!(lint("r = !Array.isArray(xs) ? _.map(xs, f) : xs;").is_empty());
}

#[test]
fn negative_guard_alternate_replaces_directly() {
    assert_eq!(
        rewrite("if (!Array.isArray(xs)) { r = null; } else { r = _.map(xs, f); }"),
        "xs.map(f)"
    );
    assert_eq!(
        rewrite("const r1 = !Array.isArray(collection) ? asd() : _.map(collection, fn1);"),
        "collection.map(fn1)"
    );
}

#[test]
fn guard_context_reports_branch_and_polarity() {
    for (source, branch, polarity) in [
        (
            "if (Array.isArray(xs)) _.map(xs, f);",
            Branch::Consequent,
            Polarity::Positive,
        ),
        (
            "if (!(Array.isArray(xs))) ; else _.map(xs, f);",
            Branch::Alternate,
            Polarity::Negative,
        ),
        (
            "r = (!Array.isArray(xs)) ? 0 : _.map(xs, f);",
            Branch::Alternate,
            Polarity::Negative,
        ),
    ] {
        let bound = bind(source);
        let arena = bound.parser.get_arena();
        let resolver = BinderResolver::new(arena, &bound.binder);
        let call = map_call(&bound);
        let guard = resolve_guard(arena, &resolver, call, first_argument(&bound, call))
            .unwrap_or_else(|| panic!("{source}: no guard"));
        assert_eq!(guard.branch, branch, "{source}");
        assert_eq!(guard.polarity, polarity, "{source}");
        assert!(guard.subject_matches, "{source}");
    }
}

#[test]
fn guard_subject_ignores_parentheses() {
    assert_eq!(
        rewrite("if ((Array.isArray((xs)))) { _.map((xs), f); }"),
        "(xs).map(f)"
    );
}

#[test]
fn guard_on_another_value_does_not_decide() {
    let bound = bind("if (Array.isArray(ys)) { _.map(xs, f); }");
    let arena = bound.parser.get_arena();
    let resolver = BinderResolver::new(arena, &bound.binder);
    let call = map_call(&bound);
    let guard = resolve_guard(arena, &resolver, call, first_argument(&bound, call)).unwrap();
    assert!(!guard.subject_matches);
    assert_eq!(guard.decision(), None);

    assert_eq!(
        rewrite("if (Array.isArray(ys)) { _.map(xs, f); }"),
        "Array.isArray(xs) ? xs.map(f) : _.map(xs, f)"
    );
}

#[test]
fn decision_table() {
    use unlodash_rules::GuardContext;
    for (polarity, branch, decision) in [
        (Polarity::Positive, Branch::Consequent, GuardDecision::DirectReplace),
        (Polarity::Positive, Branch::Alternate, GuardDecision::Skip),
        (Polarity::Negative, Branch::Consequent, GuardDecision::Skip),
        (Polarity::Negative, Branch::Alternate, GuardDecision::DirectReplace),
    ] {
        let guard = GuardContext {
            conditional: NodeIndex(0),
            branch,
            polarity,
            subject_matches: true,
        };
        assert_eq!(guard.decision(), Some(decision));
    }
}

// =============================================================================
// Which conditional counts
// =============================================================================

#[test]
fn only_the_nearest_conditional_is_a_guard() {
    assert_eq!(
        rewrite("if (Array.isArray(xs)) { if (ready) { _.map(xs, f); } }"),
        "Array.isArray(xs) ? xs.map(f) : _.map(xs, f)"
    );
    assert_eq!(
        rewrite("if (ready) { if (Array.isArray(xs)) { _.map(xs, f); } }"),
        "xs.map(f)"
    );
}

#[test]
fn call_in_the_test_is_not_guarded_by_its_own_conditional() {
    let bound = bind("if (Array.isArray(xs)) { if (_.map(xs, f).length) {} }");
    let arena = bound.parser.get_arena();
    let call = map_call(&bound);
    let (conditional, branch) = find_enclosing_conditional(arena, call).unwrap();
    assert_eq!(branch, Branch::Consequent);
    assert!(
        arena
            .node_text(conditional)
            .starts_with("if (Array.isArray(xs))")
    );
    assert_eq!(
        rewrite("if (Array.isArray(xs)) { if (_.map(xs, f).length) {} }"),
        "xs.map(f)"
    );
}

#[test]
fn function_boundaries_end_the_search() {
    assert_eq!(
        rewrite("if (Array.isArray(xs)) { later(() => _.map(xs, f)); }"),
        "Array.isArray(xs) ? xs.map(f) : _.map(xs, f)"
    );
    let findings =
        lint("if (Array.isArray(xs)) {} else { later(function () { return _.map(xs, f); }); }");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].disposition, Disposition::GuardedTernary);
}

#[test]
fn lookalike_tests_are_not_guards() {
    for source in [
        "if (Array?.isArray(xs)) { _.map(xs, f); }",
        "if (Array.isArray(...xs)) { _.map(xs, f); }",
        "if (Array.isArray(xs, ys)) { _.map(xs, f); }",
        "if (Array.isArray(xs) && ok) { _.map(xs, f); }",
        "if (!!Array.isArray(xs)) { _.map(xs, f); }",
        "if (Array['isArray'](xs)) { _.map(xs, f); }",
    ] {
        let findings = lint(source);
        assert_eq!(findings.len(), 1, "{source}");
        assert_eq!(
            findings[0].disposition,
            Disposition::GuardedTernary,
            "{source}"
        );
    }
}

#[test]
fn shadowed_array_is_not_a_guard() {
    let findings = lint("function g(Array) { if (Array.isArray(xs)) { _.map(xs, f); } }");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].disposition, Disposition::GuardedTernary);
    assert_eq!(findings[0].no_fix_reason, Some(NoFixReason::ArrayShadowed));
    assert!(findings[0].fix.is_none());
}

#[test]
fn object_collections_ignore_guards() {
    assert!(lint("const o = {}; if (Array.isArray(o)) { _.map(o, f); }").is_empty());
}
