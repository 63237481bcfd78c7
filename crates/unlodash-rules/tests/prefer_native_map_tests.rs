//! End-to-end tests for the prefer-native-map rule: parse, bind, run, apply.
use unlodash_binder::BinderState;
use unlodash_common::Span;
use unlodash_common::limits::MAX_FIX_PASSES;
use unlodash_parser::ParserState;
use unlodash_rules::anchor::HoistBlocker;
use unlodash_rules::{
    BinderResolver, Disposition, Finding, Fix, NoFixReason, PreferNativeMap, RuleConfig,
};

fn lint_with(source: &str, config: RuleConfig) -> Vec<Finding> {
    let mut parser = ParserState::new("test.js", source);
    let root = parser.parse_source_file();
    assert!(
        parser.get_diagnostics().is_empty(),
        "{source}: {:?}",
        parser.get_diagnostics()
    );
    let arena = parser.get_arena();
    let mut binder = BinderState::new();
    binder.bind_source_file(arena, root);
    let resolver = BinderResolver::new(arena, &binder);
    PreferNativeMap::new(config).run(arena, root, &resolver)
}

fn lint(source: &str) -> Vec<Finding> {
    lint_with(source, RuleConfig::default())
}

/// Apply every fix that does not conflict with an earlier one.
fn apply(source: &str, findings: &[Finding]) -> String {
    let mut fixes: Vec<&Fix> = findings.iter().filter_map(|f| f.fix.as_ref()).collect();
    fixes.sort_by_key(|fix| {
        let range = fix.replacement.range;
        (range.start, std::cmp::Reverse(range.end))
    });
    let mut accepted: Vec<&Fix> = Vec::new();
    for fix in fixes {
        if accepted.iter().all(|a| !a.conflicts_with(fix)) {
            accepted.push(fix);
        }
    }
    let mut edits: Vec<(Span, &str)> = accepted.iter().flat_map(|fix| fix.edits()).collect();
    edits.sort_by_key(|(span, _)| (span.start, !span.is_empty()));

    let mut out = String::new();
    let mut cursor = 0;
    for (span, text) in edits {
        out.push_str(&source[cursor..span.start as usize]);
        out.push_str(text);
        cursor = span.end as usize;
    }
    out.push_str(&source[cursor..]);
    out
}

/// One lint-and-apply pass.
fn fix_once(source: &str) -> String {
    apply(source, &lint(source))
}

/// Lint and apply until nothing is fixable.
fn fix_all(source: &str) -> String {
    let mut text = source.to_string();
    for _ in 0..MAX_FIX_PASSES {
        let findings = lint(&text);
        if !findings.iter().any(Finding::is_fixable) {
            break;
        }
        text = apply(&text, &findings);
    }
    text
}

fn assert_no_findings(source: &str) {
    let findings = lint(source);
    assert!(findings.is_empty(), "{source}: {findings:?}");
}

// =============================================================================
// Skipped calls
// =============================================================================

#[test]
fn object_collections_are_left_alone() {
    assert_no_findings("_.map({ a: 4, b: 8 }, () => {});");
    assert_no_findings("const obj = {}; const myVar = _.map(obj, fn);");
    assert_no_findings("const obj = {}; function z(){ return _.map(obj, () => {}) }");
}

#[test]
fn guarded_non_array_branches_are_left_alone() {
    assert_no_findings("const r = Array.isArray(collection) ? asd() : _.map(collection, fn1);");
    assert_no_findings("const r = !Array.isArray(collection) ? _.map(collection, fn1) : asd();");
    assert_no_findings(
        "if(Array.isArray(collection)) {\n    qwer = collection.map(fn);\n} else {\n    qwer = _.map(collection, fn);\n}",
    );
}

#[test]
fn iteratee_shorthands_are_left_alone() {
    assert_no_findings("_.map(users, 'name');");
    assert_no_findings("_.map(users, 0);");
    assert_no_findings("_.map(users, ['active', true]);");
    assert_no_findings("_.map(users, { active: true });");
    assert_no_findings("_.map([1, 2], `length`);");
}

#[test]
fn reassigned_alias_is_left_alone() {
    assert_no_findings("_ = other;\n_.map(xs, f);");
    assert_no_findings("let _ = lodash;\nfunction swap() { _ = other; }\nswap();\n_.map(xs, f);");
    // Writes after the call are not considered.
    assert_eq!(lint("let _ = lodash;\n_.map(xs, f);\n_ = null;").len(), 1);
}

#[test]
fn malformed_calls_produce_nothing() {
    for source in [
        "_.map(xs);",
        "_.map(...args);",
        "_['map'](xs, f);",
        "_?.map(xs, f);",
        "_.map?.(xs, f);",
        "lodash.map(xs, f);",
    ] {
        assert_no_findings(source);
    }
}

// =============================================================================
// Direct replacement
// =============================================================================

#[test]
fn array_literals_are_replaced_directly() {
    assert_eq!(fix_once("_.map([1, 2, 3], () => {})"), "[1, 2, 3].map(() => {})");
    assert_eq!(fix_once("_.map([], myFunc)"), "[].map(myFunc)");
    assert_eq!(fix_once("_.map([1,2,3], fn)"), "[1,2,3].map(fn)");
}

#[test]
fn const_array_bindings_are_replaced_directly() {
    assert_eq!(
        fix_once("const array = [];_.map(array, myFunc)"),
        "const array = [];array.map(myFunc)"
    );
    assert_eq!(
        fix_once("const xs = [1,2]; _.map(xs, fn);"),
        "const xs = [1,2]; xs.map(fn);"
    );
}

#[test]
fn array_producing_calls_are_replaced_directly() {
    assert_eq!(
        fix_once("_.map(Array.from(items), myFunc)"),
        "Array.from(items).map(myFunc)"
    );
    assert_eq!(
        fix_once("const pairs = _.map(Object.entries(o), ([k, v]) => k + v);"),
        "const pairs = Object.entries(o).map(([k, v]) => k + v);"
    );
}

#[test]
fn direct_replacement_reports_its_disposition() {
    let findings = lint("_.map([1], f);");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].disposition, Disposition::DirectReplace);
    assert_eq!(findings[0].range, Span::new(0, 13));
    assert_eq!(
        findings[0].message,
        "Use native JavaScript Array.map() instead of _.map()"
    );
    let fix = findings[0].fix.as_ref().unwrap();
    assert!(fix.insertions.is_empty());
    assert_eq!(fix.replacement.text, "[1].map(f)");
}

// =============================================================================
// Guarded ternary
// =============================================================================

#[test]
fn unknown_identifiers_get_a_runtime_guard() {
    assert_eq!(
        fix_once("const a = _.map(someVariable, fn);"),
        "const a = Array.isArray(someVariable) ? someVariable.map(fn) : _.map(someVariable, fn);"
    );
    assert_eq!(
        fix_once("const someVariable = getAction();const a = _.map(someVariable, fn);"),
        "const someVariable = getAction();const a = Array.isArray(someVariable) ? someVariable.map(fn) : _.map(someVariable, fn);"
    );
}

#[test]
fn mutable_array_bindings_stay_guarded() {
    assert_eq!(
        fix_once("let xs = [1, 2];\n_.map(xs, f);"),
        "let xs = [1, 2];\nArray.isArray(xs) ? xs.map(f) : _.map(xs, f);"
    );
}

#[test]
fn call_collections_and_inline_callbacks_are_hoisted() {
    assert_eq!(
        fix_once("_.map(getItems(), a => a * 10 )"),
        "const collection = getItems();\nconst callback = a => a * 10;\nArray.isArray(collection) ? collection.map(callback) : _.map(collection, callback)"
    );
    assert_eq!(
        fix_once("_.map(getItems(), function(a) { return a + 10; } )"),
        "const collection = getItems();\nconst callback = function(a) { return a + 10; };\nArray.isArray(collection) ? collection.map(callback) : _.map(collection, callback)"
    );
    assert_eq!(
        fix_once("_.map(getItems(), x => x*2)"),
        "const collection = getItems();\nconst callback = x => x*2;\nArray.isArray(collection) ? collection.map(callback) : _.map(collection, callback)"
    );
}

#[test]
fn named_callbacks_are_not_hoisted() {
    assert_eq!(
        fix_once("const result = _.map(getItems(), someFunction );"),
        "const collection = getItems();\nconst result = Array.isArray(collection) ? collection.map(someFunction) : _.map(collection, someFunction);"
    );
    assert_eq!(
        fix_once("_.map([].concat([]), fn);"),
        "const collection = [].concat([]);\nArray.isArray(collection) ? collection.map(fn) : _.map(collection, fn);"
    );
}

#[test]
fn member_accessed_calls_are_parenthesized() {
    assert_eq!(
        fix_once("_.map(collection, fn).map(another)"),
        "(Array.isArray(collection) ? collection.map(fn) : _.map(collection, fn)).map(another)"
    );
    assert_eq!(
        fix_once("_.map(col, fn).map(g)"),
        "(Array.isArray(col) ? col.map(fn) : _.map(col, fn)).map(g)"
    );
    assert_eq!(
        fix_once("total = 1 + _.map(xs, f).length;"),
        "total = 1 + (Array.isArray(xs) ? xs.map(f) : _.map(xs, f)).length;"
    );
}

#[test]
fn ternary_inside_an_unrelated_conditional_is_bare() {
    assert_eq!(
        fix_once("const r = null == 0 ? _.map(collection, fn) : another();"),
        "const r = null == 0 ? Array.isArray(collection) ? collection.map(fn) : _.map(collection, fn) : another();"
    );
}

#[test]
fn hoisted_names_avoid_visible_bindings() {
    let source = "const collection = [1, 2, 3]; const callback = () => {}; const result = _.map(getItems(), a => a * 10);";
    assert_eq!(
        fix_once(source),
        "const collection = [1, 2, 3]; const callback = () => {}; const collection1 = getItems();\nconst callback1 = a => a * 10;\nconst result = Array.isArray(collection1) ? collection1.map(callback1) : _.map(collection1, callback1);"
    );
}

#[test]
fn hoisted_names_avoid_later_declarations_and_implicit_globals() {
    assert_eq!(
        fix_once("_.map(load(), f);\nlet collection = 1;\ncollection1 = 2;"),
        "const collection2 = load();\nArray.isArray(collection2) ? collection2.map(f) : _.map(collection2, f);\nlet collection = 1;\ncollection1 = 2;"
    );
}

#[test]
fn context_and_extra_arguments_are_preserved() {
    assert_eq!(
        fix_once("const result = _.map(something, fn, ctx);"),
        "const result = Array.isArray(something) ? something.map(fn, ctx) : _.map(something, fn, ctx);"
    );
    assert_eq!(
        fix_once("_.map([1], fn, ctx, extra);"),
        "[1].map(fn, ctx, extra);"
    );
}

#[test]
fn several_findings_in_one_unit() {
    let source = "const result = _.map(something, fn, ctx);\nfunction myFn() { let nothing = getItems(); return _.map(nothing, squareFn); }\nconst callback = _.map(result, (a, b) => a + b);";
    let findings = lint(source);
    assert_eq!(findings.len(), 3);
    assert!(findings.windows(2).all(|w| w[0].range.start < w[1].range.start));
    assert_eq!(
        apply(source, &findings),
        "const result = Array.isArray(something) ? something.map(fn, ctx) : _.map(something, fn, ctx);\nfunction myFn() { let nothing = getItems(); return Array.isArray(nothing) ? nothing.map(squareFn) : _.map(nothing, squareFn); }\nconst callback1 = (a, b) => a + b;\nconst callback = Array.isArray(result) ? result.map(callback1) : _.map(result, callback1);"
    );
}

#[test]
fn hoisted_names_are_unique_within_a_unit() {
    let source = "const a = _.map(one(), f);\nconst b = _.map(two(), g);";
    assert_eq!(
        fix_once(source),
        "const collection = one();\nconst a = Array.isArray(collection) ? collection.map(f) : _.map(collection, f);\nconst collection1 = two();\nconst b = Array.isArray(collection1) ? collection1.map(g) : _.map(collection1, g);"
    );
}

#[test]
fn sibling_hoists_keep_evaluation_order() {
    assert_eq!(
        fix_once("f(_.map(g(), a), _.map(h(), b));"),
        "const collection = g();\nconst collection1 = h();\nf(Array.isArray(collection) ? collection.map(a) : _.map(collection, a), Array.isArray(collection1) ? collection1.map(b) : _.map(collection1, b));"
    );
}

#[test]
fn hoists_may_use_bindings_declared_before_the_statement() {
    assert_eq!(
        fix_once("const a = [1];\nconst b = _.map(a.concat(2), f);"),
        "const a = [1];\nconst collection = a.concat(2);\nconst b = Array.isArray(collection) ? collection.map(f) : _.map(collection, f);"
    );
    // The callback's own parameters are declared inside the hoisted text.
    assert_eq!(
        fix_once("const n = 1, ys = _.map(load(), x => x + 1);"),
        "const collection = load();\nconst callback = x => x + 1;\nconst n = 1, ys = Array.isArray(collection) ? collection.map(callback) : _.map(collection, callback);"
    );
}

#[test]
fn insertions_keep_the_statement_indentation() {
    let source = "function f() {\n    const r = _.map(getItems(), x => x);\n    return r;\n}";
    assert_eq!(
        fix_once(source),
        "function f() {\n    const collection = getItems();\n    const callback = x => x;\n    const r = Array.isArray(collection) ? collection.map(callback) : _.map(collection, callback);\n    return r;\n}"
    );
}

#[test]
fn non_member_safe_receivers_are_parenthesized() {
    assert_eq!(
        fix_once("_.map(5, f);"),
        "Array.isArray(5) ? (5).map(f) : _.map(5, f);"
    );
    assert_eq!(
        fix_once("_.map(this, f);"),
        "Array.isArray(this) ? this.map(f) : _.map(this, f);"
    );
}

#[test]
fn statements_after_an_unterminated_statement_get_a_leading_semicolon() {
    assert_eq!(
        fix_once("foo()\n_.map([1, 2], f)"),
        "foo()\n;[1, 2].map(f)"
    );
    assert_eq!(
        fix_once("foo()\n_.map(col, f).map(h)"),
        "foo()\n;(Array.isArray(col) ? col.map(f) : _.map(col, f)).map(h)"
    );
    assert_eq!(
        fix_once("x = {}\n_.map([1], f)"),
        "x = {}\n;[1].map(f)"
    );
    assert_eq!(
        fix_once("if (ok) foo()\n_.map([1], f)"),
        "if (ok) foo()\n;[1].map(f)"
    );
}

#[test]
fn terminated_statements_need_no_leading_semicolon() {
    for (source, expected) in [
        ("foo();\n_.map([1, 2], f)", "foo();\n[1, 2].map(f)"),
        ("function g() {}\n_.map([1], f)", "function g() {}\n[1].map(f)"),
        ("if (ok) { foo() }\n_.map([1], f)", "if (ok) { foo() }\n[1].map(f)"),
        ("{\n  _.map([1], f)\n}", "{\n  [1].map(f)\n}"),
        ("foo()\nx = _.map([1], f)", "foo()\nx = [1].map(f)"),
        ("foo()\n_.map(col, f)", "foo()\nArray.isArray(col) ? col.map(f) : _.map(col, f)"),
    ] {
        assert_eq!(fix_once(source), expected, "{source}");
    }
    // Hoisted declarations already end the previous line.
    assert_eq!(
        fix_once("foo()\n_.map(load(), f).map(h)"),
        "foo()\nconst collection = load();\n(Array.isArray(collection) ? collection.map(f) : _.map(collection, f)).map(h)"
    );
}

// =============================================================================
// Findings without a fix
// =============================================================================

#[test]
fn unsafe_hoists_report_without_fix() {
    for (source, blocker) in [
        (
            "const f = () => _.map(getItems(), g);",
            HoistBlocker::FunctionBoundary,
        ),
        ("x = c ? _.map(load(), g) : 1;", HoistBlocker::ConditionalBranch),
        ("x = ready && _.map(load(), g);", HoistBlocker::ShortCircuit),
        ("while (more()) _.map(load(), g);", HoistBlocker::LoopBody),
        ("x = a?.b(_.map(load(), g));", HoistBlocker::OptionalChain),
    ] {
        let findings = lint(source);
        assert_eq!(findings.len(), 1, "{source}");
        assert_eq!(findings[0].disposition, Disposition::GuardedTernary);
        assert!(findings[0].fix.is_none(), "{source}");
        assert_eq!(
            findings[0].no_fix_reason,
            Some(NoFixReason::UnsafeHoist(blocker)),
            "{source}"
        );
    }
}

#[test]
fn hoists_naming_bindings_of_the_same_statement_report_without_fix() {
    for source in [
        "const a = [1], b = _.map(a.concat(2), f);",
        "let a = load(), b = _.map(a.items(), f);",
        "var a = [1], b = _.map(a.slice(), f);",
        "for (let i = 0, ys = _.map(g(i), f); i < 1; i++) {}",
        "for (let i = 0, ys = _.map(xs, x => x + i); i < 1; i++) {}",
    ] {
        let findings = lint(source);
        assert_eq!(findings.len(), 1, "{source}");
        assert_eq!(findings[0].disposition, Disposition::GuardedTernary);
        assert!(findings[0].fix.is_none(), "{source}");
        assert_eq!(
            findings[0].no_fix_reason,
            Some(NoFixReason::UnsafeHoist(HoistBlocker::StatementBinding)),
            "{source}"
        );
    }
}

#[test]
fn unsafe_positions_still_fix_when_nothing_is_hoisted() {
    assert_eq!(
        fix_once("const f = () => _.map(xs, g);"),
        "const f = () => Array.isArray(xs) ? xs.map(g) : _.map(xs, g);"
    );
    assert_eq!(
        fix_once("x = ready && _.map(xs, g);"),
        "x = ready && (Array.isArray(xs) ? xs.map(g) : _.map(xs, g));"
    );
}

#[test]
fn shadowed_array_reports_without_fix() {
    let findings = lint("const Array = MyList;\n_.map(xs, f);");
    assert_eq!(findings.len(), 1);
    assert!(findings[0].fix.is_none());
    assert_eq!(findings[0].no_fix_reason, Some(NoFixReason::ArrayShadowed));

    // A direct replacement does not mention `Array`.
    assert_eq!(
        fix_once("const Array = MyList;\n_.map([1], f);"),
        "const Array = MyList;\n[1].map(f);"
    );
}

// =============================================================================
// Fixed point
// =============================================================================

#[test]
fn nested_calls_converge() {
    let fixed = fix_all("_.map(_.map(getItems(), f), g);");
    assert_eq!(
        fixed,
        "const collection1 = getItems();\nconst collection = Array.isArray(collection1) ? collection1.map(f) : _.map(collection1, f);\nArray.isArray(collection) ? collection.map(g) : _.map(collection, g);"
    );
}

#[test]
fn fixed_output_has_nothing_left_to_fix() {
    for source in [
        "_.map(getItems(), a => a * 10 )",
        "_.map(col, fn).map(g)",
        "const result = _.map(something, fn, ctx);\nfunction myFn() { let nothing = getItems(); return _.map(nothing, squareFn); }\nconst callback = _.map(result, (a, b) => a + b);",
        "if (ok) { const v = _.map(load(), x => x + 1); }",
    ] {
        let fixed = fix_all(source);
        let remaining = lint(&fixed);
        assert!(
            remaining.iter().all(|f| !f.is_fixable()),
            "{fixed}: {remaining:?}"
        );
        assert!(remaining.is_empty(), "{fixed}: {remaining:?}");
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn configured_names_are_matched_and_emitted() {
    let config = RuleConfig {
        alias_name: "lodash".into(),
        map_method_name: "collect".into(),
        native_method_name: "map".into(),
    };
    let source = "lodash.collect(xs, f); _.map(xs, f);";
    let findings = lint_with(source, config);
    assert_eq!(findings.len(), 1);
    assert_eq!(
        findings[0].message,
        "Use native JavaScript Array.map() instead of lodash.collect()"
    );
    assert_eq!(
        apply(source, &findings),
        "Array.isArray(xs) ? xs.map(f) : lodash.collect(xs, f); _.map(xs, f);"
    );
}
