use crate::fix::apply_fixes;
use unlodash_common::Span;
use unlodash_parser::NodeIndex;
use unlodash_rules::{Fix, Insertion, Replacement};

fn replace(start: u32, end: u32, text: &str) -> Fix {
    Fix {
        insertions: Vec::new(),
        replacement: Replacement {
            range: Span::new(start, end),
            text: text.to_string(),
        },
    }
}

fn with_insertion(mut fix: Fix, pos: u32, text: &str) -> Fix {
    fix.insertions.push(Insertion {
        before: NodeIndex(0),
        pos,
        text: text.to_string(),
    });
    fix
}

#[test]
fn applies_a_single_replacement() {
    let source = "a = _.map(xs, f);";
    let fix = replace(4, 16, "xs.map(f)");
    let out = apply_fixes(source, [&fix]);
    assert_eq!(out.text, "a = xs.map(f);");
    assert_eq!(out.applied, 1);
    assert_eq!(out.skipped, 0);
}

#[test]
fn insertions_land_before_the_replacement() {
    let source = "foo(_.map(g(), f));";
    let fix = with_insertion(
        replace(4, 17, "collection.map(f)"),
        0,
        "const collection = g();\n",
    );
    let out = apply_fixes(source, [&fix]);
    assert_eq!(out.text, "const collection = g();\nfoo(collection.map(f));");
}

#[test]
fn insertion_at_replacement_start_keeps_its_order() {
    let source = "_.map(g(), f);";
    let fix = with_insertion(replace(0, 13, "c.map(f)"), 0, "const c = g();\n");
    let out = apply_fixes(source, [&fix]);
    assert_eq!(out.text, "const c = g();\nc.map(f);");
}

#[test]
fn overlapping_fixes_keep_the_first() {
    let source = "_.map(_.map(a, f), g);";
    let outer = replace(0, 21, "OUTER");
    let inner = replace(6, 17, "INNER");
    let out = apply_fixes(source, [&inner, &outer]);
    assert_eq!(out.text, "OUTER;");
    assert_eq!(out.applied, 1);
    assert_eq!(out.skipped, 1);
}

#[test]
fn sibling_fixes_sharing_an_anchor_apply_in_source_order() {
    let source = "f(aaaa, bbbb);";
    let first = with_insertion(replace(2, 6, "x"), 0, "const x = 1;\n");
    let second = with_insertion(replace(8, 12, "y"), 0, "const y = 2;\n");
    let out = apply_fixes(source, [&second, &first]);
    assert_eq!(out.text, "const x = 1;\nconst y = 2;\nf(x, y);");
    assert_eq!(out.applied, 2);
    assert_eq!(out.skipped, 0);
}

#[test]
fn sibling_insertions_precede_a_replacement_at_the_anchor() {
    let source = "g(a).h(b);";
    let first = with_insertion(replace(0, 4, "X"), 0, "const x = 1;\n");
    let second = with_insertion(replace(7, 8, "Y"), 0, "const y = 2;\n");
    let out = apply_fixes(source, [&first, &second]);
    assert_eq!(out.text, "const x = 1;\nconst y = 2;\nX.h(Y);");
    assert_eq!(out.applied, 2);
}

#[test]
fn insertion_inside_another_replacement_is_deferred() {
    let source = "aaaa bbbb";
    let outer = replace(0, 4, "A");
    let other = with_insertion(replace(5, 9, "B"), 2, "X");
    let out = apply_fixes(source, [&other, &outer]);
    assert_eq!(out.text, "A bbbb");
    assert_eq!(out.applied, 1);
    assert_eq!(out.skipped, 1);
}

#[test]
fn adjacent_fixes_both_apply() {
    let source = "aaaabbbb";
    let first = replace(0, 4, "A");
    let second = replace(4, 8, "B");
    let out = apply_fixes(source, [&second, &first]);
    assert_eq!(out.text, "AB");
    assert_eq!(out.applied, 2);
}

#[test]
fn no_fixes_leaves_text_alone() {
    let out = apply_fixes("const a = 1;", std::iter::empty());
    assert_eq!(out.text, "const a = 1;");
    assert_eq!(out.applied, 0);
}
