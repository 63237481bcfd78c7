//! Tests for scope construction and name resolution in the binder.
use unlodash_binder::{BinderState, ContainerKind, DeclarationKind, ScopeId, Symbol};
use unlodash_parser::{NodeIndex, NodeKind, ParserState};

fn bind(source: &str) -> (ParserState, NodeIndex, BinderState) {
    let mut parser = ParserState::new("test.js", source);
    let root = parser.parse_source_file();
    assert!(
        parser.get_diagnostics().is_empty(),
        "{source}: {:?}",
        parser.get_diagnostics()
    );
    let mut binder = BinderState::new();
    binder.bind_source_file(parser.get_arena(), root);
    (parser, root, binder)
}

fn symbol<'a>(binder: &'a BinderState, scope: ScopeId, name: &str) -> &'a Symbol {
    let id = binder
        .resolve_name(scope, name)
        .unwrap_or_else(|| panic!("'{name}' should resolve"));
    binder.get_symbol(id).unwrap()
}

/// First node of `kind` in document order.
fn find_node(parser: &ParserState, kind: NodeKind, text: &str) -> NodeIndex {
    let arena = parser.get_arena();
    (0..arena.len() as u32)
        .map(NodeIndex)
        .filter(|&idx| arena.kind(idx) == Some(kind) && arena.node_text(idx) == text)
        .min_by_key(|&idx| arena.get(idx).unwrap().pos)
        .unwrap_or_else(|| panic!("no {kind:?} with text {text:?}"))
}

#[test]
fn source_file_scope_is_scope_zero() {
    let (_parser, root, binder) = bind("const a = 1;");
    let scope = binder.get_scope(ScopeId(0)).unwrap();
    assert_eq!(scope.kind, ContainerKind::SourceFile);
    assert_eq!(scope.node, root);
    assert!(scope.parent.is_none());
    assert!(scope.has("a"));
}

#[test]
fn var_is_hoisted_out_of_blocks_to_the_function() {
    let source = "function f() { if (x) { var hoisted = 1; let local = 2; } }";
    let (parser, _root, binder) = bind(source);
    let arena = parser.get_arena();
    let function = find_node(&parser, NodeKind::FunctionDeclaration, source);
    let function_scope = binder.find_enclosing_scope(arena, function);
    assert_eq!(
        binder.get_scope(function_scope).unwrap().kind,
        ContainerKind::Function
    );
    assert!(binder.get_scope(function_scope).unwrap().has("hoisted"));
    assert!(!binder.get_scope(function_scope).unwrap().has("local"));
    assert!(binder.resolve_name(function_scope, "local").is_none());
    assert!(binder.resolve_name(ScopeId(0), "hoisted").is_none());
}

#[test]
fn block_scoped_declarations_are_visible_inside_the_block() {
    let (parser, _root, binder) = bind("{ const inner = [1]; use(inner); }");
    let arena = parser.get_arena();
    let call = find_node(&parser, NodeKind::CallExpression, "use(inner)");
    let scope = binder.find_enclosing_scope(arena, call);
    assert_eq!(binder.get_scope(scope).unwrap().kind, ContainerKind::Block);
    let inner = symbol(&binder, scope, "inner");
    assert_eq!(inner.kind, DeclarationKind::Const);
    assert_eq!(inner.references.len(), 2);
}

#[test]
fn function_declarations_are_visible_before_their_position() {
    let (_parser, _root, binder) = bind("run();\nfunction run() {}");
    let run = symbol(&binder, ScopeId(0), "run");
    assert_eq!(run.kind, DeclarationKind::Function);
    assert_eq!(run.references.len(), 1);
    assert!(
        binder
            .symbols
            .iter()
            .all(|s| s.kind != DeclarationKind::ImplicitGlobal)
    );
}

#[test]
fn undeclared_names_become_implicit_globals() {
    let (_parser, _root, binder) = bind("function f() { return helper(_); }");
    for name in ["helper", "_"] {
        let global = symbol(&binder, ScopeId(0), name);
        assert_eq!(global.kind, DeclarationKind::ImplicitGlobal);
        assert!(global.declarations.is_empty());
        assert_eq!(global.references.len(), 1);
    }
}

#[test]
fn parameters_shadow_outer_bindings() {
    let source = "import _ from 'lodash';\nfunction f(_) { return _.map(a, b); }";
    let (parser, _root, binder) = bind(source);
    let arena = parser.get_arena();
    let call = find_node(&parser, NodeKind::CallExpression, "_.map(a, b)");
    let inner = symbol(&binder, binder.find_enclosing_scope(arena, call), "_");
    assert_eq!(inner.kind, DeclarationKind::Parameter);
    let outer = symbol(&binder, ScopeId(0), "_");
    assert_eq!(outer.kind, DeclarationKind::Import);
    assert!(outer.references.is_empty());
}

#[test]
fn destructured_parameters_and_defaults_are_bound() {
    let source = "function f({ a, b: [c] }, d = a, ...rest) { return c + d + rest; }";
    let (parser, _root, binder) = bind(source);
    let function = find_node(&parser, NodeKind::FunctionDeclaration, source);
    let scope = binder.find_enclosing_scope(parser.get_arena(), function);
    for name in ["a", "c", "d", "rest"] {
        assert_eq!(
            symbol(&binder, scope, name).kind,
            DeclarationKind::Parameter,
            "{name}"
        );
    }
    assert!(binder.get_scope(scope).unwrap().get("b").is_none());
    assert_eq!(symbol(&binder, scope, "a").references.len(), 1);
}

#[test]
fn catch_parameters_are_scoped_to_the_clause() {
    let (parser, _root, binder) = bind("try { f(); } catch (err) { log(err); }");
    let call = find_node(&parser, NodeKind::CallExpression, "log(err)");
    let scope = binder.find_enclosing_scope(parser.get_arena(), call);
    assert_eq!(binder.get_scope(scope).unwrap().kind, ContainerKind::Catch);
    assert_eq!(
        symbol(&binder, scope, "err").kind,
        DeclarationKind::CatchParameter
    );
    assert!(binder.resolve_name(ScopeId(0), "err").is_none());
}

#[test]
fn class_expression_names_are_only_visible_inside() {
    let source = "const C = class Named { m() { return Named; } };";
    let (parser, _root, binder) = bind(source);
    assert!(binder.resolve_name(ScopeId(0), "Named").is_none());
    let inner = find_node(&parser, NodeKind::ReturnStatement, "return Named;");
    let scope = binder.find_enclosing_scope(parser.get_arena(), inner);
    let named = symbol(&binder, scope, "Named");
    assert_eq!(named.kind, DeclarationKind::Class);
    assert_eq!(named.references.len(), 1);
}

#[test]
fn class_declarations_and_static_blocks() {
    let source = "class Box { static { var v = 1; } }";
    let (parser, _root, binder) = bind(source);
    assert_eq!(
        symbol(&binder, ScopeId(0), "Box").kind,
        DeclarationKind::Class
    );
    assert!(binder.resolve_name(ScopeId(0), "v").is_none());
    let block = find_node(&parser, NodeKind::ClassStaticBlockDeclaration, "static { var v = 1; }");
    let scope = binder.find_enclosing_scope(parser.get_arena(), block);
    assert_eq!(
        binder.get_scope(scope).unwrap().kind,
        ContainerKind::StaticBlock
    );
    assert!(binder.get_scope(scope).unwrap().has("v"));
}

#[test]
fn for_heads_get_their_own_scope() {
    let (parser, _root, binder) = bind("for (let i = 0; i < 3; i++) { use(i); }\nuse(i);");
    assert_eq!(
        symbol(&binder, ScopeId(0), "i").kind,
        DeclarationKind::ImplicitGlobal
    );
    let call = find_node(&parser, NodeKind::CallExpression, "use(i)");
    let scope = binder.find_enclosing_scope(parser.get_arena(), call);
    assert_eq!(symbol(&binder, scope, "i").kind, DeclarationKind::Let);
}

#[test]
fn mutability_follows_declaration_kind() {
    let source = "import a from 'a';\nconst b = 1;\nlet c = 2;\nvar d = 3;\nfunction e() {}";
    let (_parser, _root, binder) = bind(source);
    let mutable: Vec<bool> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|name| symbol(&binder, ScopeId(0), name).is_mutable())
        .collect();
    assert_eq!(mutable, vec![false, false, true, true, true]);
}

#[test]
fn initializer_is_recorded_for_simple_declarators_only() {
    let (parser, _root, binder) = bind("const xs = [1, 2];\nconst { y } = obj;\nlet z;");
    let xs = symbol(&binder, ScopeId(0), "xs");
    assert_eq!(parser.get_arena().node_text(xs.initializer), "[1, 2]");
    assert!(symbol(&binder, ScopeId(0), "y").initializer.is_none());
    assert!(symbol(&binder, ScopeId(0), "z").initializer.is_none());
}

#[test]
fn scope_tables_keep_declaration_order() {
    let (_parser, _root, binder) = bind("let b; const a = 1; function c() {} var d;");
    let names: Vec<&str> = binder
        .get_scope(ScopeId(0))
        .unwrap()
        .table
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(names, vec!["b", "a", "c", "d"]);
}

#[test]
fn redeclared_var_merges_into_one_symbol() {
    let (_parser, _root, binder) = bind("var x = 1;\nvar x = 2;");
    let x = symbol(&binder, ScopeId(0), "x");
    assert_eq!(x.declarations.len(), 2);
    assert_eq!(
        binder.symbols.iter().filter(|s| s.name == "x").count(),
        1
    );
}

#[test]
fn rebinding_resets_previous_state() {
    let mut binder = BinderState::new();
    let mut parser = ParserState::new("a.js", "const first = 1;");
    let root = parser.parse_source_file();
    binder.bind_source_file(parser.get_arena(), root);
    let mut parser = ParserState::new("b.js", "const second = 2;");
    let root = parser.parse_source_file();
    binder.bind_source_file(parser.get_arena(), root);
    assert!(binder.resolve_name(ScopeId(0), "first").is_none());
    assert!(binder.resolve_name(ScopeId(0), "second").is_some());
}
