//! End-to-end resolution behavior over hand-built trees
mod common;

use common::*;
use marv_resolver::diagnostic::error_codes;
use marv_resolver::{
    resolve, DeclKind, Diagnostic, DiagnosticLevel, DiagnosticSink, Registry, Resolver,
    ResolverOptions, VarKind, DEFAULT_INTRINSICS,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Single declarations
// ============================================================================

#[test]
fn test_single_declaration_reaches_every_nested_use() {
    // var x; x; { x; { x; } } function f() { x; }
    let mut t = Tree::new();
    let body = vec![
        t.var("x"),
        t.use_stmt("x"),
        {
            let inner = vec![t.use_stmt("x")];
            let nested = t.block(inner);
            let outer = vec![t.use_stmt("x"), nested];
            t.block(outer)
        },
        {
            let inner = vec![t.use_stmt("x")];
            t.function_decl("f", &[], inner)
        },
    ];
    let program = t.program(body);

    let resolution = resolve(program);
    assert!(resolution.diagnostics.is_empty());

    let declared = &bindings_of(&resolution.program, "x")[0];
    let uses = uses_of(&resolution.program, "x");
    assert_eq!(uses.len(), 4);
    for use_ in &uses {
        assert_eq!(use_.canonical(), declared.id);
        let decl = resolution.declaration_of(use_).unwrap();
        assert_eq!(decl.kind, DeclKind::Var);
        assert_eq!(decl.span, declared.span);
    }
}

#[test]
fn test_declared_identifier_records_declaration_and_scope() {
    let mut t = Tree::new();
    let body = vec![t.let_("y")];
    let program = t.program(body);

    let resolution = resolve(program);
    let y = &bindings_of(&resolution.program, "y")[0];

    let decl = y.declaration().expect("binding records its declaration");
    assert_eq!(resolution.registry[decl].name.as_str(), "y");
    assert!(y.owning_scope().is_some());
    assert!(!y.is_unified());
}

#[test]
fn test_var_in_block_is_hoisted_to_function_scope() {
    // { var y; } y;
    let mut t = Tree::new();
    let inner = vec![t.var("y")];
    let body = vec![t.block(inner), t.use_stmt("y")];
    let program = t.program(body);

    let resolution = resolve(program);
    assert!(resolution.diagnostics.is_empty());
    let declared = &bindings_of(&resolution.program, "y")[0];
    assert_eq!(uses_of(&resolution.program, "y")[0].canonical(), declared.id);
}

#[test]
fn test_let_in_block_is_not_hoisted() {
    // { let y; } y;
    let mut t = Tree::new();
    let inner = vec![t.let_("y")];
    let body = vec![t.block(inner), t.use_stmt("y")];
    let program = t.program(body);

    let resolution = resolve(program);
    assert_eq!(codes(&resolution), vec![error_codes::UNRESOLVED_IDENTIFIER]);
}

#[test]
fn test_outer_let_visible_in_nested_function() {
    // function f() { let z; function g() { z; } }
    let mut t = Tree::new();
    let g_body = vec![t.use_stmt("z")];
    let f_body = vec![t.let_("z"), t.function_decl("g", &[], g_body)];
    let body = vec![t.function_decl("f", &[], f_body)];
    let program = t.program(body);

    let resolution = resolve(program);
    assert!(resolution.diagnostics.is_empty());
    let declared = &bindings_of(&resolution.program, "z")[0];
    assert_eq!(uses_of(&resolution.program, "z")[0].canonical(), declared.id);
}

#[test]
fn test_initializer_sees_enclosing_binding() {
    // var x; function f() { var x = x; }
    let mut t = Tree::new();
    let init = t.use_("x");
    let f_body = vec![t.decl(VarKind::Var, "x", Some(init))];
    let body = vec![t.var("x"), t.function_decl("f", &[], f_body)];
    let program = t.program(body);

    let resolution = resolve(program);
    assert!(resolution.diagnostics.is_empty());

    let bindings = bindings_of(&resolution.program, "x");
    let outer = &bindings[0];
    let inner = &bindings[1];
    assert_eq!(uses_of(&resolution.program, "x")[0].canonical(), outer.id);
    assert_ne!(inner.canonical(), outer.canonical());
}

#[test]
fn test_function_name_resolves_after_declaration() {
    // function f() {} f();
    let mut t = Tree::new();
    let decl = t.function_decl("f", &[], vec![]);
    let call = t.call("f", vec![]);
    let body = vec![decl, t.expr(call)];
    let program = t.program(body);

    let resolution = resolve(program);
    assert!(resolution.diagnostics.is_empty());
    let f = &uses_of(&resolution.program, "f")[0];
    assert_eq!(resolution.declaration_of(f).unwrap().kind, DeclKind::Function);
}

#[test]
fn test_member_property_is_not_a_use() {
    // Object.keys;
    let mut t = Tree::new();
    let object = t.use_("Object");
    let member = t.member(object, "keys");
    let body = vec![t.expr(member)];
    let program = t.program(body);

    let resolution = resolve(program);
    assert!(resolution.diagnostics.is_empty());
}

// ============================================================================
// Block and catch scoping
// ============================================================================

#[test]
fn test_block_declaration_invisible_outside() {
    // var x = 1; { let x = 2; x; } x;
    let mut t = Tree::new();
    let one = t.num(1.0);
    let outer_decl = t.decl(VarKind::Var, "x", Some(one));
    let two = t.num(2.0);
    let inner = vec![t.decl(VarKind::Let, "x", Some(two)), t.use_stmt("x")];
    let block = t.block(inner);
    let body = vec![outer_decl, block, t.use_stmt("x")];
    let program = t.program(body);

    let resolution = resolve(program);
    assert!(resolution.diagnostics.is_empty());

    let bindings = bindings_of(&resolution.program, "x");
    let uses = uses_of(&resolution.program, "x");
    assert_eq!(uses[0].canonical(), bindings[1].id);
    assert_eq!(resolution.declaration_of(&uses[0]).unwrap().kind, DeclKind::Let);
    assert_eq!(uses[1].canonical(), bindings[0].id);
    assert_eq!(resolution.declaration_of(&uses[1]).unwrap().kind, DeclKind::Var);
}

#[test]
fn test_catch_parameter_visible_only_in_catch_block() {
    // try {} catch (e) { e; } e;
    let mut t = Tree::new();
    let handler = vec![t.use_stmt("e")];
    let try_stmt = t.try_catch(vec![], "e", handler);
    let body = vec![try_stmt, t.use_stmt("e")];
    let program = t.program(body);

    let resolution = resolve(program);
    let param = &bindings_of(&resolution.program, "e")[0];
    let uses = uses_of(&resolution.program, "e");

    assert_eq!(uses[0].canonical(), param.id);
    assert_eq!(resolution.declaration_of(&uses[0]).unwrap().kind, DeclKind::Catch);
    assert!(!uses[1].is_unified());
    assert_eq!(codes(&resolution), vec![error_codes::UNRESOLVED_IDENTIFIER]);
    assert_eq!(resolution.diagnostics[0].span, uses[1].span);
}

#[test]
fn test_catch_parameter_shadows_outer_declaration() {
    // var e; try {} catch (e) { e; } e;
    let mut t = Tree::new();
    let outer = t.var("e");
    let handler = vec![t.use_stmt("e")];
    let try_stmt = t.try_catch(vec![], "e", handler);
    let body = vec![outer, try_stmt, t.use_stmt("e")];
    let program = t.program(body);

    let resolution = resolve(program);
    assert!(resolution.diagnostics.is_empty());

    let bindings = bindings_of(&resolution.program, "e");
    let uses = uses_of(&resolution.program, "e");
    assert_eq!(uses[0].canonical(), bindings[1].id);
    assert_eq!(uses[1].canonical(), bindings[0].id);
}

// ============================================================================
// Functions, parameters and `arguments`
// ============================================================================

#[test]
fn test_parameter_shadows_outer_variable() {
    // var a; function f(a) { a; }
    let mut t = Tree::new();
    let f_body = vec![t.use_stmt("a")];
    let body = vec![t.var("a"), t.function_decl("f", &["a"], f_body)];
    let program = t.program(body);

    let resolution = resolve(program);
    assert!(resolution.diagnostics.is_empty());

    let bindings = bindings_of(&resolution.program, "a");
    let use_ = &uses_of(&resolution.program, "a")[0];
    assert_eq!(use_.canonical(), bindings[1].id);
    assert_eq!(resolution.declaration_of(use_).unwrap().kind, DeclKind::Argument);
}

#[test]
fn test_parameter_visible_in_nested_block_of_body() {
    // var a; function f(a) { { a; } }
    let mut t = Tree::new();
    let inner = vec![t.use_stmt("a")];
    let f_body = vec![t.block(inner)];
    let body = vec![t.var("a"), t.function_decl("f", &["a"], f_body)];
    let program = t.program(body);

    let resolution = resolve(program);
    let param = &bindings_of(&resolution.program, "a")[1];
    assert_eq!(uses_of(&resolution.program, "a")[0].canonical(), param.id);
}

#[test]
fn test_arguments_is_implicit_in_every_function() {
    // var arguments; function f() { arguments; }
    let mut t = Tree::new();
    let f_body = vec![t.use_stmt("arguments")];
    let body = vec![t.var("arguments"), t.function_decl("f", &[], f_body)];
    let program = t.program(body);

    let resolution = resolve(program);
    assert!(resolution.diagnostics.is_empty());

    let use_ = &uses_of(&resolution.program, "arguments")[0];
    let decl = resolution.declaration_of(use_).unwrap();
    assert_eq!(decl.kind, DeclKind::Auto);
    let outer = &bindings_of(&resolution.program, "arguments")[0];
    assert_ne!(use_.canonical(), outer.id);
}

#[test]
fn test_arguments_outside_function_is_unresolved() {
    let mut t = Tree::new();
    let body = vec![t.use_stmt("arguments")];
    let program = t.program(body);

    let resolution = resolve(program);
    assert_eq!(codes(&resolution), vec![error_codes::UNRESOLVED_IDENTIFIER]);
}

#[test]
fn test_duplicate_parameters_last_one_wins() {
    // function f(a, a) { return a; }
    let mut t = Tree::new();
    let value = t.use_("a");
    let f_body = vec![t.ret(value)];
    let body = vec![t.function_decl("f", &["a", "a"], f_body)];
    let program = t.program(body);

    let resolution = resolve(program);
    assert!(resolution.diagnostics.is_empty());

    let params = bindings_of(&resolution.program, "a");
    let arguments: Vec<_> = resolution
        .registry
        .iter()
        .filter(|(_, d)| d.name.as_str() == "a" && d.kind == DeclKind::Argument)
        .collect();
    assert_eq!(arguments.len(), 2);
    assert_eq!(uses_of(&resolution.program, "a")[0].canonical(), params[1].id);
}

#[test]
fn test_function_expression_shares_function_handling() {
    // var h = function (b) { return b; }; b;
    let mut t = Tree::new();
    let value = t.use_("b");
    let ret = vec![t.ret(value)];
    let func = t.function(None, &["b"], ret);
    let decl = t.decl(VarKind::Var, "h", Some(marv_resolver::ast::Expr::Function(func)));
    let body = vec![decl, t.use_stmt("b")];
    let program = t.program(body);

    let resolution = resolve(program);
    let param = &bindings_of(&resolution.program, "b")[0];
    let uses = uses_of(&resolution.program, "b");
    assert_eq!(uses[0].canonical(), param.id);
    assert!(!uses[1].is_unified());
    assert_eq!(codes(&resolution), vec![error_codes::UNRESOLVED_IDENTIFIER]);
}

// ============================================================================
// Redefinitions
// ============================================================================

#[test]
fn test_two_vars_merge_with_one_advisory() {
    // var x; var x; x;
    let mut t = Tree::new();
    let body = vec![t.var("x"), t.var("x"), t.use_stmt("x")];
    let program = t.program(body);

    let resolution = resolve(program);
    assert_eq!(codes(&resolution), vec![error_codes::VARIABLE_REDEFINITION]);
    assert!(!resolution.has_errors());

    let bindings = bindings_of(&resolution.program, "x");
    assert_eq!(bindings[1].canonical(), bindings[0].id);
    assert_eq!(uses_of(&resolution.program, "x")[0].canonical(), bindings[0].id);
    // only the first declarator was registered
    assert_eq!(resolution.registry.len(), DEFAULT_INTRINSICS.len() + 1);
}

#[test]
fn test_const_then_var_is_fatal_and_references_both_locations() {
    // const c = 1; var c = 2;
    let mut t = Tree::new();
    let one = t.num(1.0);
    let first = t.decl(VarKind::Const, "c", Some(one));
    let two = t.num(2.0);
    let second = t.decl(VarKind::Var, "c", Some(two));
    let program = t.program(vec![first, second]);

    let resolution = resolve(program);
    assert_eq!(codes(&resolution), vec![error_codes::CONSTANT_REDEFINITION]);
    assert!(resolution.has_errors());

    let bindings = bindings_of(&resolution.program, "c");
    let diag = &resolution.diagnostics[0];
    assert_eq!(diag.level, DiagnosticLevel::Error);
    assert!(diag.message.contains("'c'"));
    assert_eq!(diag.span, bindings[1].span);
    assert_eq!(diag.related[0].span, bindings[0].span);
    assert_eq!(bindings[1].canonical(), bindings[0].id);
}

#[test]
fn test_redefining_an_intrinsic_is_fatal() {
    // var Object;
    let mut t = Tree::new();
    let body = vec![t.var("Object")];
    let program = t.program(body);

    let resolution = resolve(program);
    assert_eq!(codes(&resolution), vec![error_codes::CONSTANT_REDEFINITION]);
    assert_eq!(resolution.diagnostics[0].related[0].file, "<intrinsic>");
}

#[test]
fn test_function_name_colliding_with_var() {
    // var f; function f() {}
    let mut t = Tree::new();
    let body = vec![t.var("f"), t.function_decl("f", &[], vec![])];
    let program = t.program(body);

    let resolution = resolve(program);
    assert_eq!(codes(&resolution), vec![error_codes::VARIABLE_REDEFINITION]);
    let bindings = bindings_of(&resolution.program, "f");
    assert_eq!(bindings[1].canonical(), bindings[0].id);
}

#[test]
fn test_diagnostics_never_stop_the_pass() {
    // const a; var a; b;
    let mut t = Tree::new();
    let body = vec![t.const_("a"), t.var("a"), t.use_stmt("b")];
    let program = t.program(body);

    let resolution = resolve(program);
    assert_eq!(
        codes(&resolution),
        vec![
            error_codes::CONSTANT_REDEFINITION,
            error_codes::UNRESOLVED_IDENTIFIER
        ]
    );
    assert_eq!(resolution.errors().count(), 1);
    assert_eq!(resolution.warnings().count(), 1);
}

// ============================================================================
// Unresolved identifiers
// ============================================================================

#[test]
fn test_unresolved_identifier_reported_once_and_left_unbound() {
    let mut t = Tree::new();
    let body = vec![t.use_stmt("doesNotExist")];
    let program = t.program(body);

    let resolution = resolve(program);
    assert_eq!(resolution.diagnostics.len(), 1);

    let use_ = &uses_of(&resolution.program, "doesNotExist")[0];
    let diag = &resolution.diagnostics[0];
    assert_eq!(diag.level, DiagnosticLevel::Warning);
    assert_eq!(diag.code, error_codes::UNRESOLVED_IDENTIFIER);
    assert!(diag.message.contains("doesNotExist"));
    assert_eq!(diag.span, use_.span);
    assert!(!use_.is_unified());
    assert!(resolution.declaration_of(use_).is_none());
}

#[test]
fn test_intrinsics_resolve_without_declaration() {
    // require(exports);
    let mut t = Tree::new();
    let arg = t.use_("exports");
    let call = t.call("require", vec![arg]);
    let body = vec![t.expr(call)];
    let program = t.program(body);

    let resolution = resolve(program);
    assert!(resolution.diagnostics.is_empty());
    let require = &uses_of(&resolution.program, "require")[0];
    assert_eq!(resolution.declaration_of(require).unwrap().kind, DeclKind::Const);
}

#[test]
fn test_custom_intrinsics() {
    let mut t = Tree::new();
    let body = vec![t.use_stmt("window"), t.use_stmt("Object")];
    let program = t.program(body);

    let resolver = Resolver::with_options(ResolverOptions {
        intrinsics: vec![n("window")],
        ..ResolverOptions::default()
    });
    let resolution = resolver.resolve(program);

    assert_eq!(codes(&resolution), vec![error_codes::UNRESOLVED_IDENTIFIER]);
    assert!(resolution.diagnostics[0].message.contains("Object"));
}

// ============================================================================
// Driver surface
// ============================================================================

#[derive(Default)]
struct CountingSink {
    errors: usize,
    warnings: usize,
}

impl DiagnosticSink for CountingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            DiagnosticLevel::Error => self.errors += 1,
            DiagnosticLevel::Warning => self.warnings += 1,
        }
    }
}

#[test]
fn test_resolve_with_custom_sink() {
    let mut t = Tree::new();
    let body = vec![t.const_("k"), t.let_("k"), t.use_stmt("nope")];
    let program = t.program(body);

    let mut sink = CountingSink::default();
    let registry: Registry = Resolver::new().resolve_with_sink(&program, &mut sink);

    assert_eq!(sink.errors, 1);
    assert_eq!(sink.warnings, 1);
    assert_eq!(registry.len(), DEFAULT_INTRINSICS.len() + 1);
}

#[test]
fn test_tree_shape_is_preserved() {
    let mut t = Tree::new();
    let f_body = vec![t.use_stmt("p")];
    let body = vec![t.var("x"), t.function_decl("f", &["p"], f_body)];
    let program = t.program(body);
    let before: Vec<_> = identifiers(&program)
        .iter()
        .map(|i| (i.id, i.name.clone(), i.span))
        .collect();

    let resolution = resolve(program);
    let after: Vec<_> = identifiers(&resolution.program)
        .iter()
        .map(|i| (i.id, i.name.clone(), i.span))
        .collect();
    assert_eq!(before, after);
}
