use std::rc::Rc;

use esdown_ast::flags::NodeFlags;
use esdown_ast::node::NodeRef;
use esdown_ast::{NodeFactory, Printer};
use esdown_common::options::TransformOptions;
use esdown_transform::resolver::{NodeCheckFlags, NullResolver, StaticResolver};
use esdown_transform::{transform_source_file, TransformResult};

fn transform(file: &NodeRef) -> TransformResult {
    transform_source_file(TransformOptions::es5(), Rc::new(NullResolver), file)
}

fn emit(result: &TransformResult) -> String {
    Printer::with_substitutions(&result.substitutions).print(&result.file)
}

#[test]
fn test_let_becomes_var() {
    let fact = NodeFactory::new();
    let list = fact.var_declaration_list(
        NodeFlags::LET,
        vec![fact.var_decl_named("x", Some(fact.number("1")))],
    );
    let file = fact.source_file("test.js", "", vec![fact.var_stmt(list)]);
    let output = emit(&transform(&file));

    assert!(output.contains("var x = 1;"), "got: {output}");
    assert!(!output.contains("let"), "got: {output}");
}

#[test]
fn test_const_becomes_var() {
    let fact = NodeFactory::new();
    let list = fact.var_declaration_list(
        NodeFlags::CONST,
        vec![fact.var_decl_named("K", Some(fact.number("7")))],
    );
    let file = fact.source_file("test.js", "", vec![fact.var_stmt(list)]);
    let output = emit(&transform(&file));

    assert!(output.contains("var K = 7;"), "got: {output}");
    assert!(!output.contains("const"), "got: {output}");
}

#[test]
fn test_loop_captured_binding_gets_void_0_initializer() {
    let fact = NodeFactory::new();
    let decl = fact.var_decl_named("captured", None);
    let list = fact.var_declaration_list(NodeFlags::LET, vec![Rc::clone(&decl)]);
    let body = fact.block(vec![fact.var_stmt(list)]);
    let loop_stmt = fact.while_stmt(fact.true_lit(), body);
    let file = fact.source_file("test.js", "", vec![loop_stmt]);

    let mut resolver = StaticResolver::new();
    resolver.set_check_flags(&decl, NodeCheckFlags::BLOCK_SCOPED_BINDING_IN_LOOP);

    let result = transform_source_file(TransformOptions::es5(), Rc::new(resolver), &file);
    let output = emit(&result);
    assert!(
        output.contains("var captured = void 0;"),
        "got: {output}"
    );
}

#[test]
fn test_unmarked_binding_keeps_no_initializer() {
    let fact = NodeFactory::new();
    let list = fact.var_declaration_list(
        NodeFlags::LET,
        vec![fact.var_decl_named("plain", None)],
    );
    let file = fact.source_file("test.js", "", vec![fact.var_stmt(list)]);
    let output = emit(&transform(&file));

    assert!(output.contains("var plain;"), "got: {output}");
    assert!(!output.contains("void 0"), "got: {output}");
}

#[test]
fn test_for_in_head_binding_is_not_initialized() {
    let fact = NodeFactory::new();
    let decl = fact.var_decl_named("k", None);
    let head = fact.var_declaration_list(NodeFlags::LET, vec![Rc::clone(&decl)]);
    let loop_stmt = fact.for_in(head, fact.ident("obj"), fact.block(vec![]));
    let file = fact.source_file("test.js", "", vec![loop_stmt]);

    // Even when the resolver marks the binding, the loop's own head
    // binding keeps its shape.
    let mut resolver = StaticResolver::new();
    resolver.set_check_flags(&decl, NodeCheckFlags::BLOCK_SCOPED_BINDING_IN_LOOP);

    let result = transform_source_file(TransformOptions::es5(), Rc::new(resolver), &file);
    let output = emit(&result);
    assert!(output.contains("for (var k in obj)"), "got: {output}");
    assert!(!output.contains("void 0"), "got: {output}");
}

#[test]
fn test_nested_redeclaration_is_renamed() {
    let fact = NodeFactory::new();
    // var x = 1; { let x = 2; use(x); }
    let outer = fact.var_statement(vec![fact.var_decl_named("x", Some(fact.number("1")))]);

    let inner_decl = fact.var_decl_named("x", Some(fact.number("2")));
    let inner_list = fact.var_declaration_list(NodeFlags::LET, vec![Rc::clone(&inner_decl)]);
    let reference = fact.ident("x");
    let use_stmt = fact.expr_stmt(fact.call(fact.ident("use"), vec![Rc::clone(&reference)]));
    let block = fact.block(vec![fact.var_stmt(inner_list), use_stmt]);
    let file = fact.source_file("test.js", "", vec![outer, block]);

    let mut resolver = StaticResolver::new();
    resolver.add_nested_redeclaration(&inner_decl);
    resolver.add_reference(&reference, &inner_decl);

    let result = transform_source_file(TransformOptions::es5(), Rc::new(resolver), &file);
    let output = emit(&result);

    assert!(output.contains("var x = 1;"), "got: {output}");
    assert!(
        output.contains("var x_1 = 2;"),
        "Declaration renamed: {output}"
    );
    assert!(output.contains("use(x_1);"), "Reference renamed: {output}");
}

#[test]
fn test_for_of_scenario_with_identifier_rhs() {
    let fact = NodeFactory::new();
    // for (let x of arr) { log(x); }
    let head = fact.var_declaration_list(
        NodeFlags::LET,
        vec![fact.var_decl_named("x", None)],
    );
    let body = fact.block(vec![fact.expr_stmt(fact.call(
        fact.ident("log"),
        vec![fact.ident("x")],
    ))]);
    let loop_stmt = fact.for_of(head, fact.ident("arr"), body);
    let file = fact.source_file("test.js", "", vec![loop_stmt]);
    let output = emit(&transform(&file));

    assert!(
        output.contains("for (var _i = 0; _i < arr.length; _i++) {"),
        "Identifier RHS is reused directly: {output}"
    );
    assert!(output.contains("var x = arr[_i];"), "got: {output}");
    assert!(output.contains("log(x);"), "got: {output}");
}

#[test]
fn test_for_of_with_complex_rhs_captures_it() {
    let fact = NodeFactory::new();
    let head = fact.var_declaration_list(
        NodeFlags::LET,
        vec![fact.var_decl_named("x", None)],
    );
    let loop_stmt = fact.for_of(
        head,
        fact.call(fact.ident("items"), vec![]),
        fact.block(vec![]),
    );
    let file = fact.source_file("test.js", "", vec![loop_stmt]);
    let output = emit(&transform(&file));

    assert!(
        output.contains("for (var _i = 0, _a = items(); _i < _a.length; _i++) {"),
        "got: {output}"
    );
    assert!(output.contains("var x = _a[_i];"), "got: {output}");
}

#[test]
fn test_for_of_with_expression_lhs() {
    let fact = NodeFactory::new();
    // for (box.value of arr) { }
    let loop_stmt = fact.for_of(
        fact.prop(fact.ident("box"), "value"),
        fact.ident("arr"),
        fact.block(vec![]),
    );
    let file = fact.source_file("test.js", "", vec![loop_stmt]);
    let output = emit(&transform(&file));

    assert!(
        output.contains("box.value = arr[_i];"),
        "got: {output}"
    );
}

#[test]
fn test_for_of_single_statement_body_becomes_block() {
    let fact = NodeFactory::new();
    let head = fact.var_declaration_list(
        NodeFlags::LET,
        vec![fact.var_decl_named("x", None)],
    );
    let body = fact.expr_stmt(fact.call(fact.ident("log"), vec![fact.ident("x")]));
    let loop_stmt = fact.for_of(head, fact.ident("arr"), body);
    let file = fact.source_file("test.js", "", vec![loop_stmt]);
    let output = emit(&transform(&file));

    assert!(
        output.contains(") {"),
        "Body is always a block: {output}"
    );
    assert!(output.contains("var x = arr[_i];"), "got: {output}");
}
