use std::rc::Rc;

use esdown_ast::node::NodeRef;
use esdown_ast::{NodeFactory, Printer};
use esdown_common::options::TransformOptions;
use esdown_transform::resolver::NullResolver;
use esdown_transform::{transform_source_file, TransformResult};

fn transform(file: &NodeRef) -> TransformResult {
    transform_source_file(TransformOptions::es5(), Rc::new(NullResolver), file)
}

fn emit(file: &NodeRef) -> String {
    let result = transform(file);
    assert!(result.diagnostics.is_empty());
    Printer::with_substitutions(&result.substitutions).print(&result.file)
}

#[test]
fn test_call_with_mixed_spread_arguments() {
    let fact = NodeFactory::new();
    // f(1, ...xs, 2)
    let call = fact.call(
        fact.ident("f"),
        vec![
            fact.number("1"),
            fact.spread(fact.ident("xs")),
            fact.number("2"),
        ],
    );
    let file = fact.source_file("test.js", "", vec![fact.expr_stmt(call)]);
    let output = emit(&file);

    assert!(
        output.contains("f.apply(void 0, [1].concat(xs, [2]));"),
        "got: {output}"
    );
}

#[test]
fn test_call_with_single_spread_passes_array_through() {
    let fact = NodeFactory::new();
    let call = fact.call(fact.ident("f"), vec![fact.spread(fact.ident("xs"))]);
    let file = fact.source_file("test.js", "", vec![fact.expr_stmt(call)]);
    let output = emit(&file);

    assert!(output.contains("f.apply(void 0, xs);"), "got: {output}");
}

#[test]
fn test_method_call_spread_uses_receiver_as_this() {
    let fact = NodeFactory::new();
    // obj.m(...xs)
    let call = fact.call(
        fact.prop(fact.ident("obj"), "m"),
        vec![fact.spread(fact.ident("xs"))],
    );
    let file = fact.source_file("test.js", "", vec![fact.expr_stmt(call)]);
    let output = emit(&file);

    assert!(
        output.contains("obj.m.apply(obj, xs);"),
        "got: {output}"
    );
}

#[test]
fn test_complex_receiver_is_hoisted_to_temp() {
    let fact = NodeFactory::new();
    // get().m(...xs)
    let call = fact.call(
        fact.prop(fact.call(fact.ident("get"), vec![]), "m"),
        vec![fact.spread(fact.ident("xs"))],
    );
    let file = fact.source_file("test.js", "", vec![fact.expr_stmt(call)]);
    let output = emit(&file);

    assert!(output.contains("var _a;"), "Temp is hoisted: {output}");
    assert!(
        output.contains("(_a = get(), _a.m.apply(_a, xs));"),
        "got: {output}"
    );
}

#[test]
fn test_new_with_spread() {
    let fact = NodeFactory::new();
    // new F(...xs)
    let new_expr = fact.new_expr(fact.ident("F"), vec![fact.spread(fact.ident("xs"))]);
    let file = fact.source_file("test.js", "", vec![fact.expr_stmt(new_expr)]);
    let output = emit(&file);

    assert!(
        output.contains("new (F.bind.apply(F, [void 0].concat(xs)))();"),
        "got: {output}"
    );
}

#[test]
fn test_array_literal_with_lone_spread_takes_fresh_copy() {
    let fact = NodeFactory::new();
    let array = fact.array(vec![fact.spread(fact.ident("xs"))]);
    let stmt = fact.var_statement(vec![fact.var_decl_named("copy", Some(array))]);
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(output.contains("var copy = xs.slice();"), "got: {output}");
}

#[test]
fn test_array_literal_spread_segmentation() {
    let fact = NodeFactory::new();
    // [a, ...xs, b]
    let array = fact.array(vec![
        fact.ident("a"),
        fact.spread(fact.ident("xs")),
        fact.ident("b"),
    ]);
    let stmt = fact.expr_stmt(fact.assign(fact.ident("out"), array));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(
        output.contains("out = [a].concat(xs, [b]);"),
        "got: {output}"
    );
}

#[test]
fn test_super_method_call_with_spread() {
    let fact = NodeFactory::new();
    let method_body = fact.block(vec![fact.ret(Some(fact.call(
        fact.prop(fact.super_expr(), "m"),
        vec![fact.spread(fact.ident("args"))],
    )))]);
    let method = fact.method(fact.ident("m"), vec![], method_body);
    let class = fact.class_decl(fact.ident("C"), Some(fact.ident("B")), vec![method]);
    let file = fact.source_file("test.js", "", vec![class]);
    let output = emit(&file);

    assert!(
        output.contains("return _super.prototype.m.apply(this, args);"),
        "got: {output}"
    );
}

#[test]
fn test_super_call_with_spread_in_constructor() {
    let fact = NodeFactory::new();
    let ctor_body = fact.block(vec![fact.expr_stmt(fact.call(
        fact.super_expr(),
        vec![fact.spread(fact.ident("args"))],
    ))]);
    let ctor = fact.constructor_decl(
        vec![fact.parameter_with(fact.ident("args"), None, true)],
        ctor_body,
    );
    let class = fact.class_decl(fact.ident("C"), Some(fact.ident("B")), vec![ctor]);
    let file = fact.source_file("test.js", "", vec![class]);
    let output = emit(&file);

    assert!(
        output.contains("_super.apply(this, args);"),
        "got: {output}"
    );
}

#[test]
fn test_evaluation_order_is_left_to_right() {
    let fact = NodeFactory::new();
    // f(a(), ...b(), c())
    let call = fact.call(
        fact.ident("f"),
        vec![
            fact.call(fact.ident("a"), vec![]),
            fact.spread(fact.call(fact.ident("b"), vec![])),
            fact.call(fact.ident("c"), vec![]),
        ],
    );
    let file = fact.source_file("test.js", "", vec![fact.expr_stmt(call)]);
    let output = emit(&file);

    let a = output.find("a()").expect("a() in output");
    let b = output.find("b()").expect("b() in output");
    let c = output.find("c()").expect("c() in output");
    assert!(a < b && b < c, "got: {output}");
}
