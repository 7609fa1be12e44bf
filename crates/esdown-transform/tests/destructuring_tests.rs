use std::rc::Rc;

use esdown_ast::flags::NodeFlags;
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

fn let_decl(fact: &NodeFactory, name: NodeRef, init: NodeRef) -> NodeRef {
    let decl = fact.var_decl(name, Some(init));
    let list = fact.var_declaration_list(NodeFlags::LET, vec![decl]);
    fact.var_stmt(list)
}

#[test]
fn test_object_pattern_declaration() {
    let fact = NodeFactory::new();
    // let {a, b} = obj;
    let pattern = fact.object_binding_pattern(vec![
        fact.binding_element(None, fact.ident("a"), None),
        fact.binding_element(None, fact.ident("b"), None),
    ]);
    let stmt = let_decl(&fact, pattern, fact.ident("obj"));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(
        output.contains("var a = obj.a, b = obj.b;"),
        "got: {output}"
    );
}

#[test]
fn test_renamed_object_pattern_binding() {
    let fact = NodeFactory::new();
    // let {key: local} = obj;
    let pattern = fact.object_binding_pattern(vec![fact.binding_element(
        Some(fact.ident("key")),
        fact.ident("local"),
        None,
    )]);
    let stmt = let_decl(&fact, pattern, fact.ident("obj"));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(output.contains("var local = obj.key;"), "got: {output}");
}

#[test]
fn test_single_element_pattern_reads_value_once() {
    let fact = NodeFactory::new();
    // let {a} = make();
    let pattern = fact.object_binding_pattern(vec![fact.binding_element(
        None,
        fact.ident("a"),
        None,
    )]);
    let stmt = let_decl(&fact, pattern, fact.call(fact.ident("make"), vec![]));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(output.contains("var a = make().a;"), "got: {output}");
}

#[test]
fn test_multi_element_pattern_binds_complex_value_to_temp() {
    let fact = NodeFactory::new();
    // let {a, b} = make();
    let pattern = fact.object_binding_pattern(vec![
        fact.binding_element(None, fact.ident("a"), None),
        fact.binding_element(None, fact.ident("b"), None),
    ]);
    let stmt = let_decl(&fact, pattern, fact.call(fact.ident("make"), vec![]));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(
        output.contains("var _a = make(), a = _a.a, b = _a.b;"),
        "got: {output}"
    );
}

#[test]
fn test_default_value_short_circuits() {
    let fact = NodeFactory::new();
    // let {a = 1} = obj;
    let pattern = fact.object_binding_pattern(vec![fact.binding_element(
        None,
        fact.ident("a"),
        Some(fact.number("1")),
    )]);
    let stmt = let_decl(&fact, pattern, fact.ident("obj"));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(
        output.contains("var _a = obj.a, a = _a === void 0 ? 1 : _a;"),
        "got: {output}"
    );
}

#[test]
fn test_array_pattern_with_rest() {
    let fact = NodeFactory::new();
    // let [x, ...rest] = xs;
    let pattern = fact.array_binding_pattern(vec![
        fact.binding_element(None, fact.ident("x"), None),
        fact.rest_binding_element(fact.ident("rest")),
    ]);
    let stmt = let_decl(&fact, pattern, fact.ident("xs"));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(
        output.contains("var x = xs[0], rest = xs.slice(1);"),
        "got: {output}"
    );
}

#[test]
fn test_nested_patterns() {
    let fact = NodeFactory::new();
    // let {p: [x, y]} = obj;
    let inner = fact.array_binding_pattern(vec![
        fact.binding_element(None, fact.ident("x"), None),
        fact.binding_element(None, fact.ident("y"), None),
    ]);
    let pattern = fact.object_binding_pattern(vec![fact.binding_element(
        Some(fact.ident("p")),
        inner,
        None,
    )]);
    let stmt = let_decl(&fact, pattern, fact.ident("obj"));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(
        output.contains("var _a = obj.p, x = _a[0], y = _a[1];"),
        "got: {output}"
    );
}

#[test]
fn test_destructuring_assignment_statement() {
    let fact = NodeFactory::new();
    // ({a} = obj);
    let target = fact.object(vec![fact.shorthand(fact.ident("a"))]);
    let assignment = fact.assign(target, fact.ident("obj"));
    let stmt = fact.expr_stmt(fact.paren(assignment));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(output.contains("a = obj.a"), "got: {output}");
    // Statement position: no trailing value read.
    assert!(!output.contains(", obj)"), "got: {output}");
}

#[test]
fn test_destructuring_assignment_produces_value_when_needed() {
    let fact = NodeFactory::new();
    // use([x] = xs);
    let target = fact.array(vec![fact.ident("x")]);
    let assignment = fact.assign(target, fact.ident("xs"));
    let call = fact.call(fact.ident("use"), vec![assignment]);
    let file = fact.source_file("test.js", "", vec![fact.expr_stmt(call)]);
    let output = emit(&file);

    assert!(
        output.contains("use((x = xs[0], xs));"),
        "got: {output}"
    );
}

#[test]
fn test_for_of_with_pattern_head() {
    let fact = NodeFactory::new();
    // for (let [a, b] of pairs) { }
    let pattern = fact.array_binding_pattern(vec![
        fact.binding_element(None, fact.ident("a"), None),
        fact.binding_element(None, fact.ident("b"), None),
    ]);
    let head = fact.var_declaration_list(
        NodeFlags::LET,
        vec![fact.var_decl(pattern, None)],
    );
    let loop_stmt = fact.for_of(head, fact.ident("pairs"), fact.block(vec![]));
    let file = fact.source_file("test.js", "", vec![loop_stmt]);
    let output = emit(&file);

    assert!(
        output.contains("for (var _i = 0; _i < pairs.length; _i++) {"),
        "got: {output}"
    );
    assert!(
        output.contains("var _a = pairs[_i], a = _a[0], b = _a[1];"),
        "got: {output}"
    );
}

#[test]
fn test_computed_key_in_pattern() {
    let fact = NodeFactory::new();
    // let {[k]: v} = obj;
    let pattern = fact.object_binding_pattern(vec![fact.binding_element(
        Some(fact.computed_property_name(fact.ident("k"))),
        fact.ident("v"),
        None,
    )]);
    let stmt = let_decl(&fact, pattern, fact.ident("obj"));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(output.contains("var v = obj[k];"), "got: {output}");
}

#[test]
fn test_shorthand_property_expands() {
    let fact = NodeFactory::new();
    // var o = {x};
    let obj = fact.object(vec![fact.shorthand(fact.ident("x"))]);
    let stmt = fact.var_statement(vec![fact.var_decl_named("o", Some(obj))]);
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(output.contains("var o = { x: x };"), "got: {output}");
}

#[test]
fn test_object_literal_with_computed_property() {
    let fact = NodeFactory::new();
    // var o = { a: 1, [k]: v };
    let obj = fact.object(vec![
        fact.property_assignment(fact.ident("a"), fact.number("1")),
        fact.property_assignment(
            fact.computed_property_name(fact.ident("k")),
            fact.ident("v"),
        ),
    ]);
    let stmt = fact.var_statement(vec![fact.var_decl_named("o", Some(obj))]);
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(output.contains("var _a;"), "Temp is hoisted: {output}");
    assert!(
        output.contains("var o = (_a = { a: 1 }, _a[k] = v, _a);"),
        "got: {output}"
    );
}

#[test]
fn test_object_literal_method_becomes_property() {
    let fact = NodeFactory::new();
    // var o = { m() { return 1; } };
    let method = fact.method(
        fact.ident("m"),
        vec![],
        fact.block(vec![fact.ret(Some(fact.number("1")))]),
    );
    let obj = fact.object(vec![method]);
    let stmt = fact.var_statement(vec![fact.var_decl_named("o", Some(obj))]);
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(
        output.contains("var o = { m: function () {"),
        "got: {output}"
    );
    assert!(output.contains("return 1;"), "got: {output}");
}
