use esdown_ast::flags::{NodeFlags, TransformFlags};
use esdown_ast::kind::BinaryOp;
use esdown_ast::node::NodeKind;
use esdown_ast::NodeFactory;

#[test]
fn test_ids_are_unique() {
    let fact = NodeFactory::new();
    let a = fact.ident("a");
    let b = fact.ident("b");
    let c = fact.ident("a");
    assert_ne!(a.id, b.id);
    assert_ne!(a.id, c.id);
}

#[test]
fn test_builders_produce_synthesized_nodes() {
    let fact = NodeFactory::new();
    let call = fact.call(fact.ident("f"), vec![fact.number("1")]);
    assert!(call.is_synthesized());
    assert!(matches!(call.kind, NodeKind::Call(_)));
}

#[test]
fn test_clone_identifier_keeps_text_and_sets_original() {
    let fact = NodeFactory::new();
    let source = fact.ident("x");
    let cloned = fact.clone_identifier(&source);
    assert_ne!(source.id, cloned.id);
    assert_eq!(cloned.identifier_text(), Some("x"));
    assert!(cloned.is_synthesized());
    assert!(cloned.original.is_some());
}

#[test]
fn test_plain_nodes_have_no_transform_flags() {
    let fact = NodeFactory::new();
    let expr = fact.binary(fact.ident("a"), BinaryOp::Plus, fact.number("1"));
    assert!(expr.transform_flags.is_empty());
}

#[test]
fn test_this_sets_lexical_this() {
    let fact = NodeFactory::new();
    let this = fact.this_expr();
    assert!(this.transform_flags.contains(TransformFlags::LEXICAL_THIS));
}

#[test]
fn test_arrow_with_this_captures() {
    let fact = NodeFactory::new();
    let arrow = fact.arrow(vec![], fact.this_expr());
    assert!(arrow.transform_flags.contains(TransformFlags::ES6));
    assert!(arrow
        .transform_flags
        .contains(TransformFlags::CONTAINS_CAPTURED_LEXICAL_THIS));
}

#[test]
fn test_arrow_without_this_does_not_capture() {
    let fact = NodeFactory::new();
    let arrow = fact.arrow(vec![], fact.ident("x"));
    assert!(arrow.transform_flags.contains(TransformFlags::ES6));
    assert!(!arrow
        .transform_flags
        .contains(TransformFlags::CONTAINS_CAPTURED_LEXICAL_THIS));
}

#[test]
fn test_function_containing_capturing_arrow_is_rewritten() {
    let fact = NodeFactory::new();
    let arrow = fact.arrow(vec![], fact.this_expr());
    let body = fact.block(vec![fact.ret(Some(arrow))]);
    let func = fact.func_expr(None, vec![], body);
    assert!(func.transform_flags.contains(TransformFlags::ES6));
    assert!(func
        .transform_flags
        .contains(TransformFlags::CONTAINS_CAPTURED_LEXICAL_THIS));
}

#[test]
fn test_this_containment_stops_at_function_boundary() {
    let fact = NodeFactory::new();
    let arrow = fact.arrow(vec![], fact.this_expr());
    let body = fact.block(vec![fact.ret(Some(arrow))]);
    let func = fact.func_expr(None, vec![], body);
    let decl = fact.var_decl_named("f", Some(func));

    // The function's rewrite reason must not leak to its parent.
    assert!(decl.transform_flags.contains(TransformFlags::CONTAINS_ES6));
    assert!(!decl
        .transform_flags
        .contains(TransformFlags::CONTAINS_CAPTURED_LEXICAL_THIS));
    assert!(!decl
        .transform_flags
        .contains(TransformFlags::CONTAINS_LEXICAL_THIS));
}

#[test]
fn test_default_parameter_marks_function() {
    let fact = NodeFactory::new();
    let param = fact.parameter_with(fact.ident("b"), Some(fact.number("1")), false);
    let func = fact.func_decl(fact.ident("f"), vec![param], fact.block(vec![]));
    assert!(func.transform_flags.contains(TransformFlags::ES6));
    assert!(func
        .transform_flags
        .contains(TransformFlags::CONTAINS_DEFAULT_VALUE_ASSIGNMENTS));
}

#[test]
fn test_rest_parameter_marks_function() {
    let fact = NodeFactory::new();
    let param = fact.parameter_with(fact.ident("rest"), None, true);
    let func = fact.func_decl(fact.ident("f"), vec![param], fact.block(vec![]));
    assert!(func.transform_flags.contains(TransformFlags::ES6));
}

#[test]
fn test_plain_function_is_not_rewritten() {
    let fact = NodeFactory::new();
    let param = fact.parameter(fact.ident("a"));
    let func = fact.func_decl(fact.ident("f"), vec![param], fact.block(vec![]));
    assert!(!func.transform_flags.contains(TransformFlags::ES6));
    assert!(!func.transform_flags.contains(TransformFlags::CONTAINS_ES6));
}

#[test]
fn test_spread_call_marks_call() {
    let fact = NodeFactory::new();
    let call = fact.call(fact.ident("f"), vec![fact.spread(fact.ident("xs"))]);
    assert!(call.transform_flags.contains(TransformFlags::ES6));
    assert!(call
        .transform_flags
        .contains(TransformFlags::CONTAINS_SPREAD_ELEMENT_EXPRESSION));
}

#[test]
fn test_super_call_marks_call() {
    let fact = NodeFactory::new();
    let call = fact.call(fact.super_expr(), vec![]);
    assert!(call.transform_flags.contains(TransformFlags::ES6));

    let method_call = fact.call(fact.prop(fact.super_expr(), "m"), vec![]);
    assert!(method_call.transform_flags.contains(TransformFlags::ES6));
}

#[test]
fn test_let_declaration_list_is_es6() {
    let fact = NodeFactory::new();
    let decl = fact.var_decl_named("x", Some(fact.number("1")));
    let list = fact.var_declaration_list(NodeFlags::LET, vec![decl]);
    assert!(list.transform_flags.contains(TransformFlags::ES6));

    let decl = fact.var_decl_named("x", Some(fact.number("1")));
    let plain = fact.var_declaration_list(NodeFlags::empty(), vec![decl]);
    assert!(!plain.transform_flags.contains(TransformFlags::ES6));
}

#[test]
fn test_computed_property_marks_object_literal() {
    let fact = NodeFactory::new();
    let computed = fact.computed_property_name(fact.ident("k"));
    let prop = fact.property_assignment(computed, fact.number("1"));
    let obj = fact.object(vec![prop]);
    assert!(obj.transform_flags.contains(TransformFlags::ES6));

    let plain_prop = fact.property_assignment(fact.ident("a"), fact.number("1"));
    let plain = fact.object(vec![plain_prop]);
    assert!(!plain.transform_flags.contains(TransformFlags::ES6));
}

#[test]
fn test_containment_is_monotone_up_the_tree() {
    let fact = NodeFactory::new();
    let template = fact.template_expression(
        fact.template_head("a"),
        vec![fact.template_span(fact.ident("x"), fact.template_tail("b"))],
    );
    let stmt = fact.expr_stmt(fact.call(fact.ident("f"), vec![template]));
    let file = fact.source_file("test.js", "", vec![stmt]);
    assert!(file.transform_flags.contains(TransformFlags::CONTAINS_ES6));
}

#[test]
fn test_class_declaration_is_es6() {
    let fact = NodeFactory::new();
    let class = fact.class_decl(fact.ident("C"), None, vec![]);
    assert!(class.transform_flags.contains(TransformFlags::ES6));
}
