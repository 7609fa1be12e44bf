use std::rc::Rc;

use esdown_ast::node::{NodeKind, NodeRef};
use esdown_ast::visit::{for_each_child, visit_each_child, walk};
use esdown_ast::NodeFactory;

#[test]
fn test_for_each_child_source_order() {
    let fact = NodeFactory::new();
    let call = fact.call(fact.ident("f"), vec![fact.ident("a"), fact.ident("b")]);

    let mut seen = Vec::new();
    for_each_child(&call, &mut |child: &NodeRef| {
        if let Some(text) = child.identifier_text() {
            seen.push(text.to_string());
        }
    });
    assert_eq!(seen, ["f", "a", "b"]);
}

#[test]
fn test_walk_is_preorder() {
    let fact = NodeFactory::new();
    let inner = fact.call(fact.ident("g"), vec![]);
    let outer = fact.call(fact.ident("f"), vec![inner]);

    let mut kinds = Vec::new();
    walk(&outer, &mut |node: &NodeRef| {
        kinds.push(node.syntax_kind());
    });
    assert_eq!(kinds[0], esdown_ast::SyntaxKind::Call);
    assert_eq!(kinds[1], esdown_ast::SyntaxKind::Identifier);
    assert_eq!(kinds[2], esdown_ast::SyntaxKind::Call);
}

#[test]
fn test_visit_each_child_identity_when_unchanged() {
    let fact = NodeFactory::new();
    let stmt = fact.expr_stmt(fact.call(fact.ident("f"), vec![fact.ident("a")]));

    let out = visit_each_child(&fact, &stmt, &mut |child: &NodeRef| Rc::clone(child));
    assert!(Rc::ptr_eq(&out, &stmt));
}

#[test]
fn test_visit_each_child_rebuilds_on_change() {
    let fact = NodeFactory::new();
    let a = fact.ident("a");
    let b = fact.ident("b");
    let call = fact.call(fact.ident("f"), vec![Rc::clone(&a), Rc::clone(&b)]);

    let replacement = fact.number("1");
    let out = visit_each_child(&fact, &call, &mut |child: &NodeRef| {
        if Rc::ptr_eq(child, &a) {
            Rc::clone(&replacement)
        } else {
            Rc::clone(child)
        }
    });

    assert!(!Rc::ptr_eq(&out, &call));
    let NodeKind::Call(new_call) = &out.kind else {
        panic!("expected call");
    };
    assert!(Rc::ptr_eq(&new_call.arguments[0], &replacement));
    // The untouched sibling is shared by reference.
    assert!(Rc::ptr_eq(&new_call.arguments[1], &b));
}

#[test]
fn test_rebuilt_node_records_original() {
    let fact = NodeFactory::new();
    let call = fact.call(fact.ident("f"), vec![fact.ident("a")]);

    let out = visit_each_child(&fact, &call, &mut |_child: &NodeRef| fact.number("0"));
    let original = out.original.as_ref().expect("expected original");
    assert!(Rc::ptr_eq(original, &call));
}

#[test]
fn test_rebuilt_node_recomputes_transform_flags() {
    let fact = NodeFactory::new();
    let template = fact.no_sub_template("hi");
    let call = fact.call(fact.ident("f"), vec![template]);
    assert!(call
        .transform_flags
        .contains(esdown_ast::TransformFlags::CONTAINS_ES6));

    // Replacing the template with a plain string clears the containment.
    let out = visit_each_child(&fact, &call, &mut |child: &NodeRef| {
        if matches!(child.kind, NodeKind::NoSubstitutionTemplateLiteral(_)) {
            fact.string("hi")
        } else {
            Rc::clone(child)
        }
    });
    assert!(!out
        .transform_flags
        .contains(esdown_ast::TransformFlags::CONTAINS_ES6));
}
