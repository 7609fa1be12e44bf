use esdown_ast::kind::BinaryOp;
use esdown_ast::{NodeFactory, Printer};

fn fact() -> NodeFactory {
    NodeFactory::new()
}

#[test]
fn test_print_var_statement() {
    let f = fact();
    let stmt = f.var_statement(vec![f.var_decl_named("x", Some(f.number("1")))]);
    assert_eq!(Printer::new().print(&stmt), "var x = 1;");
}

#[test]
fn test_print_var_statement_multiple_declarations() {
    let f = fact();
    let stmt = f.var_statement(vec![
        f.var_decl_named("a", Some(f.number("1"))),
        f.var_decl_named("b", None),
    ]);
    assert_eq!(Printer::new().print(&stmt), "var a = 1, b;");
}

#[test]
fn test_print_call_and_member_access() {
    let f = fact();
    let expr = f.call(f.prop(f.ident("console"), "log"), vec![f.string("hi")]);
    assert_eq!(Printer::new().print(&expr), "console.log(\"hi\")");
}

#[test]
fn test_print_function_declaration() {
    let f = fact();
    let func = f.func_decl(
        f.ident("f"),
        vec![f.parameter(f.ident("a"))],
        f.block(vec![f.ret(Some(f.ident("a")))]),
    );
    let output = Printer::new().print(&func);
    assert!(output.starts_with("function f(a) {"), "got: {output}");
    assert!(output.contains("return a;"), "got: {output}");
}

#[test]
fn test_print_void_zero() {
    let f = fact();
    let expr = f.void_zero();
    assert_eq!(Printer::new().print(&expr), "void 0");
}

#[test]
fn test_precedence_parens_in_binary() {
    let f = fact();
    let sum = f.binary(f.ident("a"), BinaryOp::Plus, f.ident("b"));
    let product = f.binary(sum, BinaryOp::Star, f.ident("c"));
    assert_eq!(Printer::new().print(&product), "(a + b) * c");
}

#[test]
fn test_no_redundant_parens_in_binary() {
    let f = fact();
    let product = f.binary(f.ident("a"), BinaryOp::Star, f.ident("b"));
    let sum = f.binary(product, BinaryOp::Plus, f.ident("c"));
    assert_eq!(Printer::new().print(&sum), "a * b + c");
}

#[test]
fn test_comma_argument_is_parenthesized() {
    let f = fact();
    let comma = f.comma(f.ident("a"), f.ident("b"));
    let call = f.call(f.ident("f"), vec![comma]);
    assert_eq!(Printer::new().print(&call), "f((a, b))");
}

#[test]
fn test_print_conditional() {
    let f = fact();
    let cond = f.conditional(f.ident("c"), f.number("1"), f.number("2"));
    assert_eq!(Printer::new().print(&cond), "c ? 1 : 2");
}

#[test]
fn test_print_object_literal() {
    let f = fact();
    let obj = f.object(vec![
        f.property_assignment(f.ident("a"), f.number("1")),
        f.property_assignment(f.ident("b"), f.number("2")),
    ]);
    assert_eq!(Printer::new().print(&obj), "{ a: 1, b: 2 }");
}

#[test]
fn test_print_empty_object_and_array() {
    let f = fact();
    assert_eq!(Printer::new().print(&f.object(vec![])), "{}");
    assert_eq!(Printer::new().print(&f.array(vec![])), "[]");
}

#[test]
fn test_print_string_escapes() {
    let f = fact();
    let s = f.string("a\"b\\c\nd");
    assert_eq!(Printer::new().print(&s), "\"a\\\"b\\\\c\\nd\"");
}

#[test]
fn test_print_new_with_parenthesized_callee() {
    let f = fact();
    let bind = f.call(f.prop(f.ident("F"), "bind"), vec![]);
    let callee = f.paren(bind);
    let new_expr = f.new_expr(callee, vec![]);
    assert_eq!(Printer::new().print(&new_expr), "new (F.bind())()");
}

#[test]
fn test_print_if_with_single_line_block() {
    let f = fact();
    let assign = f.expr_stmt(f.assign(f.ident("b"), f.number("1")));
    let block = f.with_flags(
        &f.block(vec![assign]),
        esdown_ast::NodeFlags::SINGLE_LINE,
    );
    let cond = f.is_void_zero_check(f.ident("b"));
    let stmt = f.if_stmt(cond, block, None);
    assert_eq!(
        Printer::new().print(&stmt),
        "if (b === void 0) { b = 1; }"
    );
}
