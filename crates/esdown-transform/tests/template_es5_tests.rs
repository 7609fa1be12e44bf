use std::rc::Rc;

use esdown_ast::node::NodeRef;
use esdown_ast::{NodeFactory, Printer};
use esdown_common::options::TransformOptions;
use esdown_common::span::Span;
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
fn test_untagged_template_concatenation() {
    let fact = NodeFactory::new();
    // `hello ${name}!`
    let template = fact.template_expression(
        fact.template_head("hello "),
        vec![fact.template_span(fact.ident("name"), fact.template_tail("!"))],
    );
    let stmt = fact.expr_stmt(fact.assign(fact.ident("s"), template));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(
        output.contains("s = \"hello \" + name + \"!\";"),
        "got: {output}"
    );
}

#[test]
fn test_no_substitution_template_becomes_string() {
    let fact = NodeFactory::new();
    let template = fact.no_sub_template("plain");
    let stmt = fact.expr_stmt(fact.assign(fact.ident("s"), template));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(output.contains("s = \"plain\";"), "got: {output}");
}

#[test]
fn test_empty_head_is_omitted_when_span_literal_coerces() {
    let fact = NodeFactory::new();
    // `${x}b` — the "b" literal already forces string coercion.
    let template = fact.template_expression(
        fact.template_head(""),
        vec![fact.template_span(fact.ident("x"), fact.template_tail("b"))],
    );
    let stmt = fact.expr_stmt(fact.assign(fact.ident("s"), template));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(output.contains("s = x + \"b\";"), "got: {output}");
    assert!(!output.contains("\"\" + x"), "got: {output}");
}

#[test]
fn test_empty_head_is_kept_when_nothing_else_coerces() {
    let fact = NodeFactory::new();
    // `${x}` — without the empty head the result would not be a string.
    let template = fact.template_expression(
        fact.template_head(""),
        vec![fact.template_span(fact.ident("x"), fact.template_tail(""))],
    );
    let stmt = fact.expr_stmt(fact.assign(fact.ident("s"), template));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(output.contains("s = \"\" + x;"), "got: {output}");
}

#[test]
fn test_low_precedence_substitution_is_parenthesized() {
    let fact = NodeFactory::new();
    // `${a + b}c`
    let sum = fact.binary(fact.ident("a"), esdown_ast::BinaryOp::Plus, fact.ident("b"));
    let template = fact.template_expression(
        fact.template_head(""),
        vec![fact.template_span(sum, fact.template_tail("c"))],
    );
    let stmt = fact.expr_stmt(fact.assign(fact.ident("s"), template));
    let file = fact.source_file("test.js", "", vec![stmt]);
    let output = emit(&file);

    assert!(output.contains("s = (a + b) + \"c\";"), "got: {output}");
}

#[test]
fn test_template_callee_is_parenthesized() {
    let fact = NodeFactory::new();
    // `${f}`() — the folded chain must not fuse with the call.
    let template = fact.template_expression(
        fact.template_head(""),
        vec![fact.template_span(fact.ident("f"), fact.template_tail(""))],
    );
    let call = fact.call(template, vec![]);
    let file = fact.source_file("test.js", "", vec![fact.expr_stmt(call)]);
    let output = emit(&file);

    assert!(output.contains("(\"\" + f)();"), "got: {output}");
}

#[test]
fn test_tagged_template_site_object() {
    let fact = NodeFactory::new();
    // tag`a${x}b`
    let template = fact.template_expression(
        fact.template_head("a"),
        vec![fact.template_span(fact.ident("x"), fact.template_tail("b"))],
    );
    let tagged = fact.tagged_template(fact.ident("tag"), template);
    let file = fact.source_file("test.js", "", vec![fact.expr_stmt(tagged)]);
    let output = emit(&file);

    assert!(output.contains("var _a;"), "Site object is hoisted: {output}");
    assert!(
        output.contains("(_a = [\"a\", \"b\"], _a.raw = [\"a\", \"b\"], tag(_a, x));"),
        "got: {output}"
    );
}

#[test]
fn test_tagged_no_substitution_template() {
    let fact = NodeFactory::new();
    let tagged = fact.tagged_template(fact.ident("tag"), fact.no_sub_template("hi"));
    let file = fact.source_file("test.js", "", vec![fact.expr_stmt(tagged)]);
    let output = emit(&file);

    assert!(
        output.contains("(_a = [\"hi\"], _a.raw = [\"hi\"], tag(_a));"),
        "got: {output}"
    );
}

#[test]
fn test_raw_text_recovered_from_source() {
    let fact = NodeFactory::new();
    // Source text: tag`a\nb` — cooked has a real newline, raw keeps the
    // backslash-n characters.
    let source = "tag`a\\nb`;";
    let chunk = fact.no_sub_template("a\nb");
    let chunk = fact.with_span(&chunk, Span::new(3, 9));
    let tagged = fact.tagged_template(fact.ident("tag"), chunk);
    let file = fact.source_file("test.js", source, vec![fact.expr_stmt(tagged)]);
    let output = emit(&file);

    assert!(
        output.contains("_a = [\"a\\nb\"]"),
        "Cooked newline: {output}"
    );
    assert!(
        output.contains("_a.raw = [\"a\\\\nb\"]"),
        "Raw backslash-n: {output}"
    );
}

#[test]
fn test_raw_text_normalizes_crlf() {
    let fact = NodeFactory::new();
    let source = "tag`a\r\nb`;";
    let chunk = fact.no_sub_template("a\nb");
    let chunk = fact.with_span(&chunk, Span::new(3, 9));
    let tagged = fact.tagged_template(fact.ident("tag"), chunk);
    let file = fact.source_file("test.js", source, vec![fact.expr_stmt(tagged)]);
    let output = emit(&file);

    assert!(
        output.contains("_a.raw = [\"a\\nb\"]"),
        "CRLF normalized to LF: {output}"
    );
}
