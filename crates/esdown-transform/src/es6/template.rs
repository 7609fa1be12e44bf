//! Template-literal lowering: head/span `+` concatenation for untagged
//! templates, and the cooked/raw site-object sequence for tagged ones.

use std::rc::Rc;

use esdown_ast::kind::BinaryOp;
use esdown_ast::node::{expression_precedence, NodeKind, NodeRef};

use crate::context::TempHint;

use super::Es6Transformer;

/// Precedence of binary `+`; substitution expressions that do not bind
/// strictly tighter are parenthesized to prevent re-association.
const PLUS_PRECEDENCE: u8 = 12;

impl Es6Transformer {
    /// `` `a` `` → `"a"`.
    pub(crate) fn visit_no_substitution_template(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::NoSubstitutionTemplateLiteral(lit) = &node.kind else {
            return Rc::clone(node);
        };
        let fact = self.cx.factory();
        let out = fact.string(&lit.text);
        let out = fact.with_span(&out, node.span);
        fact.with_original(&out, node)
    }

    /// `` `a${x}b${y}` `` → `"a" + x + "b" + y`.
    pub(crate) fn visit_template_expression(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::TemplateExpression(template) = &node.kind else {
            return Rc::clone(node);
        };
        let template = template.clone();
        let fact = self.cx.factory();

        let head_text = literal_chunk_text(&template.head).unwrap_or_default();
        let first_span_literal_empty = template
            .spans
            .first()
            .and_then(|span| match &span.kind {
                NodeKind::TemplateSpan(s) => literal_chunk_text(&s.literal),
                _ => None,
            })
            .is_none_or(|text| text.is_empty());

        // An empty head is omitted when the first span's literal still
        // forces string coercion.
        let mut expr: Option<NodeRef> = if !head_text.is_empty() || first_span_literal_empty {
            Some(fact.string(&head_text))
        } else {
            None
        };

        for span in &template.spans {
            let NodeKind::TemplateSpan(s) = &span.kind else {
                continue;
            };
            let mut value = self.visit(&s.expression);
            if expression_precedence(&value) <= PLUS_PRECEDENCE {
                value = fact.paren(value);
            }
            expr = Some(match expr {
                Some(acc) => fact.binary(acc, BinaryOp::Plus, value),
                None => value,
            });
            if let Some(text) = literal_chunk_text(&s.literal) {
                if !text.is_empty() {
                    let acc = expr.take().expect("span expression folded above");
                    expr = Some(fact.binary(acc, BinaryOp::Plus, fact.string(&text)));
                }
            }
        }

        let mut out = expr.unwrap_or_else(|| fact.string(&head_text));
        if self.template_needs_parens(node) {
            out = fact.paren(out);
        }
        let out = fact.with_span(&out, node.span);
        fact.with_original(&out, node)
    }

    /// The folded `+` chain binds looser than member access and calls;
    /// parenthesize when the template sits in a callee or receiver slot.
    fn template_needs_parens(&self, node: &NodeRef) -> bool {
        let Some(parent) = self.cx.get_parent_node() else {
            return false;
        };
        match &parent.kind {
            NodeKind::Call(call) | NodeKind::New(call) => Rc::ptr_eq(&call.expression, node),
            NodeKind::PropertyAccess(access) => Rc::ptr_eq(&access.expression, node),
            NodeKind::ElementAccess(access) => Rc::ptr_eq(&access.expression, node),
            _ => false,
        }
    }

    /// `` tag`a${x}b` `` →
    /// `(_a = ["a", "b"], _a.raw = ["a", "b"], tag(_a, x))` with `_a`
    /// hoisted and distinct cooked/raw strings.
    pub(crate) fn visit_tagged_template(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::TaggedTemplate(tagged) = &node.kind else {
            return Rc::clone(node);
        };
        let tagged = tagged.clone();
        let fact = self.cx.factory();

        let tag = self.visit(&tagged.tag);
        let temp = self.cx.create_hoisted_temp(TempHint::Auto);

        let mut cooked: Vec<NodeRef> = Vec::new();
        let mut raw: Vec<NodeRef> = Vec::new();
        let mut call_args: Vec<NodeRef> = vec![Rc::clone(&temp)];

        match &tagged.template.kind {
            NodeKind::NoSubstitutionTemplateLiteral(lit) => {
                cooked.push(fact.string(&lit.text));
                raw.push(fact.string(&self.raw_literal_text(&tagged.template)));
            }
            NodeKind::TemplateExpression(template) => {
                cooked.push(fact.string(
                    &literal_chunk_text(&template.head).unwrap_or_default(),
                ));
                raw.push(fact.string(&self.raw_literal_text(&template.head)));
                for span in &template.spans {
                    let NodeKind::TemplateSpan(s) = &span.kind else {
                        continue;
                    };
                    cooked.push(fact.string(
                        &literal_chunk_text(&s.literal).unwrap_or_default(),
                    ));
                    raw.push(fact.string(&self.raw_literal_text(&s.literal)));
                    call_args.push(self.visit(&s.expression));
                }
            }
            _ => return Rc::clone(node),
        }

        let assign_cooked = fact.assign(Rc::clone(&temp), fact.array(cooked));
        let assign_raw = fact.assign(fact.prop(Rc::clone(&temp), "raw"), fact.array(raw));
        let invoke = fact.call(tag, call_args);

        let sequence = fact.comma(fact.comma(assign_cooked, assign_raw), invoke);
        let out = fact.paren(sequence);
        let out = fact.with_span(&out, node.span);
        fact.with_original(&out, node)
    }

    /// Recover the raw text of a template chunk by slicing the original
    /// source, stripping the `` ` ``/`${`/`}` delimiters and normalizing
    /// `\r\n?` to `\n`. Synthesized chunks fall back to cooked text.
    fn raw_literal_text(&mut self, chunk: &NodeRef) -> String {
        let cooked = literal_chunk_text(chunk).unwrap_or_default();
        if chunk.is_synthesized() {
            return cooked;
        }
        let Some(text) = self.cx.current_source_text() else {
            return cooked;
        };
        let slice = chunk.span.slice(&text);
        if slice.is_empty() {
            return cooked;
        }

        let (leading, trailing) = match &chunk.kind {
            NodeKind::TemplateHead(_) => (1, 2),
            NodeKind::TemplateMiddle(_) => (1, 2),
            NodeKind::TemplateTail(_) => (1, 1),
            NodeKind::NoSubstitutionTemplateLiteral(_) => (1, 1),
            _ => (0, 0),
        };
        if slice.len() < leading + trailing {
            return cooked;
        }
        let inner = &slice[leading..slice.len() - trailing];
        normalize_line_endings(inner)
    }
}

fn literal_chunk_text(chunk: &NodeRef) -> Option<String> {
    match &chunk.kind {
        NodeKind::TemplateHead(lit)
        | NodeKind::TemplateMiddle(lit)
        | NodeKind::TemplateTail(lit)
        | NodeKind::NoSubstitutionTemplateLiteral(lit) => Some(lit.text.to_string()),
        _ => None,
    }
}

/// Normalize `\r\n` and lone `\r` to `\n`.
fn normalize_line_endings(text: &str) -> String {
    if memchr::memchr(b'\r', text.as_bytes()).is_none() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    out
}
