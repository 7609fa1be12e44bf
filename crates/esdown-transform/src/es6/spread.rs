//! Spread lowering: call/new argument expansion via `concat`/`apply`/
//! `bind`, array-literal segmentation, and `super(...)` call rewrites.

use std::rc::Rc;

use esdown_ast::node::{NodeKind, NodeRef};

use crate::context::TempHint;

use super::Es6Transformer;

/// One segment of a spread expansion: either a literal run of visited
/// arguments or a visited spread operand.
enum SpreadSegment {
    Literal(Vec<NodeRef>),
    Spread(NodeRef),
}

impl Es6Transformer {
    /// Calls needing rewrite: `super(...)`, `super.m(...)`, and any call
    /// with spread arguments.
    pub(crate) fn visit_call_expression(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::Call(call) = &node.kind else {
            return self.accept_current(node);
        };
        let call = call.clone();
        let fact = self.cx.factory();
        let has_spread = call
            .arguments
            .iter()
            .any(|a| matches!(a.kind, NodeKind::SpreadElement(_)));

        // super(...) — receiver is `this`, callee is `_super`.
        if matches!(call.expression.kind, NodeKind::SuperExpression) {
            let callee = fact.ident("_super");
            let out = if has_spread {
                let args = self.spread_arguments_array(&call.arguments, false);
                fact.call(
                    fact.prop(callee, "apply"),
                    vec![fact.this_expr(), args],
                )
            } else {
                let mut args = vec![fact.this_expr()];
                args.extend(call.arguments.iter().map(|a| self.visit(a)));
                fact.call(fact.prop(callee, "call"), args)
            };
            let out = fact.with_span(&out, node.span);
            return fact.with_original(&out, node);
        }

        // super.m(...) / super[k](...) — receiver is `this`.
        if is_super_property(&call.expression) {
            let target = self.visit(&call.expression);
            let out = if has_spread {
                let args = self.spread_arguments_array(&call.arguments, false);
                fact.call(fact.prop(target, "apply"), vec![fact.this_expr(), args])
            } else {
                let mut args = vec![fact.this_expr()];
                args.extend(call.arguments.iter().map(|a| self.visit(a)));
                fact.call(fact.prop(target, "call"), args)
            };
            let out = fact.with_span(&out, node.span);
            return fact.with_original(&out, node);
        }

        if !has_spread {
            return self.accept_current(node);
        }

        // f(a, ...b) — `f.apply(thisArg, segments)`, with the receiver
        // hoisted to a temp when the callee is a non-trivial member
        // access.
        let out = match &call.expression.kind {
            NodeKind::PropertyAccess(access) => {
                let object = self.visit(&access.expression);
                let name = fact.clone_identifier(&access.name);
                let args = self.spread_arguments_array(&call.arguments, false);
                if is_simple_receiver(&object) {
                    let this_arg = Rc::clone(&object);
                    let target = fact.prop_access(object, name);
                    fact.call(fact.prop(target, "apply"), vec![this_arg, args])
                } else {
                    // (_a = obj, _a.m.apply(_a, segments))
                    let temp = self.cx.create_hoisted_temp(TempHint::Auto);
                    let bind = fact.assign(Rc::clone(&temp), object);
                    let target = fact.prop_access(Rc::clone(&temp), name);
                    let apply = fact.call(fact.prop(target, "apply"), vec![temp, args]);
                    fact.paren(fact.comma(bind, apply))
                }
            }
            NodeKind::ElementAccess(access) => {
                let object = self.visit(&access.expression);
                let index = self.visit(&access.argument_expression);
                let args = self.spread_arguments_array(&call.arguments, false);
                if is_simple_receiver(&object) {
                    let this_arg = Rc::clone(&object);
                    let target = fact.elem_access(object, index);
                    fact.call(fact.prop(target, "apply"), vec![this_arg, args])
                } else {
                    let temp = self.cx.create_hoisted_temp(TempHint::Auto);
                    let bind = fact.assign(Rc::clone(&temp), object);
                    let target = fact.elem_access(Rc::clone(&temp), index);
                    let apply = fact.call(fact.prop(target, "apply"), vec![temp, args]);
                    fact.paren(fact.comma(bind, apply))
                }
            }
            _ => {
                // Bare call: receiver slot is `void 0`.
                let target = self.visit(&call.expression);
                let args = self.spread_arguments_array(&call.arguments, false);
                fact.call(
                    fact.prop(target, "apply"),
                    vec![fact.void_zero(), args],
                )
            }
        };
        let out = fact.with_span(&out, node.span);
        fact.with_original(&out, node)
    }

    /// `new F(...args)` → `new (F.bind.apply(F, [void 0].concat(args)))()`
    /// — the `void 0` occupies the `thisArg` slot for `bind`.
    pub(crate) fn visit_new_expression(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::New(call) = &node.kind else {
            return self.accept_current(node);
        };
        let call = call.clone();
        let fact = self.cx.factory();

        let target = self.visit(&call.expression);
        let segments = self.spread_segments(&call.arguments);
        let concat_args: Vec<NodeRef> = segments
            .into_iter()
            .map(|segment| match segment {
                SpreadSegment::Literal(elements) => fact.array(elements),
                SpreadSegment::Spread(expr) => expr,
            })
            .collect();

        let lead = fact.array(vec![fact.void_zero()]);
        let all_args = fact.call(fact.prop(lead, "concat"), concat_args);
        let bind_apply = fact.call(
            fact.prop(fact.prop(Rc::clone(&target), "bind"), "apply"),
            vec![target, all_args],
        );
        let out = fact.new_expr(fact.paren(bind_apply), Vec::new());
        let out = fact.with_span(&out, node.span);
        fact.with_original(&out, node)
    }

    /// `[a, ...b, c]` → `[a].concat(b, [c])`; a lone `[...b]` takes a
    /// fresh copy with `b.slice()`.
    pub(crate) fn visit_array_literal(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::ArrayLiteral(arr) = &node.kind else {
            return self.accept_current(node);
        };
        let elements = arr.elements.clone();
        let fact = self.cx.factory();
        let out = self.spread_arguments_array(&elements, true);
        let out = fact.with_span(&out, node.span);
        fact.with_original(&out, node)
    }

    /// Group arguments into segments: consecutive non-spread arguments
    /// become array-literal runs, spread operands pass through.
    fn spread_segments(&mut self, arguments: &[NodeRef]) -> Vec<SpreadSegment> {
        let mut segments: Vec<SpreadSegment> = Vec::new();
        let mut run: Vec<NodeRef> = Vec::new();
        for arg in arguments {
            match &arg.kind {
                NodeKind::SpreadElement(spread) => {
                    if !run.is_empty() {
                        segments.push(SpreadSegment::Literal(std::mem::take(&mut run)));
                    }
                    segments.push(SpreadSegment::Spread(self.visit(&spread.expression)));
                }
                _ => run.push(self.visit(arg)),
            }
        }
        if !run.is_empty() {
            segments.push(SpreadSegment::Literal(run));
        }
        segments
    }

    /// The single array expression carrying all arguments: a `concat`
    /// chain over the segments. `needs_unique_copy` forces `.slice()`
    /// when the whole list is one spread (array-literal position).
    fn spread_arguments_array(
        &mut self,
        arguments: &[NodeRef],
        needs_unique_copy: bool,
    ) -> NodeRef {
        let fact = self.cx.factory();
        let mut segments = self.spread_segments(arguments);

        if segments.len() == 1 {
            return match segments.pop().expect("one segment") {
                SpreadSegment::Literal(elements) => fact.array(elements),
                SpreadSegment::Spread(expr) => {
                    if needs_unique_copy {
                        fact.call(fact.prop(expr, "slice"), Vec::new())
                    } else {
                        expr
                    }
                }
            };
        }

        let mut iter = segments.into_iter();
        let first = match iter.next() {
            Some(SpreadSegment::Literal(elements)) => fact.array(elements),
            Some(SpreadSegment::Spread(expr)) => expr,
            None => return fact.array(Vec::new()),
        };
        let rest: Vec<NodeRef> = iter
            .map(|segment| match segment {
                SpreadSegment::Literal(elements) => fact.array(elements),
                SpreadSegment::Spread(expr) => expr,
            })
            .collect();
        fact.call(fact.prop(first, "concat"), rest)
    }
}

fn is_super_property(callee: &NodeRef) -> bool {
    match &callee.kind {
        NodeKind::PropertyAccess(access) => {
            matches!(access.expression.kind, NodeKind::SuperExpression)
        }
        NodeKind::ElementAccess(access) => {
            matches!(access.expression.kind, NodeKind::SuperExpression)
        }
        _ => false,
    }
}

/// Receivers that can be evaluated twice without observable effects.
fn is_simple_receiver(node: &NodeRef) -> bool {
    matches!(
        node.kind,
        NodeKind::Identifier(_) | NodeKind::ThisExpression
    )
}
