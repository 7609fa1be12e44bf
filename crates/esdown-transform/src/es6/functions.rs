//! Function lowering: default parameters, rest parameters, binding
//! pattern parameters, captured `this`, and arrow → function conversion.

use std::rc::Rc;

use esdown_ast::flags::{NodeFlags, TransformFlags};
use esdown_ast::kind::{BinaryOp, UnaryOp};
use esdown_ast::node::{FunctionData, NodeKind, NodeRef, ParameterData};

use crate::context::TempHint;

use super::Es6Transformer;

/// An `ExpressionStatement` flagged as generated whose expression is a
/// `super(...)` call, produced by earlier phases for default forwarding.
fn is_generated_super_call_statement(stmt: &NodeRef) -> bool {
    if !stmt.flags.contains(NodeFlags::GENERATED) {
        return false;
    }
    match &stmt.kind {
        NodeKind::ExpressionStatement(expr_stmt) => match &expr_stmt.expression.kind {
            NodeKind::Call(call) => {
                matches!(call.expression.kind, NodeKind::SuperExpression)
            }
            _ => false,
        },
        _ => false,
    }
}

impl Es6Transformer {
    pub(crate) fn visit_function_declaration(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::FunctionDeclaration(func) = &node.kind else {
            return Rc::clone(node);
        };
        let func = func.clone();
        let saved = self.super_scope.take();
        let (parameters, body) = self.transform_function_like(node, &func, false);
        self.super_scope = saved;

        let fact = self.cx.factory();
        fact.update(
            node,
            NodeKind::FunctionDeclaration(FunctionData {
                name: func.name.clone(),
                parameters,
                body: Some(body),
            }),
        )
    }

    pub(crate) fn visit_function_expression(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::FunctionExpression(func) = &node.kind else {
            return Rc::clone(node);
        };
        let func = func.clone();
        let saved = self.super_scope.take();
        let (parameters, body) = self.transform_function_like(node, &func, false);
        self.super_scope = saved;

        let fact = self.cx.factory();
        fact.update(
            node,
            NodeKind::FunctionExpression(FunctionData {
                name: func.name.clone(),
                parameters,
                body: Some(body),
            }),
        )
    }

    /// An arrow becomes an equivalent function expression with no own
    /// `this` binding: `this` references inside resolve to the `_this`
    /// captured by the enclosing function at emit time.
    pub(crate) fn visit_arrow_function(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::ArrowFunction(func) = &node.kind else {
            return Rc::clone(node);
        };
        let func = func.clone();
        let (parameters, body) = self.transform_function_like(node, &func, true);

        let fact = self.cx.factory();
        fact.update(
            node,
            NodeKind::FunctionExpression(FunctionData {
                name: None,
                parameters,
                body: Some(body),
            }),
        )
    }

    /// A shorthand method in an object literal becomes a plain property
    /// whose value is a function expression.
    pub(crate) fn visit_object_literal_method(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::MethodDeclaration(func) = &node.kind else {
            return Rc::clone(node);
        };
        let func = func.clone();
        let fact = self.cx.factory();
        let name = func
            .name
            .clone()
            .unwrap_or_else(|| fact.ident("_missing"));

        let saved = self.super_scope.take();
        let (parameters, body) = self.transform_function_like(node, &func, false);
        self.super_scope = saved;

        let value = fact.func_expr(None, parameters, body);
        let value = fact.with_original(&value, node);
        let prop = fact.property_assignment(name, value);
        let prop = fact.with_span(&prop, node.span);
        fact.with_original(&prop, node)
    }

    /// The value function expression for a class method or accessor.
    pub(crate) fn transform_member_function(&mut self, node: &NodeRef) -> NodeRef {
        let func = match &node.kind {
            NodeKind::MethodDeclaration(f)
            | NodeKind::GetAccessor(f)
            | NodeKind::SetAccessor(f)
            | NodeKind::Constructor(f) => f.clone(),
            _ => return Rc::clone(node),
        };
        let (parameters, body) = self.transform_function_like(node, &func, false);
        let fact = self.cx.factory();
        let out = fact.func_expr(None, parameters, body);
        let out = fact.with_span(&out, node.span);
        fact.with_original(&out, node)
    }

    /// Common body assembly for every function-like rewrite. Returns the
    /// rewritten parameter list and the new block body.
    ///
    /// Order inside the new body: captured `this`, parameter defaults
    /// and destructuring (source order), rest gathering, then the
    /// visited body statements. Hoisted declarations registered during
    /// the body surface as a `var` at the top of the block.
    pub(crate) fn transform_function_like(
        &mut self,
        node: &NodeRef,
        func: &FunctionData,
        is_arrow: bool,
    ) -> (Vec<NodeRef>, NodeRef) {
        let fact = self.cx.factory();
        self.cx.start_lexical_environment();

        let mut statements: Vec<NodeRef> = Vec::new();

        if !is_arrow
            && node
                .transform_flags
                .contains(TransformFlags::CONTAINS_CAPTURED_LEXICAL_THIS)
        {
            statements.push(self.make_this_capture());
        }

        let mut parameters: Vec<NodeRef> = Vec::new();
        for (index, param) in func.parameters.iter().enumerate() {
            let NodeKind::Parameter(p) = &param.kind else {
                parameters.push(Rc::clone(param));
                continue;
            };
            if p.dot_dot_dot {
                // Rest parameters are elided from the parameter list.
                self.emit_rest_parameter(&mut statements, param, p, index);
            } else if p.name.is_binding_pattern() {
                self.emit_pattern_parameter(&mut statements, &mut parameters, param, p);
            } else if let Some(initializer) = &p.initializer {
                parameters.push(self.parameter_without_initializer(param, p));
                statements.push(self.make_default_value_check(param, &p.name, initializer));
            } else {
                parameters.push(Rc::clone(param));
            }
        }

        match &func.body {
            Some(body) if matches!(body.kind, NodeKind::Block(_)) => {
                let NodeKind::Block(block) = &body.kind else {
                    unreachable!()
                };
                for stmt in &block.statements {
                    if is_generated_super_call_statement(stmt) {
                        // A synthesized constructor forward materializes as
                        // the canonical `_super.apply(this, arguments);`.
                        statements.push(self.make_default_super_forward());
                    } else {
                        statements.push(self.visit(stmt));
                    }
                }
            }
            Some(expr) => {
                // Concise arrow body: wrap the visited expression in a
                // return statement.
                let value = self.visit(expr);
                let ret = fact.ret(Some(value));
                let ret = fact.with_flags(&ret, NodeFlags::GENERATED);
                statements.push(fact.with_original(&fact.with_span(&ret, expr.span), expr));
            }
            None => {}
        }

        if let Some(hoisted) = self.cx.end_lexical_environment() {
            statements.insert(0, hoisted);
        }

        let body_span = func.body.as_ref().map(|b| b.span).unwrap_or_default();
        let block = fact.block(statements);
        let block = fact.with_span(&block, body_span);
        let block = match &func.body {
            Some(body) => fact.with_original(&block, body),
            None => block,
        };
        (parameters, block)
    }

    /// `if (name === void 0) { name = <initializer>; }`
    fn make_default_value_check(
        &mut self,
        param: &NodeRef,
        name: &NodeRef,
        initializer: &NodeRef,
    ) -> NodeRef {
        let fact = self.cx.factory();
        let initializer = self.visit(initializer);
        let condition = fact.is_void_zero_check(fact.clone_identifier(name));
        let assignment =
            fact.expr_stmt(fact.assign(fact.clone_identifier(name), initializer));
        let block = fact.with_flags(
            &fact.block(vec![assignment]),
            NodeFlags::SINGLE_LINE | NodeFlags::GENERATED,
        );
        let stmt = fact.if_stmt(condition, block, None);
        fact.with_original(&fact.with_span(&stmt, param.span), param)
    }

    /// Replace a binding-pattern parameter by a generated temp and emit
    /// the destructuring prologue reading from it.
    fn emit_pattern_parameter(
        &mut self,
        statements: &mut Vec<NodeRef>,
        parameters: &mut Vec<NodeRef>,
        param: &NodeRef,
        p: &ParameterData,
    ) {
        let fact = self.cx.factory();
        let temp = self.cx.get_generated_name_for_node(param);
        parameters.push(fact.with_original(&fact.parameter(Rc::clone(&temp)), param));

        let pattern_is_empty = match &p.name.kind {
            NodeKind::ObjectBindingPattern(pat) | NodeKind::ArrayBindingPattern(pat) => {
                pat.elements.is_empty()
            }
            _ => true,
        };

        if !pattern_is_empty {
            let declarations = self.flatten_parameter_destructuring(param, temp);
            if !declarations.is_empty() {
                let stmt = fact.var_statement(declarations);
                let stmt = fact.with_flags(&stmt, NodeFlags::GENERATED);
                statements.push(fact.with_original(&fact.with_span(&stmt, param.span), param));
            }
        } else if let Some(initializer) = &p.initializer {
            // An empty pattern still evaluates its initializer for side
            // effects.
            let initializer = self.visit(initializer);
            statements.push(fact.expr_stmt(fact.assign(temp, initializer)));
        }
    }

    fn parameter_without_initializer(&mut self, param: &NodeRef, p: &ParameterData) -> NodeRef {
        let fact = self.cx.factory();
        let rebuilt = fact.parameter(Rc::clone(&p.name));
        fact.with_original(&fact.with_span(&rebuilt, param.span), param)
    }

    /// `var name = []; for (var _i = <n>; _i < arguments.length; _i++) {
    /// name[_i - <n>] = arguments[_i]; }`
    fn emit_rest_parameter(
        &mut self,
        statements: &mut Vec<NodeRef>,
        param: &NodeRef,
        p: &ParameterData,
        rest_index: usize,
    ) {
        let fact = self.cx.factory();

        let init = fact.var_statement(vec![
            fact.var_decl(Rc::clone(&p.name), Some(fact.array(Vec::new()))),
        ]);
        let init = fact.with_flags(&init, NodeFlags::GENERATED);
        statements.push(fact.with_original(&fact.with_span(&init, param.span), param));

        let counter = self.cx.create_temp_variable(TempHint::LoopCounter);
        let arguments_length = fact.prop(fact.ident("arguments"), "length");
        let condition = fact.binary(Rc::clone(&counter), BinaryOp::Lt, arguments_length);
        let incrementor = fact.postfix(Rc::clone(&counter), UnaryOp::PlusPlus);
        let head = fact.var_declaration_list(
            NodeFlags::empty(),
            vec![fact.var_decl(Rc::clone(&counter), Some(fact.number_of(rest_index)))],
        );

        // The subtraction is omitted for a leading rest parameter.
        let target_index = if rest_index == 0 {
            Rc::clone(&counter)
        } else {
            fact.binary(
                Rc::clone(&counter),
                BinaryOp::Minus,
                fact.number_of(rest_index),
            )
        };
        let store = fact.expr_stmt(fact.assign(
            fact.elem_access(fact.clone_identifier(&p.name), target_index),
            fact.elem_access(fact.ident("arguments"), Rc::clone(&counter)),
        ));
        let body = fact.block(vec![store]);

        let loop_stmt = fact.for_stmt(Some(head), Some(condition), Some(incrementor), body);
        statements.push(fact.with_original(&loop_stmt, param));
    }
}
