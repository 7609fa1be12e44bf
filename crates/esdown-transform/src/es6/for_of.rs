//! `for-of` lowering to an index-based `for` loop.

use std::rc::Rc;

use esdown_ast::flags::NodeFlags;
use esdown_ast::kind::{BinaryOp, UnaryOp};
use esdown_ast::node::{NodeKind, NodeRef};

use crate::context::TempHint;

use super::Es6Transformer;

impl Es6Transformer {
    /// `for (LHS of RHS) BODY` →
    ///
    /// ```text
    /// for (var _i = 0, _a = RHS; _i < _a.length; _i++) {
    ///     <lhs-init>
    ///     BODY'
    /// }
    /// ```
    ///
    /// An identifier RHS is indexed directly, with no `_a` temp.
    pub(crate) fn visit_for_of_statement(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::ForOfStatement(data) = &node.kind else {
            return self.accept(node);
        };
        let data = data.clone();
        let fact = self.cx.factory();

        let expression = self.visit(&data.expression);
        let counter = self.cx.create_temp_variable(TempHint::LoopCounter);

        let mut head_declarations =
            vec![fact.var_decl(Rc::clone(&counter), Some(fact.number("0")))];
        let rhs_reference = if matches!(expression.kind, NodeKind::Identifier(_)) {
            expression
        } else {
            let temp = self.cx.create_temp_variable(TempHint::Auto);
            head_declarations.push(fact.var_decl(Rc::clone(&temp), Some(expression)));
            temp
        };

        let element = fact.elem_access(Rc::clone(&rhs_reference), Rc::clone(&counter));
        let mut body_statements = self.for_of_lhs_statements(&data.initializer, element);

        match &data.statement.kind {
            NodeKind::Block(block) => {
                for stmt in &block.statements {
                    body_statements.push(self.visit(stmt));
                }
            }
            _ => body_statements.push(self.visit(&data.statement)),
        }

        let condition = fact.binary(
            Rc::clone(&counter),
            BinaryOp::Lt,
            fact.prop(rhs_reference, "length"),
        );
        let incrementor = fact.postfix(counter, UnaryOp::PlusPlus);
        let head = fact.var_declaration_list(NodeFlags::empty(), head_declarations);
        let body = fact.block(body_statements);
        let body = fact.with_original(&body, &data.statement);

        let out = fact.for_stmt(Some(head), Some(condition), Some(incrementor), body);
        let out = fact.with_span(&out, node.span);
        fact.with_original(&out, node)
    }

    /// The statements that rebind the loop LHS to the current element.
    fn for_of_lhs_statements(&mut self, initializer: &NodeRef, element: NodeRef) -> Vec<NodeRef> {
        let fact = self.cx.factory();
        match &initializer.kind {
            NodeKind::VariableDeclarationList(list) => {
                match list.declarations.first() {
                    Some(decl) => {
                        let NodeKind::VariableDeclaration(decl_data) = &decl.kind else {
                            return Vec::new();
                        };
                        if decl_data.name.is_binding_pattern() {
                            let declarations =
                                self.flatten_variable_destructuring_with_value(decl, element);
                            if declarations.is_empty() {
                                return Vec::new();
                            }
                            let stmt = fact.var_statement(declarations);
                            vec![fact.with_original(&stmt, decl)]
                        } else {
                            let rebind =
                                fact.var_decl(Rc::clone(&decl_data.name), Some(element));
                            let rebind = fact.with_original(
                                &fact.with_span(&rebind, decl.span),
                                decl,
                            );
                            vec![fact.var_statement(vec![rebind])]
                        }
                    }
                    None => {
                        // Error-recovery shape: `for (let of xs)`. Bind the
                        // element to a discard temp so the loop still runs.
                        debug_assert!(false, "empty for-of declaration list");
                        let temp = self.cx.create_temp_variable(TempHint::Auto);
                        vec![fact.var_statement(vec![fact.var_decl(temp, Some(element))])]
                    }
                }
            }
            // Bare expression LHS: reassign it, flattening destructuring
            // patterns through the assignment path.
            NodeKind::ObjectLiteral(_) | NodeKind::ArrayLiteral(_) => {
                let assignment = fact.assign(Rc::clone(initializer), element);
                let flattened = self.flatten_destructuring_assignment(&assignment, false);
                vec![fact.expr_stmt(flattened)]
            }
            _ => {
                let target = self.visit(initializer);
                vec![fact.expr_stmt(fact.assign(target, element))]
            }
        }
    }
}
