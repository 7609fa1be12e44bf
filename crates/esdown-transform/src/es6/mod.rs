//! The ES6→ES5 down-level transform.
//!
//! A single top-down, recursive rewriter keyed on the `TransformFlags`
//! bitset the factory precomputes on every node. Each node takes one of
//! three paths: rewritten by a kind-specific lowering when it carries the
//! `ES6` flag, reconstructed by the structural copy-visitor when only its
//! subtree does, or passed through by reference untouched. That gate is
//! what keeps the transform proportional to the amount of ES6 syntax
//! rather than to the size of the tree.

mod classes;
mod for_of;
mod functions;
mod object_literal;
mod spread;
mod substitution;
mod template;

use std::rc::Rc;

use esdown_ast::flags::{NodeFlags, TransformFlags};
use esdown_ast::node::{NodeKind, NodeRef};
use esdown_ast::visit::visit_each_child;
use esdown_ast::SyntaxKind;
use esdown_common::diagnostics::Diagnostic;
use esdown_common::options::TransformOptions;

use crate::context::{SubstitutionPipeline, TransformContext};
use crate::resolver::{EmitResolver, NodeCheckFlags};
use substitution::Es6SubstitutionStage;

/// The outcome of one file transform: the rewritten file, diagnostics,
/// and the substitution pipeline the emitter must consult.
pub struct TransformResult {
    pub file: NodeRef,
    pub diagnostics: Vec<Diagnostic>,
    pub substitutions: SubstitutionPipeline,
}

/// Run the ES6 down-level transform over a source file.
///
/// For an ES6 target this is the identity: the input file is returned
/// unchanged and no substitution stages are installed.
pub fn transform_source_file(
    options: TransformOptions,
    resolver: Rc<dyn EmitResolver>,
    file: &NodeRef,
) -> TransformResult {
    let mut transformer = Es6Transformer::new(options, resolver);
    let file = transformer.transform_source_file(file);
    transformer.into_result(file)
}

/// The scope `super` references resolve against while lowering class
/// member bodies.
#[derive(Clone, Copy)]
pub(crate) struct SuperScope {
    pub has_base: bool,
    pub is_static: bool,
}

pub struct Es6Transformer {
    pub(crate) cx: TransformContext,
    pub(crate) super_scope: Option<SuperScope>,
}

impl Es6Transformer {
    #[must_use]
    pub fn new(options: TransformOptions, resolver: Rc<dyn EmitResolver>) -> Self {
        Self {
            cx: TransformContext::new(options, resolver),
            super_scope: None,
        }
    }

    #[must_use]
    pub fn context(&self) -> &TransformContext {
        &self.cx
    }

    #[must_use]
    pub fn into_result(mut self, file: NodeRef) -> TransformResult {
        TransformResult {
            file,
            diagnostics: self.cx.take_diagnostics(),
            substitutions: self.cx.substitutions(),
        }
    }

    /// Transform one source file. Identity for ES6 targets.
    pub fn transform_source_file(&mut self, file: &NodeRef) -> NodeRef {
        if self.cx.options().target.supports_es6() {
            return Rc::clone(file);
        }
        // A file with no ES6 syntax anywhere is returned as-is.
        if !file
            .transform_flags
            .intersects(TransformFlags::ES6 | TransformFlags::CONTAINS_ES6)
        {
            return Rc::clone(file);
        }
        tracing::debug!(target_es5 = true, "down-leveling source file");

        self.cx.set_current_file(file);
        let stage = Es6SubstitutionStage::new(&self.cx);
        self.cx.push_substitution_stage(Rc::new(stage));

        let out = self.visit_source_file_node(file);
        debug_assert!(
            self.cx.environment_depth() == 0,
            "unbalanced lexical environment after transform"
        );
        out
    }

    /// Prologue directives are copied unchanged, a file-level `this`
    /// capture is added when some top-level arrow needs it, and the
    /// remaining statements are visited. Hoisted declarations surface
    /// right after the prologue.
    fn visit_source_file_node(&mut self, file: &NodeRef) -> NodeRef {
        let NodeKind::SourceFile(data) = &file.kind else {
            return Rc::clone(file);
        };
        let fact = self.cx.factory();
        self.cx.push_node(file);
        self.cx.start_lexical_environment();

        let mut statements: Vec<NodeRef> = Vec::new();
        let mut rest = data.statements.as_slice();
        while let Some((first, tail)) = rest.split_first() {
            if !is_prologue_directive(first) {
                break;
            }
            statements.push(Rc::clone(first));
            rest = tail;
        }
        let prologue_len = statements.len();

        if file
            .transform_flags
            .contains(TransformFlags::CONTAINS_CAPTURED_LEXICAL_THIS)
        {
            statements.push(self.make_this_capture());
        }

        for stmt in rest {
            statements.push(self.visit(stmt));
        }

        if let Some(hoisted) = self.cx.end_lexical_environment() {
            statements.insert(prologue_len, hoisted);
        }
        self.cx.pop_node();

        let rebuilt = fact.source_file(&data.file_name, &data.text, statements);
        let rebuilt = fact.with_span(&rebuilt, file.span);
        fact.with_original(&rebuilt, file)
    }

    /// The `var _this = this;` capture statement.
    pub(crate) fn make_this_capture(&mut self) -> NodeRef {
        let fact = self.cx.factory();
        let decl = fact.var_decl(fact.ident("_this"), Some(fact.this_expr()));
        let stmt = fact.var_statement(vec![decl]);
        fact.with_flags(&stmt, NodeFlags::GENERATED)
    }

    // =========================================================================
    // Dispatcher
    // =========================================================================

    /// The three-way gate: rewrite, recurse, or pass through.
    pub(crate) fn visit(&mut self, node: &NodeRef) -> NodeRef {
        if node.transform_flags.contains(TransformFlags::ES6) {
            self.visit_es6(node)
        } else if node.transform_flags.contains(TransformFlags::CONTAINS_ES6) {
            self.accept(node)
        } else {
            Rc::clone(node)
        }
    }

    fn visit_es6(&mut self, node: &NodeRef) -> NodeRef {
        self.cx.push_node(node);
        let out = match node.syntax_kind() {
            SyntaxKind::ClassDeclaration => self.visit_class_declaration(node),
            SyntaxKind::ClassExpression => self.visit_class_expression(node),
            SyntaxKind::ArrowFunction => self.visit_arrow_function(node),
            SyntaxKind::FunctionExpression => self.visit_function_expression(node),
            SyntaxKind::FunctionDeclaration => self.visit_function_declaration(node),
            SyntaxKind::MethodDeclaration => self.visit_object_literal_method(node),
            SyntaxKind::ForOfStatement => self.visit_for_of_statement(node),
            SyntaxKind::VariableDeclarationList => self.visit_variable_declaration_list(node),
            SyntaxKind::TemplateExpression => self.visit_template_expression(node),
            SyntaxKind::NoSubstitutionTemplateLiteral => {
                self.visit_no_substitution_template(node)
            }
            SyntaxKind::TaggedTemplate => self.visit_tagged_template(node),
            SyntaxKind::Call => self.visit_call_expression(node),
            SyntaxKind::New => self.visit_new_expression(node),
            SyntaxKind::ArrayLiteral => self.visit_array_literal(node),
            SyntaxKind::ObjectLiteral => self.visit_object_literal(node),
            SyntaxKind::ShorthandPropertyAssignment => self.visit_shorthand_property(node),
            SyntaxKind::Binary => self.visit_binary_expression(node),
            SyntaxKind::SuperExpression => self.visit_super_expression(node),
            SyntaxKind::PropertyAccess => self.visit_super_property_access(node),
            SyntaxKind::ElementAccess => self.visit_super_element_access(node),
            // Handled by the constructs that own them; reaching one here
            // means the tree is mis-shaped (error recovery), so recurse.
            SyntaxKind::Parameter
            | SyntaxKind::VariableDeclaration
            | SyntaxKind::ObjectBindingPattern
            | SyntaxKind::ArrayBindingPattern
            | SyntaxKind::SpreadElement
            | SyntaxKind::Constructor => self.accept_current(node),
            _ => {
                self.cx.report_unhandled_node(node);
                self.accept_current(node)
            }
        };
        self.cx.pop_node();
        out
    }

    /// The generic copy-visitor: reconstruct the node with each child
    /// visited, preserving structural sharing for clean subtrees.
    pub(crate) fn accept(&mut self, node: &NodeRef) -> NodeRef {
        if node.syntax_kind().is_function_like() {
            return self.accept_function_like(node);
        }
        self.cx.push_node(node);
        let out = self.accept_current(node);
        self.cx.pop_node();
        out
    }

    /// Copy-visit without stack bookkeeping; the caller has already
    /// pushed `node`.
    fn accept_current(&mut self, node: &NodeRef) -> NodeRef {
        let fact = self.cx.factory();
        visit_each_child(&fact, node, &mut |child| self.visit(child))
    }

    /// Copy-visit a function-like node, bracketing a lexical environment
    /// around the body so temps hoisted by inner rewrites surface inside
    /// the function.
    fn accept_function_like(&mut self, node: &NodeRef) -> NodeRef {
        let func = match &node.kind {
            NodeKind::FunctionExpression(f)
            | NodeKind::FunctionDeclaration(f)
            | NodeKind::MethodDeclaration(f)
            | NodeKind::Constructor(f)
            | NodeKind::GetAccessor(f)
            | NodeKind::SetAccessor(f)
            | NodeKind::ArrowFunction(f) => f.clone(),
            _ => return Rc::clone(node),
        };
        let fact = self.cx.factory();
        self.cx.push_node(node);

        let name = func.name.as_ref().map(|n| self.visit(n));
        let parameters: Vec<NodeRef> = func.parameters.iter().map(|p| self.visit(p)).collect();
        let body = func.body.as_ref().map(|b| self.visit_function_body(b));

        self.cx.pop_node();

        let changed = name
            .iter()
            .zip(func.name.iter())
            .any(|(a, b)| !Rc::ptr_eq(a, b))
            || parameters
                .iter()
                .zip(func.parameters.iter())
                .any(|(a, b)| !Rc::ptr_eq(a, b))
            || body
                .iter()
                .zip(func.body.iter())
                .any(|(a, b)| !Rc::ptr_eq(a, b));
        if !changed {
            return Rc::clone(node);
        }

        let data = esdown_ast::node::FunctionData {
            name,
            parameters,
            body,
        };
        fact.update(node, rebuild_function_kind(node, data))
    }

    /// Visit a function body inside its own lexical environment and
    /// merge any hoisted declarations at the top of the block.
    pub(crate) fn visit_function_body(&mut self, body: &NodeRef) -> NodeRef {
        self.cx.start_lexical_environment();
        let visited = self.visit(body);
        let hoisted = self.cx.end_lexical_environment();
        match hoisted {
            None => visited,
            Some(var_stmt) => self.prepend_to_block(&visited, vec![var_stmt]),
        }
    }

    /// Prepend statements to a block, rebuilding it.
    pub(crate) fn prepend_to_block(&mut self, block: &NodeRef, prefix: Vec<NodeRef>) -> NodeRef {
        let fact = self.cx.factory();
        match &block.kind {
            NodeKind::Block(data) => {
                let mut statements = prefix;
                statements.extend(data.statements.iter().cloned());
                let rebuilt = fact.block(statements);
                fact.update(block, rebuilt.kind.clone())
            }
            // A concise arrow body; the caller wraps it into a block.
            _ => Rc::clone(block),
        }
    }

    // =========================================================================
    // Block-scoped declarations
    // =========================================================================

    /// `let`/`const` lists are rebuilt as plain `var` lists. Declarations
    /// with binding patterns are flattened; loop-captured bindings with
    /// no initializer are given an explicit `void 0` so the hoisted `var`
    /// cannot leak the previous iteration's value.
    pub(crate) fn visit_variable_declaration_list(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::VariableDeclarationList(data) = &node.kind else {
            return self.accept_current(node);
        };
        let fact = self.cx.factory();
        let in_for_in_of_head = self.is_for_in_of_head(node);

        let mut declarations: Vec<NodeRef> = Vec::new();
        for decl in &data.declarations {
            let NodeKind::VariableDeclaration(decl_data) = &decl.kind else {
                declarations.push(self.visit(decl));
                continue;
            };
            if decl_data.name.is_binding_pattern() {
                declarations.extend(self.flatten_variable_destructuring(decl));
                continue;
            }

            let needs_loop_initializer = !in_for_in_of_head
                && decl_data.initializer.is_none()
                && self
                    .cx
                    .resolver()
                    .node_check_flags(decl)
                    .contains(NodeCheckFlags::BLOCK_SCOPED_BINDING_IN_LOOP);

            let initializer = if needs_loop_initializer {
                Some(fact.void_zero())
            } else {
                decl_data.initializer.as_ref().map(|init| self.visit(init))
            };
            let rebuilt = fact.var_decl(Rc::clone(&decl_data.name), initializer);
            declarations.push(fact.with_original(&fact.with_span(&rebuilt, decl.span), decl));
        }

        let list = fact.var_declaration_list(NodeFlags::empty(), declarations);
        let list = fact.with_span(&list, node.span);
        fact.with_original(&list, node)
    }

    fn is_for_in_of_head(&self, list: &NodeRef) -> bool {
        let Some(parent) = self.cx.get_parent_node() else {
            return false;
        };
        match &parent.kind {
            NodeKind::ForInStatement(data) | NodeKind::ForOfStatement(data) => {
                Rc::ptr_eq(&data.initializer, list)
            }
            _ => false,
        }
    }

    /// `{x}` → `{x: x}`; the value position is a synthesized clone so
    /// reference substitution can rewrite it independently.
    fn visit_shorthand_property(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::ShorthandPropertyAssignment(data) = &node.kind else {
            return self.accept_current(node);
        };
        let fact = self.cx.factory();
        let value = fact.clone_identifier(&data.name);
        let prop = fact.property_assignment(Rc::clone(&data.name), value);
        let prop = fact.with_span(&prop, node.span);
        fact.with_original(&prop, node)
    }

    /// Destructuring assignment expressions delegate to the flattener;
    /// anything else recurses.
    fn visit_binary_expression(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::Binary(data) = &node.kind else {
            return self.accept_current(node);
        };
        if data.operator == esdown_ast::BinaryOp::Assign
            && matches!(
                data.left.kind,
                NodeKind::ObjectLiteral(_) | NodeKind::ArrayLiteral(_)
            )
        {
            let needs_value = !self.parent_is_expression_statement(node);
            let flattened = self.flatten_destructuring_assignment(node, needs_value);
            let fact = self.cx.factory();
            let out = fact.paren(flattened);
            return fact.with_original(&out, node);
        }
        self.accept_current(node)
    }

    /// Whether this expression is (through any parentheses) the whole of
    /// an expression statement, so its produced value is discarded.
    fn parent_is_expression_statement(&self, _node: &NodeRef) -> bool {
        for ancestor in self.cx.ancestors().iter().rev().skip(1) {
            match &ancestor.kind {
                NodeKind::Paren(_) => continue,
                NodeKind::ExpressionStatement(_) => return true,
                _ => return false,
            }
        }
        false
    }
}

/// Rebuild a function-like node's variant with new data.
fn rebuild_function_kind(node: &NodeRef, data: esdown_ast::node::FunctionData) -> NodeKind {
    match node.syntax_kind() {
        SyntaxKind::FunctionExpression => NodeKind::FunctionExpression(data),
        SyntaxKind::FunctionDeclaration => NodeKind::FunctionDeclaration(data),
        SyntaxKind::MethodDeclaration => NodeKind::MethodDeclaration(data),
        SyntaxKind::Constructor => NodeKind::Constructor(data),
        SyntaxKind::GetAccessor => NodeKind::GetAccessor(data),
        SyntaxKind::SetAccessor => NodeKind::SetAccessor(data),
        _ => NodeKind::ArrowFunction(data),
    }
}

/// A prologue directive is an expression statement holding a bare string
/// literal (`"use strict"` and friends).
fn is_prologue_directive(node: &NodeRef) -> bool {
    match &node.kind {
        NodeKind::ExpressionStatement(stmt) => {
            matches!(stmt.expression.kind, NodeKind::StringLiteral(_))
        }
        _ => false,
    }
}
