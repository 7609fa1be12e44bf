//! Node factory.
//!
//! All nodes are built here: the factory allocates stable node ids and
//! precomputes `TransformFlags` bottom-up at construction time, so the
//! transform can gate on a single bitset test per node. Constructors
//! produce synthesized nodes (dummy span); `with_span`/`with_original`
//! attach location metadata afterwards.

use std::cell::Cell;
use std::rc::Rc;

use esdown_common::span::Span;

use crate::flags::{NodeFlags, TransformFlags};
use crate::kind::{BinaryOp, UnaryOp};
use crate::node::*;
use crate::visit::for_each_child_kind;

/// Builds AST nodes with stable ids and precomputed transform flags.
///
/// Cloning a factory shares the id counter, so every node built by any
/// clone has a unique id within the file transform.
#[derive(Clone)]
pub struct NodeFactory {
    next_id: Rc<Cell<u32>>,
}

impl NodeFactory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: Rc::new(Cell::new(0)),
        }
    }

    fn alloc_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId(id)
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn node_count(&self) -> u32 {
        self.next_id.get()
    }

    /// Core constructor: aggregates subtree flags from the children of
    /// `kind`, adds the kind's own flags, and allocates an id.
    #[must_use]
    pub fn make(
        &self,
        kind: NodeKind,
        flags: NodeFlags,
        span: Span,
        original: Option<NodeRef>,
    ) -> NodeRef {
        let mut subtree = TransformFlags::empty();
        for_each_child_kind(&kind, &mut |child: &NodeRef| {
            subtree |= child.transform_flags.as_subtree_flags()
                & !TransformFlags::subtree_exclusions(child.syntax_kind());
        });
        let own = own_transform_flags(&kind, flags, subtree);

        Rc::new(Node {
            id: self.alloc_id(),
            flags,
            transform_flags: own | subtree,
            span,
            original,
            kind,
        })
    }

    fn synth(&self, kind: NodeKind) -> NodeRef {
        self.make(kind, NodeFlags::empty(), Span::dummy(), None)
    }

    // =========================================================================
    // Metadata helpers
    // =========================================================================

    /// Re-span a node (source nodes built by a parser use this).
    #[must_use]
    pub fn with_span(&self, node: &NodeRef, span: Span) -> NodeRef {
        let mut n = (**node).clone();
        n.span = span;
        Rc::new(n)
    }

    /// Point a synthesized node at the source node it replaces.
    #[must_use]
    pub fn with_original(&self, node: &NodeRef, original: &NodeRef) -> NodeRef {
        let mut n = (**node).clone();
        n.original = Some(Rc::clone(original));
        Rc::new(n)
    }

    /// Replace a node's static flags, recomputing its transform flags
    /// (block-scope flags feed the ES6 bit of declaration lists).
    #[must_use]
    pub fn with_flags(&self, node: &NodeRef, flags: NodeFlags) -> NodeRef {
        let mut n = (**node).clone();
        let mut subtree = TransformFlags::empty();
        for_each_child_kind(&n.kind, &mut |child: &NodeRef| {
            subtree |= child.transform_flags.as_subtree_flags()
                & !TransformFlags::subtree_exclusions(child.syntax_kind());
        });
        n.flags = flags;
        n.transform_flags = own_transform_flags(&n.kind, flags, subtree) | subtree;
        Rc::new(n)
    }

    /// Rebuild a node with new children, keeping its static flags and
    /// span and recording the old node as the original.
    #[must_use]
    pub fn update(&self, old: &NodeRef, kind: NodeKind) -> NodeRef {
        self.make(kind, old.flags, old.span, Some(Rc::clone(old)))
    }

    /// Clone a source identifier as a synthesized node (fresh id, dummy
    /// span, original back-pointer).
    #[must_use]
    pub fn clone_identifier(&self, node: &NodeRef) -> NodeRef {
        debug_assert!(matches!(node.kind, NodeKind::Identifier(_)));
        self.make(
            node.kind.clone(),
            NodeFlags::empty(),
            Span::dummy(),
            Some(Rc::clone(node)),
        )
    }

    // =========================================================================
    // Names and literals
    // =========================================================================

    #[must_use]
    pub fn ident(&self, text: &str) -> NodeRef {
        self.synth(NodeKind::Identifier(Identifier { text: text.into() }))
    }

    #[must_use]
    pub fn string(&self, text: &str) -> NodeRef {
        self.synth(NodeKind::StringLiteral(LiteralText { text: text.into() }))
    }

    #[must_use]
    pub fn number(&self, text: &str) -> NodeRef {
        self.synth(NodeKind::NumericLiteral(LiteralText { text: text.into() }))
    }

    #[must_use]
    pub fn number_of(&self, value: usize) -> NodeRef {
        self.number(&value.to_string())
    }

    #[must_use]
    pub fn template_head(&self, text: &str) -> NodeRef {
        self.synth(NodeKind::TemplateHead(LiteralText { text: text.into() }))
    }

    #[must_use]
    pub fn template_middle(&self, text: &str) -> NodeRef {
        self.synth(NodeKind::TemplateMiddle(LiteralText { text: text.into() }))
    }

    #[must_use]
    pub fn template_tail(&self, text: &str) -> NodeRef {
        self.synth(NodeKind::TemplateTail(LiteralText { text: text.into() }))
    }

    #[must_use]
    pub fn no_sub_template(&self, text: &str) -> NodeRef {
        self.synth(NodeKind::NoSubstitutionTemplateLiteral(LiteralText {
            text: text.into(),
        }))
    }

    #[must_use]
    pub fn true_lit(&self) -> NodeRef {
        self.synth(NodeKind::TrueLiteral)
    }

    #[must_use]
    pub fn false_lit(&self) -> NodeRef {
        self.synth(NodeKind::FalseLiteral)
    }

    #[must_use]
    pub fn null_lit(&self) -> NodeRef {
        self.synth(NodeKind::NullLiteral)
    }

    #[must_use]
    pub fn this_expr(&self) -> NodeRef {
        self.synth(NodeKind::ThisExpression)
    }

    #[must_use]
    pub fn super_expr(&self) -> NodeRef {
        self.synth(NodeKind::SuperExpression)
    }

    #[must_use]
    pub fn computed_property_name(&self, expression: NodeRef) -> NodeRef {
        self.synth(NodeKind::ComputedPropertyName(Unary { expression }))
    }

    // =========================================================================
    // Binding patterns and parameters
    // =========================================================================

    #[must_use]
    pub fn object_binding_pattern(&self, elements: Vec<NodeRef>) -> NodeRef {
        self.synth(NodeKind::ObjectBindingPattern(PatternData { elements }))
    }

    #[must_use]
    pub fn array_binding_pattern(&self, elements: Vec<NodeRef>) -> NodeRef {
        self.synth(NodeKind::ArrayBindingPattern(PatternData { elements }))
    }

    #[must_use]
    pub fn binding_element(
        &self,
        property_name: Option<NodeRef>,
        name: NodeRef,
        initializer: Option<NodeRef>,
    ) -> NodeRef {
        self.synth(NodeKind::BindingElement(BindingElementData {
            property_name,
            name,
            initializer,
            dot_dot_dot: false,
        }))
    }

    #[must_use]
    pub fn rest_binding_element(&self, name: NodeRef) -> NodeRef {
        self.synth(NodeKind::BindingElement(BindingElementData {
            property_name: None,
            name,
            initializer: None,
            dot_dot_dot: true,
        }))
    }

    #[must_use]
    pub fn parameter(&self, name: NodeRef) -> NodeRef {
        self.synth(NodeKind::Parameter(ParameterData {
            name,
            initializer: None,
            dot_dot_dot: false,
        }))
    }

    #[must_use]
    pub fn parameter_with(
        &self,
        name: NodeRef,
        initializer: Option<NodeRef>,
        dot_dot_dot: bool,
    ) -> NodeRef {
        self.synth(NodeKind::Parameter(ParameterData {
            name,
            initializer,
            dot_dot_dot,
        }))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    #[must_use]
    pub fn array(&self, elements: Vec<NodeRef>) -> NodeRef {
        self.synth(NodeKind::ArrayLiteral(ElementsData { elements }))
    }

    #[must_use]
    pub fn object(&self, properties: Vec<NodeRef>) -> NodeRef {
        self.synth(NodeKind::ObjectLiteral(ElementsData {
            elements: properties,
        }))
    }

    #[must_use]
    pub fn prop_access(&self, expression: NodeRef, name: NodeRef) -> NodeRef {
        self.synth(NodeKind::PropertyAccess(PropertyAccessData {
            expression,
            name,
        }))
    }

    /// Convenience: property access with a fresh identifier name.
    #[must_use]
    pub fn prop(&self, expression: NodeRef, name: &str) -> NodeRef {
        let name = self.ident(name);
        self.prop_access(expression, name)
    }

    #[must_use]
    pub fn elem_access(&self, expression: NodeRef, argument_expression: NodeRef) -> NodeRef {
        self.synth(NodeKind::ElementAccess(ElementAccessData {
            expression,
            argument_expression,
        }))
    }

    #[must_use]
    pub fn call(&self, expression: NodeRef, arguments: Vec<NodeRef>) -> NodeRef {
        self.synth(NodeKind::Call(CallData {
            expression,
            arguments,
        }))
    }

    #[must_use]
    pub fn new_expr(&self, expression: NodeRef, arguments: Vec<NodeRef>) -> NodeRef {
        self.synth(NodeKind::New(CallData {
            expression,
            arguments,
        }))
    }

    #[must_use]
    pub fn tagged_template(&self, tag: NodeRef, template: NodeRef) -> NodeRef {
        self.synth(NodeKind::TaggedTemplate(TaggedTemplateData { tag, template }))
    }

    #[must_use]
    pub fn paren(&self, expression: NodeRef) -> NodeRef {
        self.synth(NodeKind::Paren(Unary { expression }))
    }

    #[must_use]
    pub fn func_expr(
        &self,
        name: Option<NodeRef>,
        parameters: Vec<NodeRef>,
        body: NodeRef,
    ) -> NodeRef {
        self.synth(NodeKind::FunctionExpression(FunctionData {
            name,
            parameters,
            body: Some(body),
        }))
    }

    #[must_use]
    pub fn arrow(&self, parameters: Vec<NodeRef>, body: NodeRef) -> NodeRef {
        self.synth(NodeKind::ArrowFunction(FunctionData {
            name: None,
            parameters,
            body: Some(body),
        }))
    }

    #[must_use]
    pub fn func_decl(&self, name: NodeRef, parameters: Vec<NodeRef>, body: NodeRef) -> NodeRef {
        self.synth(NodeKind::FunctionDeclaration(FunctionData {
            name: Some(name),
            parameters,
            body: Some(body),
        }))
    }

    #[must_use]
    pub fn delete_expr(&self, expression: NodeRef) -> NodeRef {
        self.synth(NodeKind::DeleteExpression(Unary { expression }))
    }

    #[must_use]
    pub fn type_of(&self, expression: NodeRef) -> NodeRef {
        self.synth(NodeKind::TypeOfExpression(Unary { expression }))
    }

    #[must_use]
    pub fn void_expr(&self, expression: NodeRef) -> NodeRef {
        self.synth(NodeKind::VoidExpression(Unary { expression }))
    }

    /// The canonical `void 0` undefined value.
    #[must_use]
    pub fn void_zero(&self) -> NodeRef {
        let zero = self.number("0");
        self.void_expr(zero)
    }

    #[must_use]
    pub fn prefix(&self, operator: UnaryOp, operand: NodeRef) -> NodeRef {
        self.synth(NodeKind::PrefixUnary(PrefixUnaryData { operator, operand }))
    }

    #[must_use]
    pub fn postfix(&self, operand: NodeRef, operator: UnaryOp) -> NodeRef {
        self.synth(NodeKind::PostfixUnary(PostfixUnaryData { operator, operand }))
    }

    #[must_use]
    pub fn binary(&self, left: NodeRef, operator: BinaryOp, right: NodeRef) -> NodeRef {
        self.synth(NodeKind::Binary(BinaryData {
            left,
            operator,
            right,
        }))
    }

    #[must_use]
    pub fn assign(&self, left: NodeRef, right: NodeRef) -> NodeRef {
        self.binary(left, BinaryOp::Assign, right)
    }

    #[must_use]
    pub fn comma(&self, left: NodeRef, right: NodeRef) -> NodeRef {
        self.binary(left, BinaryOp::Comma, right)
    }

    /// Strict-equality comparison against `void 0`.
    #[must_use]
    pub fn is_void_zero_check(&self, expression: NodeRef) -> NodeRef {
        let undef = self.void_zero();
        self.binary(expression, BinaryOp::EqEqEq, undef)
    }

    #[must_use]
    pub fn conditional(
        &self,
        condition: NodeRef,
        when_true: NodeRef,
        when_false: NodeRef,
    ) -> NodeRef {
        self.synth(NodeKind::Conditional(ConditionalData {
            condition,
            when_true,
            when_false,
        }))
    }

    #[must_use]
    pub fn template_expression(&self, head: NodeRef, spans: Vec<NodeRef>) -> NodeRef {
        self.synth(NodeKind::TemplateExpression(TemplateExpressionData {
            head,
            spans,
        }))
    }

    #[must_use]
    pub fn template_span(&self, expression: NodeRef, literal: NodeRef) -> NodeRef {
        self.synth(NodeKind::TemplateSpan(TemplateSpanData {
            expression,
            literal,
        }))
    }

    #[must_use]
    pub fn class_expr(
        &self,
        name: Option<NodeRef>,
        heritage: Option<NodeRef>,
        members: Vec<NodeRef>,
    ) -> NodeRef {
        self.synth(NodeKind::ClassExpression(ClassData {
            name,
            heritage,
            members,
        }))
    }

    #[must_use]
    pub fn class_decl(
        &self,
        name: NodeRef,
        heritage: Option<NodeRef>,
        members: Vec<NodeRef>,
    ) -> NodeRef {
        self.synth(NodeKind::ClassDeclaration(ClassData {
            name: Some(name),
            heritage,
            members,
        }))
    }

    #[must_use]
    pub fn spread(&self, expression: NodeRef) -> NodeRef {
        self.synth(NodeKind::SpreadElement(Unary { expression }))
    }

    #[must_use]
    pub fn property_assignment(&self, name: NodeRef, initializer: NodeRef) -> NodeRef {
        self.synth(NodeKind::PropertyAssignment(PropertyAssignmentData {
            name,
            initializer,
        }))
    }

    #[must_use]
    pub fn shorthand(&self, name: NodeRef) -> NodeRef {
        self.synth(NodeKind::ShorthandPropertyAssignment(ShorthandData { name }))
    }

    // =========================================================================
    // Statements and declarations
    // =========================================================================

    #[must_use]
    pub fn source_file(&self, file_name: &str, text: &str, statements: Vec<NodeRef>) -> NodeRef {
        self.synth(NodeKind::SourceFile(SourceFileData {
            file_name: file_name.into(),
            text: text.into(),
            statements,
        }))
    }

    #[must_use]
    pub fn block(&self, statements: Vec<NodeRef>) -> NodeRef {
        self.synth(NodeKind::Block(StatementsData { statements }))
    }

    #[must_use]
    pub fn var_stmt(&self, declaration_list: NodeRef) -> NodeRef {
        self.synth(NodeKind::VariableStatement(VariableStatementData {
            declaration_list,
        }))
    }

    /// Convenience: a plain `var` statement from declarations.
    #[must_use]
    pub fn var_statement(&self, declarations: Vec<NodeRef>) -> NodeRef {
        let list = self.var_declaration_list(NodeFlags::empty(), declarations);
        self.var_stmt(list)
    }

    #[must_use]
    pub fn var_declaration_list(&self, flags: NodeFlags, declarations: Vec<NodeRef>) -> NodeRef {
        self.make(
            NodeKind::VariableDeclarationList(DeclarationsData { declarations }),
            flags,
            Span::dummy(),
            None,
        )
    }

    #[must_use]
    pub fn var_decl(&self, name: NodeRef, initializer: Option<NodeRef>) -> NodeRef {
        self.synth(NodeKind::VariableDeclaration(VariableDeclarationData {
            name,
            initializer,
        }))
    }

    #[must_use]
    pub fn var_decl_named(&self, name: &str, initializer: Option<NodeRef>) -> NodeRef {
        let name = self.ident(name);
        self.var_decl(name, initializer)
    }

    #[must_use]
    pub fn empty_statement(&self) -> NodeRef {
        self.synth(NodeKind::EmptyStatement)
    }

    #[must_use]
    pub fn expr_stmt(&self, expression: NodeRef) -> NodeRef {
        self.synth(NodeKind::ExpressionStatement(Unary { expression }))
    }

    #[must_use]
    pub fn if_stmt(
        &self,
        expression: NodeRef,
        then_statement: NodeRef,
        else_statement: Option<NodeRef>,
    ) -> NodeRef {
        self.synth(NodeKind::IfStatement(IfData {
            expression,
            then_statement,
            else_statement,
        }))
    }

    #[must_use]
    pub fn do_stmt(&self, statement: NodeRef, expression: NodeRef) -> NodeRef {
        self.synth(NodeKind::DoStatement(DoWhileData {
            expression,
            statement,
        }))
    }

    #[must_use]
    pub fn while_stmt(&self, expression: NodeRef, statement: NodeRef) -> NodeRef {
        self.synth(NodeKind::WhileStatement(DoWhileData {
            expression,
            statement,
        }))
    }

    #[must_use]
    pub fn for_stmt(
        &self,
        initializer: Option<NodeRef>,
        condition: Option<NodeRef>,
        incrementor: Option<NodeRef>,
        statement: NodeRef,
    ) -> NodeRef {
        self.synth(NodeKind::ForStatement(ForData {
            initializer,
            condition,
            incrementor,
            statement,
        }))
    }

    #[must_use]
    pub fn for_in(&self, initializer: NodeRef, expression: NodeRef, statement: NodeRef) -> NodeRef {
        self.synth(NodeKind::ForInStatement(ForInOfData {
            initializer,
            expression,
            statement,
        }))
    }

    #[must_use]
    pub fn for_of(&self, initializer: NodeRef, expression: NodeRef, statement: NodeRef) -> NodeRef {
        self.synth(NodeKind::ForOfStatement(ForInOfData {
            initializer,
            expression,
            statement,
        }))
    }

    #[must_use]
    pub fn continue_stmt(&self, label: Option<NodeRef>) -> NodeRef {
        self.synth(NodeKind::ContinueStatement(JumpData { label }))
    }

    #[must_use]
    pub fn break_stmt(&self, label: Option<NodeRef>) -> NodeRef {
        self.synth(NodeKind::BreakStatement(JumpData { label }))
    }

    #[must_use]
    pub fn ret(&self, expression: Option<NodeRef>) -> NodeRef {
        self.synth(NodeKind::ReturnStatement(OptionalExprData { expression }))
    }

    #[must_use]
    pub fn labeled(&self, label: NodeRef, statement: NodeRef) -> NodeRef {
        self.synth(NodeKind::LabeledStatement(LabeledData { label, statement }))
    }

    #[must_use]
    pub fn switch_stmt(&self, expression: NodeRef, clauses: Vec<NodeRef>) -> NodeRef {
        self.synth(NodeKind::SwitchStatement(SwitchData {
            expression,
            clauses,
        }))
    }

    #[must_use]
    pub fn case_clause(&self, expression: NodeRef, statements: Vec<NodeRef>) -> NodeRef {
        self.synth(NodeKind::CaseClause(CaseClauseData {
            expression,
            statements,
        }))
    }

    #[must_use]
    pub fn default_clause(&self, statements: Vec<NodeRef>) -> NodeRef {
        self.synth(NodeKind::DefaultClause(StatementsData { statements }))
    }

    #[must_use]
    pub fn throw_stmt(&self, expression: NodeRef) -> NodeRef {
        self.synth(NodeKind::ThrowStatement(Unary { expression }))
    }

    #[must_use]
    pub fn try_stmt(
        &self,
        try_block: NodeRef,
        catch_clause: Option<NodeRef>,
        finally_block: Option<NodeRef>,
    ) -> NodeRef {
        self.synth(NodeKind::TryStatement(TryData {
            try_block,
            catch_clause,
            finally_block,
        }))
    }

    #[must_use]
    pub fn catch_clause(&self, variable_declaration: NodeRef, block: NodeRef) -> NodeRef {
        self.synth(NodeKind::CatchClause(CatchData {
            variable_declaration,
            block,
        }))
    }

    // =========================================================================
    // Class members
    // =========================================================================

    #[must_use]
    pub fn constructor_decl(&self, parameters: Vec<NodeRef>, body: NodeRef) -> NodeRef {
        self.synth(NodeKind::Constructor(FunctionData {
            name: None,
            parameters,
            body: Some(body),
        }))
    }

    #[must_use]
    pub fn method(&self, name: NodeRef, parameters: Vec<NodeRef>, body: NodeRef) -> NodeRef {
        self.synth(NodeKind::MethodDeclaration(FunctionData {
            name: Some(name),
            parameters,
            body: Some(body),
        }))
    }

    #[must_use]
    pub fn get_accessor(&self, name: NodeRef, body: NodeRef) -> NodeRef {
        self.synth(NodeKind::GetAccessor(FunctionData {
            name: Some(name),
            parameters: Vec::new(),
            body: Some(body),
        }))
    }

    #[must_use]
    pub fn set_accessor(&self, name: NodeRef, parameters: Vec<NodeRef>, body: NodeRef) -> NodeRef {
        self.synth(NodeKind::SetAccessor(FunctionData {
            name: Some(name),
            parameters,
            body: Some(body),
        }))
    }

    #[must_use]
    pub fn semicolon_class_element(&self) -> NodeRef {
        self.synth(NodeKind::SemicolonClassElement)
    }
}

impl Default for NodeFactory {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Per-kind transform flags
// =============================================================================

fn parameter_needs_rewrite(param: &NodeRef) -> bool {
    match &param.kind {
        NodeKind::Parameter(p) => {
            p.dot_dot_dot || p.initializer.is_some() || p.name.is_binding_pattern()
        }
        _ => false,
    }
}

fn is_spread(node: &NodeRef) -> bool {
    matches!(node.kind, NodeKind::SpreadElement(_))
}

fn is_super(node: &NodeRef) -> bool {
    matches!(node.kind, NodeKind::SuperExpression)
}

fn has_computed_name(member: &NodeRef) -> bool {
    let name = match &member.kind {
        NodeKind::PropertyAssignment(p) => Some(&p.name),
        NodeKind::MethodDeclaration(f)
        | NodeKind::GetAccessor(f)
        | NodeKind::SetAccessor(f) => f.name.as_ref(),
        _ => None,
    };
    name.is_some_and(|n| matches!(n.kind, NodeKind::ComputedPropertyName(_)))
}

/// The flags a node asserts about itself, given its payload, static flags
/// and aggregated subtree flags. This is the single source of truth the
/// dispatcher's three-way gate rests on.
fn own_transform_flags(
    kind: &NodeKind,
    flags: NodeFlags,
    subtree: TransformFlags,
) -> TransformFlags {
    match kind {
        NodeKind::ThisExpression => TransformFlags::LEXICAL_THIS,
        NodeKind::SuperExpression
        | NodeKind::ComputedPropertyName(_)
        | NodeKind::ObjectBindingPattern(_)
        | NodeKind::ArrayBindingPattern(_)
        | NodeKind::ForOfStatement(_)
        | NodeKind::TemplateExpression(_)
        | NodeKind::NoSubstitutionTemplateLiteral(_)
        | NodeKind::TaggedTemplate(_)
        | NodeKind::ShorthandPropertyAssignment(_)
        | NodeKind::ClassDeclaration(_)
        | NodeKind::ClassExpression(_) => TransformFlags::ES6,

        NodeKind::SpreadElement(_) => {
            TransformFlags::ES6 | TransformFlags::CONTAINS_SPREAD_ELEMENT_EXPRESSION
        }

        NodeKind::Parameter(p) => {
            let mut out = TransformFlags::empty();
            if p.initializer.is_some() {
                out |= TransformFlags::ES6 | TransformFlags::CONTAINS_DEFAULT_VALUE_ASSIGNMENTS;
            }
            if p.dot_dot_dot || p.name.is_binding_pattern() {
                out |= TransformFlags::ES6;
            }
            out
        }

        NodeKind::ArrowFunction(_) => {
            let mut out = TransformFlags::ES6;
            if subtree.intersects(TransformFlags::CONTAINS_LEXICAL_THIS) {
                out |= TransformFlags::CONTAINS_CAPTURED_LEXICAL_THIS;
            }
            out
        }

        NodeKind::FunctionExpression(f)
        | NodeKind::FunctionDeclaration(f)
        | NodeKind::Constructor(f)
        | NodeKind::GetAccessor(f)
        | NodeKind::SetAccessor(f) => {
            let mut out = TransformFlags::empty();
            if f.parameters.iter().any(parameter_needs_rewrite)
                || subtree.intersects(TransformFlags::CONTAINS_CAPTURED_LEXICAL_THIS)
            {
                out |= TransformFlags::ES6;
            }
            out
        }

        // Shorthand method syntax is ES6 wherever it appears.
        NodeKind::MethodDeclaration(_) => TransformFlags::ES6,

        NodeKind::Call(call) => {
            let super_callee = is_super(&call.expression)
                || matches!(
                    &call.expression.kind,
                    NodeKind::PropertyAccess(p) if is_super(&p.expression)
                )
                || matches!(
                    &call.expression.kind,
                    NodeKind::ElementAccess(e) if is_super(&e.expression)
                );
            if super_callee || call.arguments.iter().any(is_spread) {
                TransformFlags::ES6
            } else {
                TransformFlags::empty()
            }
        }

        NodeKind::New(call) => {
            if call.arguments.iter().any(is_spread) {
                TransformFlags::ES6
            } else {
                TransformFlags::empty()
            }
        }

        NodeKind::ArrayLiteral(arr) => {
            if arr.elements.iter().any(is_spread) {
                TransformFlags::ES6
            } else {
                TransformFlags::empty()
            }
        }

        NodeKind::PropertyAccess(p) if is_super(&p.expression) => TransformFlags::ES6,
        NodeKind::ElementAccess(e) if is_super(&e.expression) => TransformFlags::ES6,

        // Destructuring assignment: array/object literal syntax on the
        // left of `=`.
        NodeKind::Binary(b)
            if b.operator == BinaryOp::Assign
                && matches!(
                    b.left.kind,
                    NodeKind::ObjectLiteral(_) | NodeKind::ArrayLiteral(_)
                ) =>
        {
            TransformFlags::ES6
        }

        NodeKind::ObjectLiteral(obj) => {
            if obj.elements.iter().any(has_computed_name) {
                TransformFlags::ES6
            } else {
                TransformFlags::empty()
            }
        }

        NodeKind::VariableDeclarationList(_) => {
            if flags.is_block_scoped() {
                TransformFlags::ES6
            } else {
                TransformFlags::empty()
            }
        }

        NodeKind::VariableDeclaration(decl) => {
            if decl.name.is_binding_pattern() {
                TransformFlags::ES6
            } else {
                TransformFlags::empty()
            }
        }

        _ => TransformFlags::empty(),
    }
}
