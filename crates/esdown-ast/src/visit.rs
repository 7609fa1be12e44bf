//! Generic child traversal.
//!
//! `for_each_child` enumerates a node's children in source order;
//! `visit_each_child` is the structural copy-visitor: it rebuilds a node
//! with each child replaced by the visitor's result, returning the input
//! node itself (shared by reference) when no child changed.

use std::rc::Rc;

use crate::factory::NodeFactory;
use crate::node::*;

fn opt(f: &mut dyn FnMut(&NodeRef), n: &Option<NodeRef>) {
    if let Some(n) = n {
        f(n);
    }
}

fn all(f: &mut dyn FnMut(&NodeRef), ns: &[NodeRef]) {
    for n in ns {
        f(n);
    }
}

/// Invoke `f` for each child of `kind`, left to right in source order.
pub fn for_each_child_kind(kind: &NodeKind, f: &mut dyn FnMut(&NodeRef)) {
    match kind {
        NodeKind::Identifier(_)
        | NodeKind::StringLiteral(_)
        | NodeKind::NumericLiteral(_)
        | NodeKind::RegularExpressionLiteral(_)
        | NodeKind::NoSubstitutionTemplateLiteral(_)
        | NodeKind::TemplateHead(_)
        | NodeKind::TemplateMiddle(_)
        | NodeKind::TemplateTail(_)
        | NodeKind::TrueLiteral
        | NodeKind::FalseLiteral
        | NodeKind::NullLiteral
        | NodeKind::ThisExpression
        | NodeKind::SuperExpression
        | NodeKind::EmptyStatement
        | NodeKind::SemicolonClassElement => {}

        NodeKind::ComputedPropertyName(u)
        | NodeKind::Paren(u)
        | NodeKind::DeleteExpression(u)
        | NodeKind::TypeOfExpression(u)
        | NodeKind::VoidExpression(u)
        | NodeKind::SpreadElement(u)
        | NodeKind::ExpressionStatement(u)
        | NodeKind::ThrowStatement(u) => f(&u.expression),

        NodeKind::ObjectBindingPattern(p) | NodeKind::ArrayBindingPattern(p) => {
            all(f, &p.elements);
        }

        NodeKind::BindingElement(b) => {
            opt(f, &b.property_name);
            f(&b.name);
            opt(f, &b.initializer);
        }

        NodeKind::Parameter(p) => {
            f(&p.name);
            opt(f, &p.initializer);
        }

        NodeKind::ArrayLiteral(e) | NodeKind::ObjectLiteral(e) => all(f, &e.elements),

        NodeKind::PropertyAccess(p) => {
            f(&p.expression);
            f(&p.name);
        }

        NodeKind::ElementAccess(e) => {
            f(&e.expression);
            f(&e.argument_expression);
        }

        NodeKind::Call(c) | NodeKind::New(c) => {
            f(&c.expression);
            all(f, &c.arguments);
        }

        NodeKind::TaggedTemplate(t) => {
            f(&t.tag);
            f(&t.template);
        }

        NodeKind::FunctionExpression(func)
        | NodeKind::ArrowFunction(func)
        | NodeKind::FunctionDeclaration(func)
        | NodeKind::Constructor(func)
        | NodeKind::MethodDeclaration(func)
        | NodeKind::GetAccessor(func)
        | NodeKind::SetAccessor(func) => {
            opt(f, &func.name);
            all(f, &func.parameters);
            opt(f, &func.body);
        }

        NodeKind::PrefixUnary(p) => f(&p.operand),
        NodeKind::PostfixUnary(p) => f(&p.operand),

        NodeKind::Binary(b) => {
            f(&b.left);
            f(&b.right);
        }

        NodeKind::Conditional(c) => {
            f(&c.condition);
            f(&c.when_true);
            f(&c.when_false);
        }

        NodeKind::TemplateExpression(t) => {
            f(&t.head);
            all(f, &t.spans);
        }

        NodeKind::TemplateSpan(s) => {
            f(&s.expression);
            f(&s.literal);
        }

        NodeKind::ClassExpression(c) | NodeKind::ClassDeclaration(c) => {
            opt(f, &c.name);
            opt(f, &c.heritage);
            all(f, &c.members);
        }

        NodeKind::PropertyAssignment(p) => {
            f(&p.name);
            f(&p.initializer);
        }

        NodeKind::ShorthandPropertyAssignment(s) => f(&s.name),

        NodeKind::SourceFile(s) => all(f, &s.statements),
        NodeKind::Block(b) | NodeKind::DefaultClause(b) => all(f, &b.statements),

        NodeKind::VariableStatement(v) => f(&v.declaration_list),
        NodeKind::VariableDeclarationList(d) => all(f, &d.declarations),

        NodeKind::VariableDeclaration(d) => {
            f(&d.name);
            opt(f, &d.initializer);
        }

        NodeKind::IfStatement(i) => {
            f(&i.expression);
            f(&i.then_statement);
            opt(f, &i.else_statement);
        }

        NodeKind::DoStatement(d) => {
            f(&d.statement);
            f(&d.expression);
        }

        NodeKind::WhileStatement(w) => {
            f(&w.expression);
            f(&w.statement);
        }

        NodeKind::ForStatement(fo) => {
            opt(f, &fo.initializer);
            opt(f, &fo.condition);
            opt(f, &fo.incrementor);
            f(&fo.statement);
        }

        NodeKind::ForInStatement(fo) | NodeKind::ForOfStatement(fo) => {
            f(&fo.initializer);
            f(&fo.expression);
            f(&fo.statement);
        }

        NodeKind::ContinueStatement(j) | NodeKind::BreakStatement(j) => opt(f, &j.label),

        NodeKind::ReturnStatement(r) => opt(f, &r.expression),

        NodeKind::LabeledStatement(l) => {
            f(&l.label);
            f(&l.statement);
        }

        NodeKind::SwitchStatement(s) => {
            f(&s.expression);
            all(f, &s.clauses);
        }

        NodeKind::CaseClause(c) => {
            f(&c.expression);
            all(f, &c.statements);
        }

        NodeKind::TryStatement(t) => {
            f(&t.try_block);
            opt(f, &t.catch_clause);
            opt(f, &t.finally_block);
        }

        NodeKind::CatchClause(c) => {
            f(&c.variable_declaration);
            f(&c.block);
        }
    }
}

/// Invoke `f` for each child of `node`, left to right in source order.
pub fn for_each_child(node: &Node, f: &mut dyn FnMut(&NodeRef)) {
    for_each_child_kind(&node.kind, f);
}

/// Walk an entire subtree in pre-order, node first, then children.
pub fn walk(node: &NodeRef, f: &mut dyn FnMut(&NodeRef)) {
    f(node);
    for_each_child_kind(&node.kind, &mut |child| walk(child, f));
}

struct ChildVisitor<'a> {
    visitor: &'a mut dyn FnMut(&NodeRef) -> NodeRef,
    changed: bool,
}

impl<'a> ChildVisitor<'a> {
    fn one(&mut self, node: &NodeRef) -> NodeRef {
        let out = (self.visitor)(node);
        if !Rc::ptr_eq(&out, node) {
            self.changed = true;
        }
        out
    }

    fn opt(&mut self, node: &Option<NodeRef>) -> Option<NodeRef> {
        node.as_ref().map(|n| self.one(n))
    }

    fn vec(&mut self, nodes: &[NodeRef]) -> Vec<NodeRef> {
        nodes.iter().map(|n| self.one(n)).collect()
    }
}

/// Rebuild `node` with each child replaced by `visitor`'s result.
///
/// Returns the input node (shared by reference) when no child changed,
/// which is what keeps clean subtrees shared in the output tree.
pub fn visit_each_child(
    factory: &NodeFactory,
    node: &NodeRef,
    visitor: &mut dyn FnMut(&NodeRef) -> NodeRef,
) -> NodeRef {
    let mut cv = ChildVisitor {
        visitor,
        changed: false,
    };

    let kind = match &node.kind {
        NodeKind::Identifier(_)
        | NodeKind::StringLiteral(_)
        | NodeKind::NumericLiteral(_)
        | NodeKind::RegularExpressionLiteral(_)
        | NodeKind::NoSubstitutionTemplateLiteral(_)
        | NodeKind::TemplateHead(_)
        | NodeKind::TemplateMiddle(_)
        | NodeKind::TemplateTail(_)
        | NodeKind::TrueLiteral
        | NodeKind::FalseLiteral
        | NodeKind::NullLiteral
        | NodeKind::ThisExpression
        | NodeKind::SuperExpression
        | NodeKind::EmptyStatement
        | NodeKind::SemicolonClassElement => return Rc::clone(node),

        NodeKind::ComputedPropertyName(u) => NodeKind::ComputedPropertyName(Unary {
            expression: cv.one(&u.expression),
        }),
        NodeKind::Paren(u) => NodeKind::Paren(Unary {
            expression: cv.one(&u.expression),
        }),
        NodeKind::DeleteExpression(u) => NodeKind::DeleteExpression(Unary {
            expression: cv.one(&u.expression),
        }),
        NodeKind::TypeOfExpression(u) => NodeKind::TypeOfExpression(Unary {
            expression: cv.one(&u.expression),
        }),
        NodeKind::VoidExpression(u) => NodeKind::VoidExpression(Unary {
            expression: cv.one(&u.expression),
        }),
        NodeKind::SpreadElement(u) => NodeKind::SpreadElement(Unary {
            expression: cv.one(&u.expression),
        }),
        NodeKind::ExpressionStatement(u) => NodeKind::ExpressionStatement(Unary {
            expression: cv.one(&u.expression),
        }),
        NodeKind::ThrowStatement(u) => NodeKind::ThrowStatement(Unary {
            expression: cv.one(&u.expression),
        }),

        NodeKind::ObjectBindingPattern(p) => NodeKind::ObjectBindingPattern(PatternData {
            elements: cv.vec(&p.elements),
        }),
        NodeKind::ArrayBindingPattern(p) => NodeKind::ArrayBindingPattern(PatternData {
            elements: cv.vec(&p.elements),
        }),

        NodeKind::BindingElement(b) => NodeKind::BindingElement(BindingElementData {
            property_name: cv.opt(&b.property_name),
            name: cv.one(&b.name),
            initializer: cv.opt(&b.initializer),
            dot_dot_dot: b.dot_dot_dot,
        }),

        NodeKind::Parameter(p) => NodeKind::Parameter(ParameterData {
            name: cv.one(&p.name),
            initializer: cv.opt(&p.initializer),
            dot_dot_dot: p.dot_dot_dot,
        }),

        NodeKind::ArrayLiteral(e) => NodeKind::ArrayLiteral(ElementsData {
            elements: cv.vec(&e.elements),
        }),
        NodeKind::ObjectLiteral(e) => NodeKind::ObjectLiteral(ElementsData {
            elements: cv.vec(&e.elements),
        }),

        NodeKind::PropertyAccess(p) => NodeKind::PropertyAccess(PropertyAccessData {
            expression: cv.one(&p.expression),
            name: cv.one(&p.name),
        }),

        NodeKind::ElementAccess(e) => NodeKind::ElementAccess(ElementAccessData {
            expression: cv.one(&e.expression),
            argument_expression: cv.one(&e.argument_expression),
        }),

        NodeKind::Call(c) => NodeKind::Call(CallData {
            expression: cv.one(&c.expression),
            arguments: cv.vec(&c.arguments),
        }),
        NodeKind::New(c) => NodeKind::New(CallData {
            expression: cv.one(&c.expression),
            arguments: cv.vec(&c.arguments),
        }),

        NodeKind::TaggedTemplate(t) => NodeKind::TaggedTemplate(TaggedTemplateData {
            tag: cv.one(&t.tag),
            template: cv.one(&t.template),
        }),

        NodeKind::FunctionExpression(func) => {
            NodeKind::FunctionExpression(visit_function_data(&mut cv, func))
        }
        NodeKind::ArrowFunction(func) => {
            NodeKind::ArrowFunction(visit_function_data(&mut cv, func))
        }
        NodeKind::FunctionDeclaration(func) => {
            NodeKind::FunctionDeclaration(visit_function_data(&mut cv, func))
        }
        NodeKind::Constructor(func) => NodeKind::Constructor(visit_function_data(&mut cv, func)),
        NodeKind::MethodDeclaration(func) => {
            NodeKind::MethodDeclaration(visit_function_data(&mut cv, func))
        }
        NodeKind::GetAccessor(func) => NodeKind::GetAccessor(visit_function_data(&mut cv, func)),
        NodeKind::SetAccessor(func) => NodeKind::SetAccessor(visit_function_data(&mut cv, func)),

        NodeKind::PrefixUnary(p) => NodeKind::PrefixUnary(PrefixUnaryData {
            operator: p.operator,
            operand: cv.one(&p.operand),
        }),
        NodeKind::PostfixUnary(p) => NodeKind::PostfixUnary(PostfixUnaryData {
            operator: p.operator,
            operand: cv.one(&p.operand),
        }),

        NodeKind::Binary(b) => NodeKind::Binary(BinaryData {
            left: cv.one(&b.left),
            operator: b.operator,
            right: cv.one(&b.right),
        }),

        NodeKind::Conditional(c) => NodeKind::Conditional(ConditionalData {
            condition: cv.one(&c.condition),
            when_true: cv.one(&c.when_true),
            when_false: cv.one(&c.when_false),
        }),

        NodeKind::TemplateExpression(t) => NodeKind::TemplateExpression(TemplateExpressionData {
            head: cv.one(&t.head),
            spans: cv.vec(&t.spans),
        }),

        NodeKind::TemplateSpan(s) => NodeKind::TemplateSpan(TemplateSpanData {
            expression: cv.one(&s.expression),
            literal: cv.one(&s.literal),
        }),

        NodeKind::ClassExpression(c) => NodeKind::ClassExpression(visit_class_data(&mut cv, c)),
        NodeKind::ClassDeclaration(c) => NodeKind::ClassDeclaration(visit_class_data(&mut cv, c)),

        NodeKind::PropertyAssignment(p) => NodeKind::PropertyAssignment(PropertyAssignmentData {
            name: cv.one(&p.name),
            initializer: cv.one(&p.initializer),
        }),

        NodeKind::ShorthandPropertyAssignment(s) => {
            NodeKind::ShorthandPropertyAssignment(ShorthandData {
                name: cv.one(&s.name),
            })
        }

        NodeKind::SourceFile(s) => NodeKind::SourceFile(SourceFileData {
            file_name: Rc::clone(&s.file_name),
            text: Rc::clone(&s.text),
            statements: cv.vec(&s.statements),
        }),

        NodeKind::Block(b) => NodeKind::Block(StatementsData {
            statements: cv.vec(&b.statements),
        }),
        NodeKind::DefaultClause(b) => NodeKind::DefaultClause(StatementsData {
            statements: cv.vec(&b.statements),
        }),

        NodeKind::VariableStatement(v) => NodeKind::VariableStatement(VariableStatementData {
            declaration_list: cv.one(&v.declaration_list),
        }),

        NodeKind::VariableDeclarationList(d) => {
            NodeKind::VariableDeclarationList(DeclarationsData {
                declarations: cv.vec(&d.declarations),
            })
        }

        NodeKind::VariableDeclaration(d) => NodeKind::VariableDeclaration(VariableDeclarationData {
            name: cv.one(&d.name),
            initializer: cv.opt(&d.initializer),
        }),

        NodeKind::IfStatement(i) => NodeKind::IfStatement(IfData {
            expression: cv.one(&i.expression),
            then_statement: cv.one(&i.then_statement),
            else_statement: cv.opt(&i.else_statement),
        }),

        NodeKind::DoStatement(d) => NodeKind::DoStatement(DoWhileData {
            statement: cv.one(&d.statement),
            expression: cv.one(&d.expression),
        }),

        NodeKind::WhileStatement(w) => NodeKind::WhileStatement(DoWhileData {
            expression: cv.one(&w.expression),
            statement: cv.one(&w.statement),
        }),

        NodeKind::ForStatement(fo) => NodeKind::ForStatement(ForData {
            initializer: cv.opt(&fo.initializer),
            condition: cv.opt(&fo.condition),
            incrementor: cv.opt(&fo.incrementor),
            statement: cv.one(&fo.statement),
        }),

        NodeKind::ForInStatement(fo) => NodeKind::ForInStatement(ForInOfData {
            initializer: cv.one(&fo.initializer),
            expression: cv.one(&fo.expression),
            statement: cv.one(&fo.statement),
        }),
        NodeKind::ForOfStatement(fo) => NodeKind::ForOfStatement(ForInOfData {
            initializer: cv.one(&fo.initializer),
            expression: cv.one(&fo.expression),
            statement: cv.one(&fo.statement),
        }),

        NodeKind::ContinueStatement(j) => NodeKind::ContinueStatement(JumpData {
            label: cv.opt(&j.label),
        }),
        NodeKind::BreakStatement(j) => NodeKind::BreakStatement(JumpData {
            label: cv.opt(&j.label),
        }),

        NodeKind::ReturnStatement(r) => NodeKind::ReturnStatement(OptionalExprData {
            expression: cv.opt(&r.expression),
        }),

        NodeKind::LabeledStatement(l) => NodeKind::LabeledStatement(LabeledData {
            label: cv.one(&l.label),
            statement: cv.one(&l.statement),
        }),

        NodeKind::SwitchStatement(s) => NodeKind::SwitchStatement(SwitchData {
            expression: cv.one(&s.expression),
            clauses: cv.vec(&s.clauses),
        }),

        NodeKind::CaseClause(c) => NodeKind::CaseClause(CaseClauseData {
            expression: cv.one(&c.expression),
            statements: cv.vec(&c.statements),
        }),

        NodeKind::TryStatement(t) => NodeKind::TryStatement(TryData {
            try_block: cv.one(&t.try_block),
            catch_clause: cv.opt(&t.catch_clause),
            finally_block: cv.opt(&t.finally_block),
        }),

        NodeKind::CatchClause(c) => NodeKind::CatchClause(CatchData {
            variable_declaration: cv.one(&c.variable_declaration),
            block: cv.one(&c.block),
        }),
    };

    if cv.changed {
        factory.update(node, kind)
    } else {
        Rc::clone(node)
    }
}

fn visit_function_data(cv: &mut ChildVisitor<'_>, func: &FunctionData) -> FunctionData {
    FunctionData {
        name: cv.opt(&func.name),
        parameters: cv.vec(&func.parameters),
        body: cv.opt(&func.body),
    }
}

fn visit_class_data(cv: &mut ChildVisitor<'_>, class: &ClassData) -> ClassData {
    ClassData {
        name: cv.opt(&class.name),
        heritage: cv.opt(&class.heritage),
        members: cv.vec(&class.members),
    }
}
