//! Test-support printer.
//!
//! Renders an AST to JavaScript text. This is not the production emitter;
//! it exists so tests can assert on output shapes the way they would
//! against emitted code. It consults the substitution hooks at the same
//! sites a real emitter does: identifier and `this` reference positions,
//! and binding-name positions.

use std::rc::Rc;

use crate::flags::NodeFlags;
use crate::kind::BinaryOp;
use crate::node::{expression_precedence, NodeKind, NodeRef};

/// Emit-time substitution surface. The printer keeps an ancestor stack and
/// hands it to the hooks so they can answer `this`-container queries.
pub trait PrintSubstitutions {
    /// Substitution for identifiers that name a binding at its
    /// declaration site.
    fn substitute_binding_name(&self, ancestors: &[NodeRef], node: &NodeRef) -> Option<NodeRef>;

    /// Substitution for identifiers and `this` in expression positions.
    fn substitute_expression(&self, ancestors: &[NodeRef], node: &NodeRef) -> Option<NodeRef>;
}

/// A no-op substitution surface.
pub struct NoSubstitutions;

impl PrintSubstitutions for NoSubstitutions {
    fn substitute_binding_name(&self, _: &[NodeRef], _: &NodeRef) -> Option<NodeRef> {
        None
    }

    fn substitute_expression(&self, _: &[NodeRef], _: &NodeRef) -> Option<NodeRef> {
        None
    }
}

pub struct Printer<'a> {
    out: String,
    indent: usize,
    stack: Vec<NodeRef>,
    subs: &'a dyn PrintSubstitutions,
}

impl<'a> Printer<'a> {
    #[must_use]
    pub fn new() -> Printer<'static> {
        Printer {
            out: String::new(),
            indent: 0,
            stack: Vec::new(),
            subs: &NoSubstitutions,
        }
    }

    #[must_use]
    pub fn with_substitutions(subs: &'a dyn PrintSubstitutions) -> Printer<'a> {
        Printer {
            out: String::new(),
            indent: 0,
            stack: Vec::new(),
            subs,
        }
    }

    /// Print a source file or a single statement/expression node.
    #[must_use]
    pub fn print(mut self, node: &NodeRef) -> String {
        match &node.kind {
            NodeKind::SourceFile(file) => {
                self.stack.push(Rc::clone(node));
                for stmt in &file.statements {
                    self.stmt(stmt);
                    self.newline();
                }
                self.stack.pop();
            }
            NodeKind::Block(_) | NodeKind::ExpressionStatement(_) => self.stmt(node),
            kind if is_statement_kind(kind) => self.stmt(node),
            _ => self.expr(node, 0),
        }
        self.out
    }

    fn write(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn stmt(&mut self, node: &NodeRef) {
        self.stack.push(Rc::clone(node));
        match &node.kind {
            NodeKind::Block(block) => {
                if block.statements.is_empty() {
                    self.write("{ }");
                } else if node.flags.contains(NodeFlags::SINGLE_LINE) {
                    self.write("{ ");
                    for (i, stmt) in block.statements.iter().enumerate() {
                        if i > 0 {
                            self.write(" ");
                        }
                        self.stmt(stmt);
                    }
                    self.write(" }");
                } else {
                    self.write("{");
                    self.indent += 1;
                    for stmt in &block.statements {
                        let stmt = Rc::clone(stmt);
                        self.newline();
                        self.stmt(&stmt);
                    }
                    self.indent -= 1;
                    self.newline();
                    self.write("}");
                }
            }

            NodeKind::VariableStatement(var) => {
                self.var_declaration_list(&var.declaration_list);
                self.write(";");
            }

            NodeKind::EmptyStatement => self.write(";"),

            NodeKind::ExpressionStatement(stmt) => {
                self.expr(&stmt.expression, 0);
                self.write(";");
            }

            NodeKind::IfStatement(if_stmt) => {
                self.write("if (");
                self.expr(&if_stmt.expression, 0);
                self.write(") ");
                self.stmt(&if_stmt.then_statement);
                if let Some(else_stmt) = &if_stmt.else_statement {
                    let else_stmt = Rc::clone(else_stmt);
                    self.write(" else ");
                    self.stmt(&else_stmt);
                }
            }

            NodeKind::DoStatement(do_stmt) => {
                self.write("do ");
                self.stmt(&do_stmt.statement);
                self.write(" while (");
                self.expr(&do_stmt.expression, 0);
                self.write(");");
            }

            NodeKind::WhileStatement(while_stmt) => {
                self.write("while (");
                self.expr(&while_stmt.expression, 0);
                self.write(") ");
                self.stmt(&while_stmt.statement);
            }

            NodeKind::ForStatement(for_stmt) => {
                self.write("for (");
                if let Some(init) = &for_stmt.initializer {
                    if matches!(init.kind, NodeKind::VariableDeclarationList(_)) {
                        self.var_declaration_list(init);
                    } else {
                        self.expr(init, 0);
                    }
                }
                self.write("; ");
                if let Some(cond) = &for_stmt.condition {
                    self.expr(cond, 0);
                }
                self.write("; ");
                if let Some(inc) = &for_stmt.incrementor {
                    self.expr(inc, 0);
                }
                self.write(") ");
                self.stmt(&for_stmt.statement);
            }

            NodeKind::ForInStatement(for_in) => {
                self.write("for (");
                self.for_head_initializer(&for_in.initializer);
                self.write(" in ");
                self.expr(&for_in.expression, 0);
                self.write(") ");
                self.stmt(&for_in.statement);
            }

            NodeKind::ForOfStatement(for_of) => {
                self.write("for (");
                self.for_head_initializer(&for_of.initializer);
                self.write(" of ");
                self.expr(&for_of.expression, 0);
                self.write(") ");
                self.stmt(&for_of.statement);
            }

            NodeKind::ContinueStatement(jump) => {
                self.write("continue");
                if let Some(label) = &jump.label {
                    self.write(" ");
                    self.expr(label, 0);
                }
                self.write(";");
            }

            NodeKind::BreakStatement(jump) => {
                self.write("break");
                if let Some(label) = &jump.label {
                    self.write(" ");
                    self.expr(label, 0);
                }
                self.write(";");
            }

            NodeKind::ReturnStatement(ret) => {
                self.write("return");
                if let Some(expr) = &ret.expression {
                    let expr = Rc::clone(expr);
                    self.write(" ");
                    self.expr(&expr, 2);
                }
                self.write(";");
            }

            NodeKind::LabeledStatement(labeled) => {
                self.expr(&labeled.label, 0);
                self.write(": ");
                self.stmt(&labeled.statement);
            }

            NodeKind::SwitchStatement(switch) => {
                self.write("switch (");
                self.expr(&switch.expression, 0);
                self.write(") {");
                self.indent += 1;
                for clause in &switch.clauses.clone() {
                    self.newline();
                    match &clause.kind {
                        NodeKind::CaseClause(case) => {
                            self.write("case ");
                            self.expr(&case.expression, 0);
                            self.write(":");
                            self.clause_statements(&case.statements.clone());
                        }
                        NodeKind::DefaultClause(default) => {
                            self.write("default:");
                            self.clause_statements(&default.statements.clone());
                        }
                        _ => {}
                    }
                }
                self.indent -= 1;
                self.newline();
                self.write("}");
            }

            NodeKind::ThrowStatement(throw) => {
                self.write("throw ");
                self.expr(&throw.expression, 2);
                self.write(";");
            }

            NodeKind::TryStatement(try_stmt) => {
                self.write("try ");
                self.stmt(&try_stmt.try_block);
                if let Some(catch) = &try_stmt.catch_clause {
                    let catch = Rc::clone(catch);
                    self.write(" ");
                    self.stmt(&catch);
                }
                if let Some(finally) = &try_stmt.finally_block {
                    let finally = Rc::clone(finally);
                    self.write(" finally ");
                    self.stmt(&finally);
                }
            }

            NodeKind::CatchClause(catch) => {
                self.write("catch (");
                if let NodeKind::VariableDeclaration(decl) = &catch.variable_declaration.kind {
                    self.binding_name(&decl.name);
                }
                self.write(") ");
                self.stmt(&catch.block);
            }

            NodeKind::FunctionDeclaration(func) => {
                self.write("function");
                if let Some(name) = &func.name.clone() {
                    self.write(" ");
                    self.binding_name(name);
                }
                self.write("(");
                self.parameters(&func.parameters.clone());
                self.write(") ");
                if let Some(body) = &func.body.clone() {
                    self.stmt(body);
                } else {
                    self.write("{ }");
                }
            }

            NodeKind::ClassDeclaration(class) => {
                self.write("class");
                if let Some(name) = &class.name.clone() {
                    self.write(" ");
                    self.binding_name(name);
                }
                if let Some(heritage) = &class.heritage.clone() {
                    self.write(" extends ");
                    self.expr(heritage, 18);
                }
                self.write(" { }");
            }

            _ => {
                // Not a statement; print as an expression statement shape.
                let node = Rc::clone(node);
                self.stack.pop();
                self.expr(&node, 0);
                return;
            }
        }
        self.stack.pop();
    }

    fn clause_statements(&mut self, statements: &[NodeRef]) {
        self.indent += 1;
        for stmt in statements {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    fn for_head_initializer(&mut self, init: &NodeRef) {
        if matches!(init.kind, NodeKind::VariableDeclarationList(_)) {
            self.var_declaration_list(init);
        } else {
            self.expr(init, 0);
        }
    }

    fn var_declaration_list(&mut self, list: &NodeRef) {
        let NodeKind::VariableDeclarationList(decls) = &list.kind else {
            return;
        };
        if list.flags.contains(NodeFlags::CONST) {
            self.write("const ");
        } else if list.flags.contains(NodeFlags::LET) {
            self.write("let ");
        } else {
            self.write("var ");
        }
        self.stack.push(Rc::clone(list));
        for (i, decl) in decls.declarations.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if let NodeKind::VariableDeclaration(var_decl) = &decl.kind {
                self.stack.push(Rc::clone(decl));
                self.binding_name(&var_decl.name);
                if let Some(init) = &var_decl.initializer {
                    self.write(" = ");
                    self.expr(init, 2);
                }
                self.stack.pop();
            }
        }
        self.stack.pop();
    }

    fn parameters(&mut self, params: &[NodeRef]) {
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if let NodeKind::Parameter(p) = &param.kind {
                self.stack.push(Rc::clone(param));
                if p.dot_dot_dot {
                    self.write("...");
                }
                self.binding_name(&p.name);
                if let Some(init) = &p.initializer.clone() {
                    self.write(" = ");
                    self.expr(init, 2);
                }
                self.stack.pop();
            }
        }
    }

    /// Print a binding name: an identifier (through the binding
    /// substitution hook) or a binding pattern.
    fn binding_name(&mut self, name: &NodeRef) {
        match &name.kind {
            NodeKind::Identifier(ident) => {
                if let Some(replacement) = self.subs.substitute_binding_name(&self.stack, name) {
                    if let Some(text) = replacement.identifier_text() {
                        let text = text.to_string();
                        self.write(&text);
                        return;
                    }
                }
                let text = ident.text.to_string();
                self.write(&text);
            }
            NodeKind::ObjectBindingPattern(pattern) => {
                self.write("{ ");
                for (i, elem) in pattern.elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.binding_element(elem);
                }
                self.write(" }");
            }
            NodeKind::ArrayBindingPattern(pattern) => {
                self.write("[");
                for (i, elem) in pattern.elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.binding_element(elem);
                }
                self.write("]");
            }
            _ => self.expr(name, 0),
        }
    }

    fn binding_element(&mut self, elem: &NodeRef) {
        if let NodeKind::BindingElement(b) = &elem.kind {
            if b.dot_dot_dot {
                self.write("...");
            }
            if let Some(prop) = &b.property_name {
                self.expr(prop, 0);
                self.write(": ");
            }
            self.binding_name(&b.name);
            if let Some(init) = &b.initializer.clone() {
                self.write(" = ");
                self.expr(init, 2);
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn expr(&mut self, node: &NodeRef, min_prec: u8) {
        if expression_precedence(node) < min_prec {
            self.write("(");
            self.expr_inner(node);
            self.write(")");
        } else {
            self.expr_inner(node);
        }
    }

    fn expr_inner(&mut self, node: &NodeRef) {
        self.stack.push(Rc::clone(node));
        match &node.kind {
            NodeKind::Identifier(ident) => {
                let ancestors = &self.stack[..self.stack.len() - 1];
                if let Some(replacement) = self.subs.substitute_expression(ancestors, node) {
                    if let Some(text) = replacement.identifier_text() {
                        let text = text.to_string();
                        self.write(&text);
                        self.stack.pop();
                        return;
                    }
                }
                let text = ident.text.to_string();
                self.write(&text);
            }

            NodeKind::ThisExpression => {
                let ancestors = &self.stack[..self.stack.len() - 1];
                if let Some(replacement) = self.subs.substitute_expression(ancestors, node) {
                    if let Some(text) = replacement.identifier_text() {
                        let text = text.to_string();
                        self.write(&text);
                        self.stack.pop();
                        return;
                    }
                }
                self.write("this");
            }

            NodeKind::SuperExpression => self.write("super"),
            NodeKind::TrueLiteral => self.write("true"),
            NodeKind::FalseLiteral => self.write("false"),
            NodeKind::NullLiteral => self.write("null"),

            NodeKind::StringLiteral(lit) => {
                let escaped = escape_string_literal(&lit.text);
                self.write("\"");
                self.write(&escaped);
                self.write("\"");
            }

            NodeKind::NumericLiteral(lit) | NodeKind::RegularExpressionLiteral(lit) => {
                let text = lit.text.to_string();
                self.write(&text);
            }

            NodeKind::NoSubstitutionTemplateLiteral(lit) => {
                let text = lit.text.to_string();
                self.write("`");
                self.write(&text);
                self.write("`");
            }

            NodeKind::TemplateHead(lit)
            | NodeKind::TemplateMiddle(lit)
            | NodeKind::TemplateTail(lit) => {
                let text = lit.text.to_string();
                self.write(&text);
            }

            NodeKind::TemplateExpression(template) => {
                self.write("`");
                if let NodeKind::TemplateHead(head) = &template.head.kind {
                    let text = head.text.to_string();
                    self.write(&text);
                }
                for span in &template.spans.clone() {
                    if let NodeKind::TemplateSpan(s) = &span.kind {
                        self.write("${");
                        self.expr(&s.expression, 0);
                        self.write("}");
                        if let NodeKind::TemplateMiddle(lit) | NodeKind::TemplateTail(lit) =
                            &s.literal.kind
                        {
                            let text = lit.text.to_string();
                            self.write(&text);
                        }
                    }
                }
                self.write("`");
            }

            NodeKind::TaggedTemplate(tagged) => {
                self.expr(&tagged.tag, 17);
                self.expr(&tagged.template, 0);
            }

            NodeKind::ComputedPropertyName(computed) => {
                self.write("[");
                self.expr(&computed.expression, 2);
                self.write("]");
            }

            NodeKind::ArrayLiteral(arr) => {
                self.write("[");
                for (i, elem) in arr.elements.clone().iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.expr(elem, 2);
                }
                self.write("]");
            }

            NodeKind::ObjectLiteral(obj) => {
                if obj.elements.is_empty() {
                    self.write("{}");
                } else {
                    self.write("{ ");
                    for (i, prop) in obj.elements.clone().iter().enumerate() {
                        if i > 0 {
                            self.write(", ");
                        }
                        self.object_member(prop);
                    }
                    self.write(" }");
                }
            }

            NodeKind::PropertyAccess(prop) => {
                self.expr(&prop.expression, 18);
                self.write(".");
                if let Some(text) = prop.name.identifier_text() {
                    let text = text.to_string();
                    self.write(&text);
                }
            }

            NodeKind::ElementAccess(elem) => {
                self.expr(&elem.expression, 18);
                self.write("[");
                self.expr(&elem.argument_expression, 2);
                self.write("]");
            }

            NodeKind::Call(call) => {
                self.expr(&call.expression, 18);
                self.write("(");
                self.arguments(&call.arguments.clone());
                self.write(")");
            }

            NodeKind::New(new) => {
                self.write("new ");
                self.expr(&new.expression, 18);
                self.write("(");
                self.arguments(&new.arguments.clone());
                self.write(")");
            }

            NodeKind::Paren(paren) => {
                self.write("(");
                self.expr(&paren.expression, 0);
                self.write(")");
            }

            NodeKind::FunctionExpression(func) => {
                self.write("function ");
                if let Some(name) = &func.name.clone() {
                    self.binding_name(name);
                }
                self.write("(");
                self.parameters(&func.parameters.clone());
                self.write(") ");
                if let Some(body) = &func.body.clone() {
                    self.stmt(body);
                } else {
                    self.write("{ }");
                }
            }

            NodeKind::ArrowFunction(func) => {
                self.write("(");
                self.parameters(&func.parameters.clone());
                self.write(") => ");
                if let Some(body) = &func.body.clone() {
                    if matches!(body.kind, NodeKind::Block(_)) {
                        self.stmt(body);
                    } else {
                        self.expr(body, 2);
                    }
                }
            }

            NodeKind::ClassExpression(class) => {
                self.write("class");
                if let Some(name) = &class.name.clone() {
                    self.write(" ");
                    self.binding_name(name);
                }
                if let Some(heritage) = &class.heritage.clone() {
                    self.write(" extends ");
                    self.expr(heritage, 18);
                }
                self.write(" { }");
            }

            NodeKind::DeleteExpression(unary) => {
                self.write("delete ");
                self.expr(&unary.expression, 15);
            }

            NodeKind::TypeOfExpression(unary) => {
                self.write("typeof ");
                self.expr(&unary.expression, 15);
            }

            NodeKind::VoidExpression(unary) => {
                self.write("void ");
                self.expr(&unary.expression, 15);
            }

            NodeKind::SpreadElement(spread) => {
                self.write("...");
                self.expr(&spread.expression, 2);
            }

            NodeKind::PrefixUnary(unary) => {
                let op = unary.operator.text();
                self.write(op);
                self.expr(&unary.operand, 15);
            }

            NodeKind::PostfixUnary(unary) => {
                self.expr(&unary.operand, 16);
                let op = unary.operator.text();
                self.write(op);
            }

            NodeKind::Binary(bin) => {
                let prec = bin.operator.precedence();
                let (left_min, right_min) = if bin.operator.is_right_associative() {
                    (prec + 1, prec)
                } else {
                    (prec, prec + 1)
                };
                self.expr(&bin.left, left_min);
                if bin.operator == BinaryOp::Comma {
                    self.write(", ");
                } else {
                    self.write(" ");
                    self.write(bin.operator.text());
                    self.write(" ");
                }
                self.expr(&bin.right, right_min);
            }

            NodeKind::Conditional(cond) => {
                self.expr(&cond.condition, 4);
                self.write(" ? ");
                self.expr(&cond.when_true, 2);
                self.write(" : ");
                self.expr(&cond.when_false, 2);
            }

            NodeKind::PropertyAssignment(_)
            | NodeKind::ShorthandPropertyAssignment(_)
            | NodeKind::GetAccessor(_)
            | NodeKind::SetAccessor(_)
            | NodeKind::MethodDeclaration(_) => {
                let node = Rc::clone(node);
                self.object_member(&node);
            }

            kind if is_statement_kind(kind) => {
                // Statement kinds reached in expression position; print
                // them as statements.
                let node = Rc::clone(node);
                self.stack.pop();
                self.stmt(&node);
                return;
            }

            _ => {
                debug_assert!(false, "cannot print {} as an expression", node.syntax_kind());
            }
        }
        self.stack.pop();
    }

    fn arguments(&mut self, args: &[NodeRef]) {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.expr(arg, 2);
        }
    }

    fn object_member(&mut self, member: &NodeRef) {
        match &member.kind {
            NodeKind::PropertyAssignment(prop) => {
                self.property_name(&prop.name);
                self.write(": ");
                self.expr(&prop.initializer, 2);
            }
            NodeKind::ShorthandPropertyAssignment(shorthand) => {
                self.expr(&shorthand.name, 0);
            }
            NodeKind::GetAccessor(func) => {
                self.write("get ");
                if let Some(name) = &func.name {
                    self.property_name(name);
                }
                self.write("() ");
                if let Some(body) = &func.body.clone() {
                    self.stmt(body);
                }
            }
            NodeKind::SetAccessor(func) => {
                self.write("set ");
                if let Some(name) = &func.name {
                    self.property_name(name);
                }
                self.write("(");
                self.parameters(&func.parameters.clone());
                self.write(") ");
                if let Some(body) = &func.body.clone() {
                    self.stmt(body);
                }
            }
            NodeKind::MethodDeclaration(func) => {
                if let Some(name) = &func.name {
                    self.property_name(name);
                }
                self.write("(");
                self.parameters(&func.parameters.clone());
                self.write(") ");
                if let Some(body) = &func.body.clone() {
                    self.stmt(body);
                }
            }
            _ => self.expr(member, 2),
        }
    }

    fn property_name(&mut self, name: &NodeRef) {
        match &name.kind {
            NodeKind::Identifier(ident) => {
                let text = ident.text.to_string();
                self.write(&text);
            }
            NodeKind::ComputedPropertyName(computed) => {
                self.write("[");
                self.expr(&computed.expression, 2);
                self.write("]");
            }
            _ => self.expr(name, 0),
        }
    }
}

fn is_statement_kind(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Block(_)
            | NodeKind::VariableStatement(_)
            | NodeKind::EmptyStatement
            | NodeKind::ExpressionStatement(_)
            | NodeKind::IfStatement(_)
            | NodeKind::DoStatement(_)
            | NodeKind::WhileStatement(_)
            | NodeKind::ForStatement(_)
            | NodeKind::ForInStatement(_)
            | NodeKind::ForOfStatement(_)
            | NodeKind::ContinueStatement(_)
            | NodeKind::BreakStatement(_)
            | NodeKind::ReturnStatement(_)
            | NodeKind::LabeledStatement(_)
            | NodeKind::SwitchStatement(_)
            | NodeKind::ThrowStatement(_)
            | NodeKind::TryStatement(_)
            | NodeKind::FunctionDeclaration(_)
            | NodeKind::ClassDeclaration(_)
    )
}

/// Escape text for inclusion in a double-quoted string literal.
#[must_use]
pub fn escape_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            _ => out.push(ch),
        }
    }
    out
}
