//! Class lowering: the constructor-function IIFE, `__extends` prelude,
//! prototype member installation, and `super` reference rewrites.

use std::rc::Rc;

use esdown_ast::flags::NodeFlags;
use esdown_ast::node::{ClassData, NodeKind, NodeRef};

use crate::resolver::NodeCheckFlags;

use super::{Es6Transformer, SuperScope};

impl Es6Transformer {
    /// `class Name ... {}` → `var Name = (function (_super) { ... }(Base));`
    pub(crate) fn visit_class_declaration(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::ClassDeclaration(class) = &node.kind else {
            return Rc::clone(node);
        };
        let class = class.clone();
        let fact = self.cx.factory();

        let name_text = self.class_name_text(node, &class);
        let iife = self.transform_class_like(node, &class, &name_text);

        let decl = fact.var_decl(fact.ident(&name_text), Some(iife));
        let stmt = fact.var_statement(vec![decl]);
        let stmt = fact.with_span(&stmt, node.span);
        fact.with_original(&stmt, node)
    }

    /// A class expression lowers to the IIFE directly.
    pub(crate) fn visit_class_expression(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::ClassExpression(class) = &node.kind else {
            return Rc::clone(node);
        };
        let class = class.clone();
        let name_text = self.class_name_text(node, &class);
        self.transform_class_like(node, &class, &name_text)
    }

    fn class_name_text(&mut self, node: &NodeRef, class: &ClassData) -> String {
        match class.name.as_ref().and_then(|n| n.identifier_text()) {
            Some(text) => text.to_string(),
            None => {
                let generated = self.cx.get_generated_name_for_node(node);
                generated
                    .identifier_text()
                    .unwrap_or("_class")
                    .to_string()
            }
        }
    }

    /// The IIFE whose result is the constructor function:
    ///
    /// ```text
    /// (function (_super) {
    ///     __extends(Name, _super);
    ///     function Name(...) { ... }
    ///     Name.prototype.m = function () { ... };
    ///     return Name;
    /// }(Base))
    /// ```
    fn transform_class_like(
        &mut self,
        node: &NodeRef,
        class: &ClassData,
        name_text: &str,
    ) -> NodeRef {
        let fact = self.cx.factory();
        let has_base = class.heritage.is_some();
        let base = class.heritage.as_ref().map(|h| self.visit(h));

        self.cx.start_lexical_environment();
        let mut statements: Vec<NodeRef> = Vec::new();

        if has_base {
            let call = fact.call(
                fact.ident("__extends"),
                vec![fact.ident(name_text), fact.ident("_super")],
            );
            let stmt = fact.expr_stmt(call);
            statements.push(fact.with_flags(&stmt, NodeFlags::GENERATED));
        }

        let saved_scope = self.super_scope;
        statements.push(self.transform_constructor(node, class, name_text, has_base));

        for member in &class.members {
            let is_static = member.flags.contains(NodeFlags::STATIC);
            match &member.kind {
                NodeKind::Constructor(_) => {}
                NodeKind::SemicolonClassElement => {
                    // Preserved as empty statements for source-map fidelity.
                    let empty = fact.empty_statement();
                    let empty = fact.with_span(&empty, member.span);
                    statements.push(fact.with_original(&empty, member));
                }
                NodeKind::MethodDeclaration(_) => {
                    self.super_scope = Some(SuperScope {
                        has_base,
                        is_static,
                    });
                    statements.push(self.transform_class_method(member, name_text, is_static));
                }
                NodeKind::GetAccessor(_) | NodeKind::SetAccessor(_) => {
                    if self.is_first_accessor_for_name(&class.members, member) {
                        self.super_scope = Some(SuperScope {
                            has_base,
                            is_static,
                        });
                        statements.push(self.transform_class_accessors(
                            &class.members,
                            member,
                            name_text,
                            is_static,
                        ));
                    }
                }
                _ => {
                    self.super_scope = saved_scope;
                    statements.push(self.visit(member));
                }
            }
        }
        self.super_scope = saved_scope;

        statements.push(fact.ret(Some(fact.ident(name_text))));

        if let Some(hoisted) = self.cx.end_lexical_environment() {
            statements.insert(0, hoisted);
        }

        let parameters = if has_base {
            vec![fact.parameter(fact.ident("_super"))]
        } else {
            Vec::new()
        };
        let body = fact.block(statements);
        let iife_fn = fact.func_expr(None, parameters, body);
        let call = fact.call(iife_fn, base.into_iter().collect());
        let out = fact.paren(call);
        let out = fact.with_span(&out, node.span);
        fact.with_original(&out, node)
    }

    /// Lower the source constructor, or synthesize the default one. A
    /// derived class without a constructor forwards with
    /// `_super.apply(this, arguments);`.
    fn transform_constructor(
        &mut self,
        class_node: &NodeRef,
        class: &ClassData,
        name_text: &str,
        has_base: bool,
    ) -> NodeRef {
        let fact = self.cx.factory();
        self.super_scope = Some(SuperScope {
            has_base,
            is_static: false,
        });

        let ctor = class.members.iter().find(|m| {
            matches!(&m.kind, NodeKind::Constructor(f) if f.body.is_some())
        });

        match ctor {
            Some(ctor_node) => {
                let NodeKind::Constructor(func) = &ctor_node.kind else {
                    unreachable!()
                };
                let func = func.clone();
                let (parameters, body) = self.transform_function_like(ctor_node, &func, false);
                let decl = fact.func_decl(fact.ident(name_text), parameters, body);
                let decl = fact.with_span(&decl, ctor_node.span);
                fact.with_original(&decl, ctor_node)
            }
            None => {
                let statements = if has_base {
                    vec![self.make_default_super_forward()]
                } else {
                    Vec::new()
                };
                let decl =
                    fact.func_decl(fact.ident(name_text), Vec::new(), fact.block(statements));
                fact.with_original(&decl, class_node)
            }
        }
    }

    /// `_super.apply(this, arguments);`
    pub(crate) fn make_default_super_forward(&mut self) -> NodeRef {
        let fact = self.cx.factory();
        let call = fact.call(
            fact.prop(fact.ident("_super"), "apply"),
            vec![fact.this_expr(), fact.ident("arguments")],
        );
        let stmt = fact.expr_stmt(call);
        fact.with_flags(&stmt, NodeFlags::GENERATED)
    }

    /// `Name.prototype.m = function (...) { ... };` (receiver is the
    /// constructor itself for static members).
    fn transform_class_method(
        &mut self,
        member: &NodeRef,
        name_text: &str,
        is_static: bool,
    ) -> NodeRef {
        let fact = self.cx.factory();
        let NodeKind::MethodDeclaration(func) = &member.kind else {
            return Rc::clone(member);
        };
        let name = func.name.clone();

        let value = self.transform_member_function(member);
        let receiver = self.member_receiver(name_text, is_static);
        let target = self.member_target(receiver, name.as_ref());

        let stmt = fact.expr_stmt(fact.assign(target, value));
        let stmt = fact.with_span(&stmt, member.span);
        fact.with_original(&stmt, member)
    }

    fn member_receiver(&mut self, name_text: &str, is_static: bool) -> NodeRef {
        let fact = self.cx.factory();
        if is_static {
            fact.ident(name_text)
        } else {
            fact.prop(fact.ident(name_text), "prototype")
        }
    }

    /// The assignment target for a member name on a receiver.
    fn member_target(&mut self, receiver: NodeRef, name: Option<&NodeRef>) -> NodeRef {
        let fact = self.cx.factory();
        match name.map(|n| &n.kind) {
            Some(NodeKind::Identifier(_)) => {
                let name = name.expect("checked above");
                fact.prop_access(receiver, fact.clone_identifier(name))
            }
            Some(NodeKind::ComputedPropertyName(computed)) => {
                let key = self.visit(&computed.expression);
                fact.elem_access(receiver, key)
            }
            Some(NodeKind::StringLiteral(_) | NodeKind::NumericLiteral(_)) => {
                let name = name.expect("checked above");
                fact.elem_access(receiver, Rc::clone(name))
            }
            _ => receiver,
        }
    }

    pub(crate) fn accessor_key_text(member: &NodeRef) -> Option<String> {
        let func = match &member.kind {
            NodeKind::GetAccessor(f) | NodeKind::SetAccessor(f) => f,
            _ => return None,
        };
        let name = func.name.as_ref()?;
        match &name.kind {
            NodeKind::Identifier(ident) => Some(ident.text.to_string()),
            NodeKind::StringLiteral(lit) | NodeKind::NumericLiteral(lit) => {
                Some(lit.text.to_string())
            }
            _ => None,
        }
    }

    /// Paired accessors emit a single `Object.defineProperty` at the
    /// first accessor's source position.
    pub(crate) fn is_first_accessor_for_name(&self, members: &[NodeRef], member: &NodeRef) -> bool {
        let Some(key) = Self::accessor_key_text(member) else {
            // Computed accessor names never pair.
            return true;
        };
        for other in members {
            if Rc::ptr_eq(other, member) {
                return true;
            }
            if matches!(
                other.kind,
                NodeKind::GetAccessor(_) | NodeKind::SetAccessor(_)
            ) && Self::accessor_key_text(other).as_deref() == Some(&key)
            {
                return false;
            }
        }
        true
    }

    /// `Object.defineProperty(receiver, key, { get, set, enumerable,
    /// configurable });`
    fn transform_class_accessors(
        &mut self,
        members: &[NodeRef],
        first: &NodeRef,
        name_text: &str,
        is_static: bool,
    ) -> NodeRef {
        let fact = self.cx.factory();
        let key = Self::accessor_key_text(first);

        let mut getter: Option<NodeRef> = None;
        let mut setter: Option<NodeRef> = None;
        if key.is_none() {
            // Computed accessors never pair; describe this one alone.
            match &first.kind {
                NodeKind::GetAccessor(_) => getter = Some(Rc::clone(first)),
                NodeKind::SetAccessor(_) => setter = Some(Rc::clone(first)),
                _ => {}
            }
        } else {
            for member in members {
                match &member.kind {
                    NodeKind::GetAccessor(_) if Self::accessor_key_text(member) == key => {
                        getter.get_or_insert_with(|| Rc::clone(member));
                    }
                    NodeKind::SetAccessor(_) if Self::accessor_key_text(member) == key => {
                        setter.get_or_insert_with(|| Rc::clone(member));
                    }
                    _ => {}
                }
            }
        }

        let mut descriptor: Vec<NodeRef> = Vec::new();
        if let Some(get) = &getter {
            let value = self.transform_member_function(get);
            descriptor.push(fact.property_assignment(fact.ident("get"), value));
        }
        if let Some(set) = &setter {
            let value = self.transform_member_function(set);
            descriptor.push(fact.property_assignment(fact.ident("set"), value));
        }
        descriptor.push(fact.property_assignment(fact.ident("enumerable"), fact.false_lit()));
        descriptor.push(fact.property_assignment(fact.ident("configurable"), fact.true_lit()));

        let key_expr = self.accessor_key_expression(first);
        let receiver = self.member_receiver(name_text, is_static);
        let call = fact.call(
            fact.prop(fact.ident("Object"), "defineProperty"),
            vec![receiver, key_expr, fact.object(descriptor)],
        );
        let stmt = fact.expr_stmt(call);
        let stmt = fact.with_span(&stmt, first.span);
        fact.with_original(&stmt, first)
    }

    pub(crate) fn accessor_key_expression(&mut self, member: &NodeRef) -> NodeRef {
        let fact = self.cx.factory();
        let name = match &member.kind {
            NodeKind::GetAccessor(f) | NodeKind::SetAccessor(f) => f.name.clone(),
            _ => None,
        };
        match name.as_ref().map(|n| (&n.kind, n)) {
            Some((NodeKind::Identifier(ident), _)) => fact.string(&ident.text),
            Some((NodeKind::ComputedPropertyName(computed), _)) => {
                self.visit(&computed.expression)
            }
            Some((_, n)) => Rc::clone(n),
            None => fact.string(""),
        }
    }

    // =========================================================================
    // `super` references
    // =========================================================================

    /// A bare `super` becomes `_super`, or `_super.prototype` when the
    /// resolver marks the reference as an instance-member access.
    pub(crate) fn visit_super_expression(&mut self, node: &NodeRef) -> NodeRef {
        let fact = self.cx.factory();
        let instance = self
            .cx
            .resolver()
            .node_check_flags(node)
            .contains(NodeCheckFlags::SUPER_INSTANCE);
        let base = fact.ident("_super");
        let out = if instance {
            fact.prop(base, "prototype")
        } else {
            base
        };
        fact.with_original(&out, node)
    }

    /// `super.m` → `_super.prototype.m` (instance) / `_super.m` (static).
    pub(crate) fn visit_super_property_access(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::PropertyAccess(data) = &node.kind else {
            return self.accept(node);
        };
        if !matches!(data.expression.kind, NodeKind::SuperExpression) {
            return self.accept(node);
        }
        let fact = self.cx.factory();
        let receiver = self.super_receiver();
        let out = fact.prop_access(receiver, fact.clone_identifier(&data.name));
        let out = fact.with_span(&out, node.span);
        fact.with_original(&out, node)
    }

    /// `super[k]` → `_super.prototype[k]` (instance) / `_super[k]`.
    pub(crate) fn visit_super_element_access(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::ElementAccess(data) = &node.kind else {
            return self.accept(node);
        };
        if !matches!(data.expression.kind, NodeKind::SuperExpression) {
            return self.accept(node);
        }
        let fact = self.cx.factory();
        let receiver = self.super_receiver();
        let argument = self.visit(&data.argument_expression);
        let out = fact.elem_access(receiver, argument);
        let out = fact.with_span(&out, node.span);
        fact.with_original(&out, node)
    }

    pub(crate) fn super_receiver(&mut self) -> NodeRef {
        let fact = self.cx.factory();
        let is_static = self.super_scope.is_some_and(|s| s.is_static);
        if is_static {
            fact.ident("_super")
        } else {
            fact.prop(fact.ident("_super"), "prototype")
        }
    }
}
