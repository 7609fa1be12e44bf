//! Object-literal lowering for computed property keys: split at the
//! first computed key, bind the leading run to a hoisted temp, then
//! install the rest as sequenced assignments on the temp.

use std::rc::Rc;

use esdown_ast::node::{NodeKind, NodeRef};

use crate::context::TempHint;

use super::Es6Transformer;

impl Es6Transformer {
    /// `{ a: 1, [k]: v }` → `(_a = { a: 1 }, _a[k] = v, _a)`.
    pub(crate) fn visit_object_literal(&mut self, node: &NodeRef) -> NodeRef {
        let NodeKind::ObjectLiteral(obj) = &node.kind else {
            return self.accept_current(node);
        };
        let members = obj.elements.clone();
        let fact = self.cx.factory();

        let split = members.iter().position(|m| member_has_computed_name(m));
        let Some(split) = split else {
            debug_assert!(false, "object literal flagged computed without a computed key");
            return self.accept_current(node);
        };

        let temp = self.cx.create_hoisted_temp(TempHint::Auto);

        let leading: Vec<NodeRef> = members[..split].iter().map(|m| self.visit(m)).collect();
        let mut sequence = fact.assign(Rc::clone(&temp), fact.object(leading));

        let trailing = &members[split..];
        for member in trailing {
            match &member.kind {
                NodeKind::GetAccessor(_) | NodeKind::SetAccessor(_) => {
                    if self.is_first_accessor_for_name(trailing, member) {
                        let call = self.define_property_for_accessors(trailing, member, &temp);
                        sequence = fact.comma(sequence, call);
                    }
                }
                _ => {
                    let assignment = self.member_assignment(&temp, member);
                    sequence = fact.comma(sequence, assignment);
                }
            }
        }

        sequence = fact.comma(sequence, temp);
        let out = fact.paren(sequence);
        let out = fact.with_span(&out, node.span);
        fact.with_original(&out, node)
    }

    /// One `_a.key = value` (or `_a[key] = value`) assignment for a
    /// member after the split point.
    fn member_assignment(&mut self, temp: &NodeRef, member: &NodeRef) -> NodeRef {
        let fact = self.cx.factory();
        match &member.kind {
            NodeKind::PropertyAssignment(prop) => {
                let target = self.member_key_target(temp, &prop.name);
                let value = self.visit(&prop.initializer);
                let out = fact.assign(target, value);
                fact.with_original(&fact.with_span(&out, member.span), member)
            }
            NodeKind::ShorthandPropertyAssignment(shorthand) => {
                let target = fact.prop_access(
                    Rc::clone(temp),
                    fact.clone_identifier(&shorthand.name),
                );
                let value = fact.clone_identifier(&shorthand.name);
                let out = fact.assign(target, value);
                fact.with_original(&fact.with_span(&out, member.span), member)
            }
            NodeKind::MethodDeclaration(func) => {
                let name = func.name.clone();
                let value = self.transform_member_function(member);
                let target = match name.as_ref() {
                    Some(name) => self.member_key_target(temp, name),
                    None => Rc::clone(temp),
                };
                let out = fact.assign(target, value);
                fact.with_original(&fact.with_span(&out, member.span), member)
            }
            _ => self.visit(member),
        }
    }

    fn member_key_target(&mut self, temp: &NodeRef, name: &NodeRef) -> NodeRef {
        let fact = self.cx.factory();
        match &name.kind {
            NodeKind::Identifier(_) => {
                fact.prop_access(Rc::clone(temp), fact.clone_identifier(name))
            }
            NodeKind::ComputedPropertyName(computed) => {
                let key = self.visit(&computed.expression);
                fact.elem_access(Rc::clone(temp), key)
            }
            _ => fact.elem_access(Rc::clone(temp), Rc::clone(name)),
        }
    }

    /// `Object.defineProperty(_a, key, { get, set, enumerable,
    /// configurable })` for accessors past the split point.
    fn define_property_for_accessors(
        &mut self,
        members: &[NodeRef],
        first: &NodeRef,
        temp: &NodeRef,
    ) -> NodeRef {
        let fact = self.cx.factory();
        let key = Self::accessor_key_text(first);

        let mut getter: Option<NodeRef> = None;
        let mut setter: Option<NodeRef> = None;
        if key.is_none() {
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
        let call = fact.call(
            fact.prop(fact.ident("Object"), "defineProperty"),
            vec![Rc::clone(temp), key_expr, fact.object(descriptor)],
        );
        fact.with_original(&fact.with_span(&call, first.span), first)
    }
}

fn member_has_computed_name(member: &NodeRef) -> bool {
    let name = match &member.kind {
        NodeKind::PropertyAssignment(p) => Some(&p.name),
        NodeKind::MethodDeclaration(f)
        | NodeKind::GetAccessor(f)
        | NodeKind::SetAccessor(f) => f.name.as_ref(),
        _ => None,
    };
    name.is_some_and(|n| matches!(n.kind, NodeKind::ComputedPropertyName(_)))
}
