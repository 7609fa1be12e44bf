//! Emit-time substitution for the ES6 transform.
//!
//! Two rewrites happen at reference granularity rather than during the
//! tree walk: renaming of nested redeclarations (a `let`/`const` that
//! shadows a binding hoisted into the same `var` scope), and `this`
//! references whose nearest container is an arrow function, which print
//! as the captured `_this`.

use std::cell::RefCell;
use std::rc::Rc;

use esdown_ast::node::{origin_of, NodeId, NodeKind, NodeRef};
use esdown_ast::{NodeFactory, SyntaxKind};
use rustc_hash::FxHashSet;

use crate::context::{effective_this_container_kind, NameGenerator, SubstitutionStage, TransformContext};
use crate::resolver::EmitResolver;

pub(crate) struct Es6SubstitutionStage {
    resolver: Rc<dyn EmitResolver>,
    factory: NodeFactory,
    names: Rc<RefCell<NameGenerator>>,
    no_substitution: Rc<RefCell<FxHashSet<NodeId>>>,
}

impl Es6SubstitutionStage {
    pub(crate) fn new(cx: &TransformContext) -> Self {
        Self {
            resolver: cx.resolver(),
            factory: cx.factory(),
            names: cx.names(),
            no_substitution: cx.no_substitution(),
        }
    }

    fn generated_name_for(&self, decl: &NodeRef, base: &str) -> NodeRef {
        let name = self.names.borrow_mut().name_for_node(decl, Some(base));
        self.factory.ident(&name)
    }
}

impl SubstitutionStage for Es6SubstitutionStage {
    /// At a declaration site, a nested redeclaration's name becomes its
    /// generated replacement; the replacement itself is marked so it is
    /// never re-substituted.
    fn substitute_binding_name(&self, ancestors: &[NodeRef], node: &NodeRef) -> Option<NodeRef> {
        let text = node.identifier_text()?;
        if self.no_substitution.borrow().contains(&node.id) {
            return None;
        }
        let parent = ancestors.last()?;
        let parent_names_node = match &parent.kind {
            NodeKind::VariableDeclaration(decl) => Rc::ptr_eq(&decl.name, node),
            NodeKind::Parameter(param) => Rc::ptr_eq(&param.name, node),
            NodeKind::BindingElement(elem) => Rc::ptr_eq(&elem.name, node),
            _ => false,
        };
        if !parent_names_node {
            return None;
        }
        let decl = origin_of(parent);
        if !self.resolver.is_nested_redeclaration(&decl) {
            return None;
        }
        let replacement = self.generated_name_for(&decl, text);
        self.no_substitution.borrow_mut().insert(replacement.id);
        Some(replacement)
    }

    /// At a reference site, identifiers resolving to a nested
    /// redeclaration pick up the generated name, and `this` inside an
    /// arrow container becomes `_this`.
    fn substitute_expression(&self, ancestors: &[NodeRef], node: &NodeRef) -> Option<NodeRef> {
        match &node.kind {
            NodeKind::Identifier(ident) => {
                if self.no_substitution.borrow().contains(&node.id) {
                    return None;
                }
                let decl = self.resolver.referenced_nested_redeclaration(node)?;
                Some(self.generated_name_for(&origin_of(&decl), &ident.text))
            }
            NodeKind::ThisExpression => {
                let container_kind = ancestors
                    .iter()
                    .rev()
                    .find_map(effective_this_container_kind)?;
                if container_kind == SyntaxKind::ArrowFunction {
                    Some(self.factory.ident("_this"))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
