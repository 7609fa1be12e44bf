//! Semantic queries consumed during lowering.
//!
//! The transform runs after checking; the few semantic facts it needs are
//! answered through this interface rather than recomputed. Hosts without
//! semantic information can pass `NullResolver`, which degrades lowering
//! for block-scoped captures but keeps every syntactic rewrite intact.

use esdown_ast::node::{NodeId, NodeRef};
use rustc_hash::{FxHashMap, FxHashSet};

bitflags::bitflags! {
    /// Per-node facts computed by the checker.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeCheckFlags: u32 {
        /// A block-scoped binding declared inside a loop and captured in a
        /// way that needs a per-iteration value.
        const BLOCK_SCOPED_BINDING_IN_LOOP = 1 << 0;
        /// A `super` reference that resolves to an instance member.
        const SUPER_INSTANCE = 1 << 1;
    }
}

/// Semantic queries the lowering consults.
pub trait EmitResolver {
    /// Check flags for a node.
    fn node_check_flags(&self, _node: &NodeRef) -> NodeCheckFlags {
        NodeCheckFlags::empty()
    }

    /// For an identifier reference, the declaration it resolves to when
    /// that declaration is a nested redeclaration in need of renaming.
    fn referenced_nested_redeclaration(&self, _node: &NodeRef) -> Option<NodeRef> {
        None
    }

    /// Check whether a declaration shadows a binding from an enclosing
    /// block in a way that requires renaming once both become `var`s.
    fn is_nested_redeclaration(&self, _node: &NodeRef) -> bool {
        false
    }
}

/// A resolver that answers "no" to everything.
pub struct NullResolver;

impl EmitResolver for NullResolver {}

/// A resolver backed by explicit per-node tables. Hosts that precompute
/// semantic facts (and tests) populate it by node id.
#[derive(Default)]
pub struct StaticResolver {
    check_flags: FxHashMap<NodeId, NodeCheckFlags>,
    nested_redeclarations: FxHashSet<NodeId>,
    references: FxHashMap<NodeId, NodeRef>,
}

impl StaticResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_check_flags(&mut self, node: &NodeRef, flags: NodeCheckFlags) {
        self.check_flags.insert(node.id, flags);
    }

    /// Mark a declaration as a nested redeclaration.
    pub fn add_nested_redeclaration(&mut self, decl: &NodeRef) {
        self.nested_redeclarations.insert(decl.id);
    }

    /// Record that `reference` resolves to the nested redeclaration
    /// `decl`.
    pub fn add_reference(&mut self, reference: &NodeRef, decl: &NodeRef) {
        self.references.insert(reference.id, decl.clone());
    }
}

impl EmitResolver for StaticResolver {
    fn node_check_flags(&self, node: &NodeRef) -> NodeCheckFlags {
        self.check_flags.get(&node.id).copied().unwrap_or_default()
    }

    fn referenced_nested_redeclaration(&self, node: &NodeRef) -> Option<NodeRef> {
        self.references.get(&node.id).cloned()
    }

    fn is_nested_redeclaration(&self, node: &NodeRef) -> bool {
        self.nested_redeclarations.contains(&node.id)
    }
}
