//! Node flags and transform flags.
//!
//! `NodeFlags` are static modifiers carried by a node (`let`/`const` on a
//! declaration list, `static` on a class member, generated markers).
//!
//! `TransformFlags` are the bitset the dispatcher gates on. Every flag
//! comes in two shapes: the node-level assertion (`ES6`: this node itself
//! must be rewritten) and the subtree form (`CONTAINS_ES6`: somewhere
//! below). The factory aggregates subtree flags at construction time, so
//! the transform never walks a clean subtree.

use crate::kind::SyntaxKind;

bitflags::bitflags! {
    /// Static modifiers on a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u16 {
        /// `let` declaration list
        const LET = 1 << 0;
        /// `const` declaration list
        const CONST = 1 << 1;
        /// `static` class member
        const STATIC = 1 << 2;
        /// Node was synthesized by an earlier phase rather than parsed
        const GENERATED = 1 << 3;
        /// Emit hint: keep this node on multiple lines
        const MULTI_LINE = 1 << 4;
        /// Emit hint: keep this node on a single line
        const SINGLE_LINE = 1 << 5;
    }
}

impl NodeFlags {
    /// Check for `let` or `const`.
    #[must_use]
    pub const fn is_block_scoped(self) -> bool {
        self.intersects(NodeFlags::LET.union(NodeFlags::CONST))
    }
}

bitflags::bitflags! {
    /// Transformation hints precomputed on every node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TransformFlags: u32 {
        /// This node itself uses ES6 syntax and must be rewritten.
        const ES6 = 1 << 0;
        /// Some descendant uses ES6 syntax.
        const CONTAINS_ES6 = 1 << 1;
        /// This node is a lexical `this` reference.
        const LEXICAL_THIS = 1 << 2;
        /// Some descendant references lexical `this`.
        const CONTAINS_LEXICAL_THIS = 1 << 3;
        /// Some descendant arrow function captures the enclosing `this`.
        const CONTAINS_CAPTURED_LEXICAL_THIS = 1 << 4;
        /// Some parameter in this function needs a default-value prologue.
        const CONTAINS_DEFAULT_VALUE_ASSIGNMENTS = 1 << 5;
        /// Some direct argument/element is a spread element.
        const CONTAINS_SPREAD_ELEMENT_EXPRESSION = 1 << 6;
    }
}

impl TransformFlags {
    /// All subtree-containment bits.
    #[must_use]
    pub const fn containment_bits() -> TransformFlags {
        TransformFlags::CONTAINS_ES6
            .union(TransformFlags::CONTAINS_LEXICAL_THIS)
            .union(TransformFlags::CONTAINS_CAPTURED_LEXICAL_THIS)
            .union(TransformFlags::CONTAINS_DEFAULT_VALUE_ASSIGNMENTS)
            .union(TransformFlags::CONTAINS_SPREAD_ELEMENT_EXPRESSION)
    }

    /// Project a node's flags into the form its parent aggregates:
    /// containment bits pass through, node-level assertions turn into
    /// their containment counterparts.
    #[must_use]
    pub fn as_subtree_flags(self) -> TransformFlags {
        let mut out = self & Self::containment_bits();
        if self.intersects(TransformFlags::ES6) {
            out |= TransformFlags::CONTAINS_ES6;
        }
        if self.intersects(TransformFlags::LEXICAL_THIS) {
            out |= TransformFlags::CONTAINS_LEXICAL_THIS;
        }
        out
    }

    /// Bits that do not propagate past a node of the given kind.
    ///
    /// Function bodies scope their own `this` and their own parameter
    /// prologue work, so those containment bits stop at the function
    /// boundary. Arrow functions are transparent to `this` containment
    /// (that is the point of capturing) but still scope parameter work.
    #[must_use]
    pub fn subtree_exclusions(kind: SyntaxKind) -> TransformFlags {
        match kind {
            SyntaxKind::ArrowFunction => TransformFlags::CONTAINS_DEFAULT_VALUE_ASSIGNMENTS,
            k if k.is_this_container() && k != SyntaxKind::SourceFile => {
                TransformFlags::CONTAINS_LEXICAL_THIS
                    | TransformFlags::CONTAINS_CAPTURED_LEXICAL_THIS
                    | TransformFlags::CONTAINS_DEFAULT_VALUE_ASSIGNMENTS
            }
            _ => TransformFlags::empty(),
        }
    }
}
