//! AST data model for the esdown down-level compiler.
//!
//! This crate provides:
//! - `SyntaxKind`, `BinaryOp`, `UnaryOp` - syntactic tags and operators
//! - `NodeFlags`, `TransformFlags` - static modifiers and rewrite hints
//! - `Node`, `NodeKind`, `NodeRef` - the immutable, shared node model
//! - `NodeFactory` - node construction with precomputed transform flags
//! - `visit` - generic child enumeration and the structural copy-visitor
//! - `printer` - a test-support JavaScript printer

pub mod kind;
pub use kind::{BinaryOp, SyntaxKind, UnaryOp};

pub mod flags;
pub use flags::{NodeFlags, TransformFlags};

pub mod node;
pub use node::{Node, NodeId, NodeKind, NodeRef};

pub mod factory;
pub use factory::NodeFactory;

pub mod visit;
pub use visit::{for_each_child, visit_each_child, walk};

pub mod printer;
pub use printer::{NoSubstitutions, PrintSubstitutions, Printer};
