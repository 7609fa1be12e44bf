//! ES6-to-ES5 down-leveling transform for the esdown compiler.
//!
//! This crate provides:
//! - `TransformContext` - the transformer façade: lexical environments,
//!   temp/name allocation, ancestor queries, substitution registration
//! - `EmitResolver` - the semantic query surface the lowering consults
//! - `es6::transform_source_file` - the transform entry point
//! - The destructuring flattener behind the pattern-lowering bridge

pub mod context;
pub use context::{
    NameGenerator, SubstitutionPipeline, SubstitutionStage, TempHint, TransformContext,
};

pub mod resolver;
pub use resolver::{EmitResolver, NodeCheckFlags, NullResolver, StaticResolver};

pub mod destructuring;

pub mod es6;
pub use es6::{transform_source_file, Es6Transformer, TransformResult};
