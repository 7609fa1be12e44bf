//! Common types and utilities for the esdown down-level compiler.
//!
//! This crate provides foundational types used across all esdown crates:
//! - Source spans (`Span`, `Spanned`)
//! - Line maps for offset → line/column conversion (`LineMap`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`)
//! - Compiler options (`ScriptTarget`, `TransformOptions`)

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::{Span, Spanned};

// Line/column conversion for diagnostics
pub mod position;
pub use position::{LineAndColumn, LineMap};

// Diagnostics
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};

// Compiler options
pub mod options;
pub use options::{ScriptTarget, TransformOptions};
