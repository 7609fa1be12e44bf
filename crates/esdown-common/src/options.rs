//! Compiler options consumed by the down-level transform.
//!
//! Only the options that change transform behavior live here. Everything
//! else (module kind, emit formatting, paths) belongs to the surrounding
//! pipeline and never reaches the transform.

/// ECMAScript target version.
///
/// The transform runs for ES3/ES5 targets and is a no-op for ES6.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum ScriptTarget {
    /// ECMAScript 3 (1999)
    ES3 = 0,

    /// ECMAScript 5 (2009)
    #[default]
    ES5 = 1,

    /// ECMAScript 2015 (6th Edition)
    ES6 = 2,
}

impl ScriptTarget {
    /// Check if this target supports ES6 features natively (classes,
    /// arrows, templates). When true, the down-level transform is disabled.
    #[must_use]
    pub const fn supports_es6(self) -> bool {
        (self as u8) >= (Self::ES6 as u8)
    }

    /// Check if this is an ES5 or earlier target (requires downleveling)
    #[must_use]
    pub const fn is_es5(self) -> bool {
        (self as u8) <= (Self::ES5 as u8)
    }
}

/// Options for a single transform run.
#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct TransformOptions {
    /// Target language level. ES6 disables the transform entirely.
    pub target: ScriptTarget,
}

impl TransformOptions {
    #[must_use]
    pub const fn es5() -> Self {
        Self {
            target: ScriptTarget::ES5,
        }
    }

    #[must_use]
    pub const fn es6() -> Self {
        Self {
            target: ScriptTarget::ES6,
        }
    }
}
