//! Diagnostics produced by the down-level transform.
//!
//! The transform assumes a well-typed input, so the only diagnostics it
//! produces are programming errors (an ES6-flagged node of a kind the
//! dispatcher does not handle). They carry file/line/column so the host
//! can report them like any other compiler diagnostic.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message_text: String,
}

impl Diagnostic {
    pub fn error(
        file: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            file: file.into(),
            line,
            column,
            message_text: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({},{}): {}",
            self.file, self.line, self.column, self.message_text
        )
    }
}

/// Diagnostic codes used by the transform.
pub mod diagnostic_codes {
    /// An ES6-flagged node of a kind the dispatcher does not handle.
    pub const UNHANDLED_SYNTAX_KIND: u32 = 9100;
}
