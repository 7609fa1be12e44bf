//! Offset → line/column conversion for diagnostics.
//!
//! The AST tracks byte offsets; diagnostics report 1-indexed line and
//! column numbers. A `LineMap` is built once per source file and answers
//! lookups with a binary search over line-start offsets.

/// A resolved source position (1-indexed line, 1-indexed byte column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LineAndColumn {
    pub line: u32,
    pub column: u32,
}

/// Line map for efficient offset → line/column conversion.
/// Stores the starting offset of each line.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting offset of each line (`line_starts[0]` is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    #[must_use]
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        let bytes = source.as_bytes();

        for (i, &b) in bytes.iter().enumerate() {
            if b == b'\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            } else if b == b'\r' && bytes.get(i + 1) != Some(&b'\n') {
                // Lone \r counts as a line ending; \r\n is handled by the \n
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a 1-indexed line/column pair.
    #[must_use]
    pub fn line_and_column(&self, offset: u32) -> LineAndColumn {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);

        LineAndColumn {
            line: u32::try_from(line).unwrap_or(u32::MAX).saturating_add(1),
            column: offset.saturating_sub(line_start).saturating_add(1),
        }
    }

    /// Get the number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the starting offset of a 0-indexed line.
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<u32> {
        self.line_starts.get(line).copied()
    }
}
