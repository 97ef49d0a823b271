//! Source location tracking

use std::cmp::Ordering;

/// A byte range in source code, used by the lexer and for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the start
    pub start: usize,
    /// Byte offset of the end (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Merge two spans into one that covers both
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Where a node starts in its source file, plus the raw text it covers.
///
/// `row` and `col` are 1-based; `col` counts bytes. The end position is
/// never stored, it is derived from `text` when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub row: usize,
    pub col: usize,
    pub text: Option<String>,
}

impl SourceSpan {
    pub fn new(row: usize, col: usize, text: impl Into<String>) -> Self {
        Self {
            row,
            col,
            text: Some(text.into()),
        }
    }

    /// A position with no covered text
    pub fn point(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            text: None,
        }
    }

    /// True when both spans start at the same row and column
    pub fn same_start(&self, other: &SourceSpan) -> bool {
        self.row == other.row && self.col == other.col
    }

    /// Order by start position only
    pub fn cmp_start(&self, other: &SourceSpan) -> Ordering {
        (self.row, self.col).cmp(&(other.row, other.col))
    }
}

/// Maps byte offsets of one source file to 1-based rows and columns
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// 1-based `(row, col)` of a byte offset
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }

    /// Build a `SourceSpan` covering `span` of `source`
    pub fn source_span(&self, source: &str, span: Span) -> SourceSpan {
        let (row, col) = self.position(span.start);
        SourceSpan::new(row, col, &source[span.start..span.end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_positions() {
        let source = "package a\n\nallow if {\n  true\n}\n";
        let index = LineIndex::new(source);

        assert_eq!(index.position(0), (1, 1));
        assert_eq!(index.position(8), (1, 9));
        assert_eq!(index.position(10), (2, 1));
        assert_eq!(index.position(11), (3, 1));
        assert_eq!(index.position(24), (4, 3));
    }

    #[test]
    fn test_source_span_text() {
        let source = "package foo.bar";
        let index = LineIndex::new(source);
        let span = index.source_span(source, Span::new(8, 15));

        assert_eq!(span, SourceSpan::new(1, 9, "foo.bar"));
    }

    #[test]
    fn test_cmp_start_ignores_text() {
        let a = SourceSpan::new(2, 5, "x");
        let b = SourceSpan::new(2, 5, "longer");
        let c = SourceSpan::point(3, 1);

        assert_eq!(a.cmp_start(&b), Ordering::Equal);
        assert_eq!(a.cmp_start(&c), Ordering::Less);
        assert!(a.same_start(&b));
    }
}
