//! End position derivation for source spans

use std::io;

use lintel_ast::SourceSpan;

use crate::JsonWriter;

/// Compute `(end_row, end_col)` for text starting at `row:col`.
///
/// Lengths are in bytes. A multi-line text ends on the column after the
/// last byte of its final line.
pub fn end_position(row: usize, col: usize, text: Option<&str>) -> (usize, usize) {
    let Some(text) = text else {
        return (row, col);
    };

    match text.rfind('\n') {
        None => (row, col + text.len()),
        Some(last) => {
            let newlines = text.bytes().filter(|b| *b == b'\n').count();
            (row + newlines, text.len() - (last + 1) + 1)
        }
    }
}

/// The four numbers rendered in a `location` field
pub fn positions(span: &SourceSpan) -> [usize; 4] {
    let (end_row, end_col) = end_position(span.row, span.col, span.text.as_deref());
    [span.row, span.col, end_row, end_col]
}

/// Write `"location": "row:col:endRow:endCol"` when a span is present
pub(crate) fn write_location_field<W: io::Write, F: serde_json::ser::Formatter>(
    out: &mut JsonWriter<W, F>,
    span: Option<&SourceSpan>,
) -> io::Result<()> {
    match span {
        Some(span) => {
            out.key("location")?;
            out.position(positions(span))
        }
        None => Ok(()),
    }
}
