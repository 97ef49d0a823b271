//! Lintel Encoding - Source-faithful JSON for policy syntax trees
//!
//! Writes a parsed module as a compact or pretty JSON document without
//! building an intermediate document tree. The output is deterministic:
//! - every located node carries a `"location": "row:col:endRow:endCol"` field
//! - flags are only written when set, collections only when non-empty
//! - object and set entries follow the order they were written in
//!
//! The format is one-directional; there is no decoder.

mod encode;
mod error;
mod expr;
mod location;
mod module;
mod order;
mod term;
mod writer;

pub use encode::Encode;
pub use error::{EncodeError, Result};
pub use location::{end_position, positions};
pub use order::{compare_locations, source_order, SourceOrder};
pub use writer::JsonWriter;

use std::io;

/// Write `node` as compact JSON
pub fn to_writer<W, T>(writer: W, node: &T) -> Result<()>
where
    W: io::Write,
    T: Encode + ?Sized,
{
    let mut out = JsonWriter::new(writer);
    node.encode(&mut out)?;
    Ok(out.flush()?)
}

/// Write `node` as JSON indented by two spaces
pub fn to_writer_pretty<W, T>(writer: W, node: &T) -> Result<()>
where
    W: io::Write,
    T: Encode + ?Sized,
{
    let mut out = JsonWriter::pretty(writer);
    node.encode(&mut out)?;
    Ok(out.flush()?)
}

pub fn to_vec<T: Encode + ?Sized>(node: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(256);
    to_writer(&mut buf, node)?;
    Ok(buf)
}

pub fn to_string<T: Encode + ?Sized>(node: &T) -> Result<String> {
    into_string(to_vec(node)?)
}

pub fn to_string_pretty<T: Encode + ?Sized>(node: &T) -> Result<String> {
    let mut buf = Vec::with_capacity(256);
    to_writer_pretty(&mut buf, node)?;
    into_string(buf)
}

fn into_string(buf: Vec<u8>) -> Result<String> {
    String::from_utf8(buf)
        .map_err(|e| EncodeError::Write(io::Error::new(io::ErrorKind::InvalidData, e)))
}
