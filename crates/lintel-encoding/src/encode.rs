//! The `Encode` trait and the field helpers shared by all node encoders

use std::io;

use lintel_ast::{SourceSpan, Term};
use serde_json::ser::Formatter;

use crate::location::write_location_field;
use crate::{JsonWriter, Result};

/// Write a syntax node to a JSON stream.
///
/// Each node writes exactly one JSON value: the caller has already written
/// the key when the node is an object field.
pub trait Encode {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()>;
}

impl<T: Encode> Encode for [T] {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        out.begin_array()?;
        for item in self {
            item.encode(out)?;
        }
        Ok(out.end_array()?)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        self.as_slice().encode(out)
    }
}

/// Open an object and write its `location` field when there is one
pub(crate) fn begin_object<W: io::Write, F: Formatter>(
    out: &mut JsonWriter<W, F>,
    location: Option<&SourceSpan>,
) -> Result<()> {
    out.begin_object()?;
    Ok(write_location_field(out, location)?)
}

pub(crate) fn end_object<W: io::Write, F: Formatter>(out: &mut JsonWriter<W, F>) -> Result<()> {
    Ok(out.end_object()?)
}

/// `"name": [items...]`
pub(crate) fn write_slice_field<W, F, T>(
    out: &mut JsonWriter<W, F>,
    name: &str,
    items: &[T],
) -> Result<()>
where
    W: io::Write,
    F: Formatter,
    T: Encode,
{
    out.key(name)?;
    items.encode(out)
}

/// `"name": [items...]`, left out entirely when there are no items
pub(crate) fn write_nonempty_slice_field<W, F, T>(
    out: &mut JsonWriter<W, F>,
    name: &str,
    items: &[T],
) -> Result<()>
where
    W: io::Write,
    F: Formatter,
    T: Encode,
{
    if items.is_empty() {
        return Ok(());
    }
    write_slice_field(out, name, items)
}

/// `"name": <term>`, left out when the term is absent
pub(crate) fn write_term_field<W: io::Write, F: Formatter>(
    out: &mut JsonWriter<W, F>,
    name: &str,
    term: Option<&Term>,
) -> Result<()> {
    match term {
        Some(term) => {
            out.key(name)?;
            term.encode(out)
        }
        None => Ok(()),
    }
}

/// `"name": "value"`, left out when the string is empty
pub(crate) fn write_string_field<W: io::Write, F: Formatter>(
    out: &mut JsonWriter<W, F>,
    name: &str,
    value: &str,
) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    out.key(name)?;
    Ok(out.string(value)?)
}

/// `"name": true`; flags that are off never appear
pub(crate) fn write_flag_field<W: io::Write, F: Formatter>(
    out: &mut JsonWriter<W, F>,
    name: &str,
    set: bool,
) -> Result<()> {
    if !set {
        return Ok(());
    }
    out.key(name)?;
    Ok(out.bool(true)?)
}
