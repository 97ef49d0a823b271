//! Term and value encoders
//!
//! A term is written as `{"location"?, "type", "value"}`. Scalars become a
//! single token; objects and sets become arrays in source order, since a
//! JSON object can neither hold non-string keys nor keep their order.

use std::io;

use lintel_ast::{
    ArrayComprehension, Number, Object, ObjectComprehension, Set, SetComprehension, SourceSpan,
    Term, Value,
};
use serde_json::ser::Formatter;

use crate::encode::{begin_object, end_object, write_slice_field};
use crate::order::source_order;
use crate::{Encode, EncodeError, JsonWriter, Result};

impl Encode for Term {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        encode_term_at(out, self, self.location.as_ref())
    }
}

/// Encode `term` as if it were located at `location`
pub(crate) fn encode_term_at<W: io::Write, F: Formatter>(
    out: &mut JsonWriter<W, F>,
    term: &Term,
    location: Option<&SourceSpan>,
) -> Result<()> {
    begin_object(out, location)?;
    out.key("type")?;
    out.string(term.value.type_name())?;
    out.key("value")?;
    term.value.encode(out)?;
    end_object(out)
}

impl Encode for Value {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        match self {
            Value::String(s) => Ok(out.string(s)?),
            Value::Var(name) => Ok(out.string(name)?),
            Value::Boolean(b) => Ok(out.bool(*b)?),
            Value::Null => Ok(out.null()?),
            Value::Number(n) => encode_number(out, n),
            Value::Ref(terms) | Value::Array(terms) | Value::Call(terms) => terms.encode(out),
            Value::Object(object) => object.encode(out),
            Value::Set(set) => set.encode(out),
            Value::ArrayComprehension(ac) => ac.encode(out),
            Value::SetComprehension(sc) => sc.encode(out),
            Value::ObjectComprehension(oc) => oc.encode(out),
            other => Err(EncodeError::UnsupportedVariant(other.type_name().to_string())),
        }
    }
}

/// Integers stay integers; only values with a fraction become floats
fn encode_number<W: io::Write, F: Formatter>(out: &mut JsonWriter<W, F>, n: &Number) -> Result<()> {
    if let Some(i) = n.as_i64() {
        return Ok(out.i64(i)?);
    }

    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(out.i64(f as i64)?)
        }
        Some(f) => Ok(out.f64(f)?),
        None => Err(EncodeError::InvalidNumber(n.literal().to_string())),
    }
}

impl Encode for Object {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        out.begin_array()?;
        for (key, value) in source_order(self.entries(), |entry| entry.0.location.as_ref()).iter() {
            out.begin_array()?;
            key.encode(out)?;
            value.encode(out)?;
            out.end_array()?;
        }
        Ok(out.end_array()?)
    }
}

impl Encode for Set {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        out.begin_array()?;
        for term in source_order(self.elems(), |term| term.location.as_ref()).iter() {
            term.encode(out)?;
        }
        Ok(out.end_array()?)
    }
}

impl Encode for ArrayComprehension {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        out.begin_object()?;
        out.key("term")?;
        self.term.encode(out)?;
        write_slice_field(out, "body", &self.body)?;
        end_object(out)
    }
}

impl Encode for SetComprehension {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        out.begin_object()?;
        out.key("term")?;
        self.term.encode(out)?;
        write_slice_field(out, "body", &self.body)?;
        end_object(out)
    }
}

impl Encode for ObjectComprehension {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        out.begin_object()?;
        out.key("key")?;
        self.key.encode(out)?;
        out.key("value")?;
        self.value.encode(out)?;
        write_slice_field(out, "body", &self.body)?;
        end_object(out)
    }
}
