//! Expression encoders: `with`, `some`, `every` and the expression itself

use std::io;

use lintel_ast::{Every, Expr, ExprTerms, SomeDecl, With};
use serde_json::ser::Formatter;

use crate::encode::{
    begin_object, end_object, write_flag_field, write_nonempty_slice_field, write_slice_field,
    write_term_field,
};
use crate::{Encode, EncodeError, JsonWriter, Result};

impl Encode for With {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, self.location.as_ref())?;
        write_term_field(out, "target", Some(&self.target))?;
        write_term_field(out, "value", Some(&self.value))?;
        end_object(out)
    }
}

impl Encode for SomeDecl {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, self.location.as_ref())?;
        write_slice_field(out, "symbols", &self.symbols)?;
        end_object(out)
    }
}

impl Encode for Every {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, self.location.as_ref())?;
        write_term_field(out, "key", self.key.as_ref())?;
        write_term_field(out, "value", Some(&self.value))?;
        write_term_field(out, "domain", Some(&self.domain))?;
        write_slice_field(out, "body", &self.body)?;
        end_object(out)
    }
}

impl Encode for Expr {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, self.location.as_ref())?;
        write_flag_field(out, "negated", self.negated)?;
        write_flag_field(out, "generated", self.generated)?;
        write_nonempty_slice_field(out, "with", &self.with)?;
        out.key("terms")?;
        self.terms.encode(out)?;
        end_object(out)
    }
}

impl Encode for ExprTerms {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        match self {
            ExprTerms::Term(term) => term.encode(out),
            ExprTerms::Terms(terms) => terms.encode(out),
            ExprTerms::SomeDecl(decl) => decl.encode(out),
            ExprTerms::Every(every) => every.encode(out),
            _ => Err(EncodeError::UnsupportedVariant(
                "unknown expression terms".to_string(),
            )),
        }
    }
}
