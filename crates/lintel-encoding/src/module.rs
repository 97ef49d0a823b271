//! Module, rule and annotation encoders

use std::io;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use lintel_ast::{
    Annotations, Author, Comment, Head, Import, Module, Package, RelatedResource, Rule,
    SchemaAnnotation,
};
use serde_json::ser::Formatter;

use crate::encode::{
    begin_object, end_object, write_flag_field, write_nonempty_slice_field, write_slice_field,
    write_string_field, write_term_field,
};
use crate::term::encode_term_at;
use crate::{Encode, JsonWriter, Result};

impl Encode for Module {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, None)?;

        if let Some(package) = &self.package {
            out.key("package")?;
            begin_object(out, package.location.as_ref())?;
            write_package_path(out, package)?;

            if self.package_annotations().next().is_some() {
                out.key("annotations")?;
                out.begin_array()?;
                for annotations in self.package_annotations() {
                    annotations.encode(out)?;
                }
                out.end_array()?;
            }

            end_object(out)?;
        }

        write_nonempty_slice_field(out, "imports", &self.imports)?;
        write_nonempty_slice_field(out, "rules", &self.rules)?;
        write_nonempty_slice_field(out, "comments", &self.comments)?;

        end_object(out)
    }
}

impl Encode for Package {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, self.location.as_ref())?;
        write_package_path(out, self)?;
        end_object(out)
    }
}

/// The root document term is never written in source, so it is always
/// emitted without a location.
fn write_package_path<W: io::Write, F: Formatter>(
    out: &mut JsonWriter<W, F>,
    package: &Package,
) -> Result<()> {
    if package.path.is_empty() {
        return Ok(());
    }

    out.key("path")?;
    out.begin_array()?;
    Module::default_root_document().encode(out)?;
    for term in &package.path[1..] {
        term.encode(out)?;
    }
    Ok(out.end_array()?)
}

impl Encode for Import {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, self.location.as_ref())?;
        write_term_field(out, "path", Some(&self.path))?;
        write_string_field(out, "alias", &self.alias)?;
        end_object(out)
    }
}

impl Encode for Comment {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, self.location.as_ref())?;
        out.key("text")?;
        out.string(&STANDARD.encode(&self.text))?;
        end_object(out)
    }
}

impl Encode for Rule {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, self.location.as_ref())?;
        write_nonempty_slice_field(out, "annotations", &self.annotations)?;
        write_flag_field(out, "default", self.default)?;

        out.key("head")?;
        self.head.encode(out)?;

        if !self.is_body_generated() {
            write_slice_field(out, "body", &self.body)?;
        }

        if let Some(else_rule) = &self.else_rule {
            out.key("else")?;
            else_rule.encode(out)?;
        }

        end_object(out)
    }
}

impl Encode for Head {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, self.location.as_ref())?;
        write_nonempty_slice_field(out, "ref", &self.reference)?;
        write_nonempty_slice_field(out, "args", &self.args)?;
        write_flag_field(out, "assign", self.assign)?;
        write_term_field(out, "key", self.key.as_ref())?;

        if let Some(value) = &self.value {
            // A value starting where the head starts was synthesized by the
            // parser (`allow if ...` means `allow := true if ...`).
            let location = match (&value.location, &self.location) {
                (Some(v), Some(h)) if v.same_start(h) => None,
                (location, _) => location.as_ref(),
            };
            out.key("value")?;
            encode_term_at(out, value, location)?;
        }

        end_object(out)
    }
}

impl Encode for Annotations {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, self.location.as_ref())?;
        write_string_field(out, "scope", &self.scope)?;
        write_string_field(out, "title", &self.title)?;
        write_string_field(out, "description", &self.description)?;
        write_flag_field(out, "entrypoint", self.entrypoint)?;

        if !self.organizations.is_empty() {
            out.key("organizations")?;
            out.begin_array()?;
            for organization in &self.organizations {
                out.string(organization)?;
            }
            out.end_array()?;
        }

        write_nonempty_slice_field(out, "related_resources", &self.related_resources)?;
        write_nonempty_slice_field(out, "authors", &self.authors)?;
        write_nonempty_slice_field(out, "schemas", &self.schemas)?;

        if !self.custom.is_empty() {
            out.key("custom")?;
            out.json_map(&self.custom)?;
        }

        end_object(out)
    }
}

impl Encode for RelatedResource {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, None)?;
        out.key("ref")?;
        out.string(&self.reference)?;
        write_string_field(out, "description", &self.description)?;
        end_object(out)
    }
}

impl Encode for Author {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, None)?;
        out.key("name")?;
        out.string(&self.name)?;
        write_string_field(out, "email", &self.email)?;
        end_object(out)
    }
}

impl Encode for SchemaAnnotation {
    fn encode<W: io::Write, F: Formatter>(&self, out: &mut JsonWriter<W, F>) -> Result<()> {
        begin_object(out, None)?;
        write_slice_field(out, "path", &self.path)?;
        if let Some(schema) = &self.schema {
            write_slice_field(out, "schema", schema)?;
        }
        if let Some(definition) = &self.definition {
            out.key("definition")?;
            out.json(definition)?;
        }
        end_object(out)
    }
}
