//! Metadata annotations attached to packages and rules

use serde_json::{Map, Value as JsonValue};

use crate::{SourceSpan, Term};

/// Where an annotation block applies
pub const SCOPE_PACKAGE: &str = "package";
pub const SCOPE_SUBPACKAGES: &str = "subpackages";
pub const SCOPE_RULE: &str = "rule";
pub const SCOPE_DOCUMENT: &str = "document";

/// A `# METADATA` block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Annotations {
    pub scope: String,
    pub title: String,
    pub description: String,
    pub entrypoint: bool,
    pub organizations: Vec<String>,
    pub related_resources: Vec<RelatedResource>,
    pub authors: Vec<Author>,
    pub schemas: Vec<SchemaAnnotation>,
    /// Free-form data, kept as generic JSON
    pub custom: Map<String, JsonValue>,
    pub location: Option<SourceSpan>,
}

impl Annotations {
    /// Anything that is neither rule nor document scoped belongs to the package
    pub fn is_package_scoped(&self) -> bool {
        self.scope != SCOPE_DOCUMENT && self.scope != SCOPE_RULE
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelatedResource {
    pub reference: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    /// Parse the `Name <email>` shorthand
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match (s.rfind('<'), s.ends_with('>')) {
            (Some(open), true) => Self {
                name: s[..open].trim().to_string(),
                email: s[open + 1..s.len() - 1].trim().to_string(),
            },
            _ => Self {
                name: s.to_string(),
                email: String::new(),
            },
        }
    }
}

/// `schemas` entry: a path and either a schema ref or an inline definition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaAnnotation {
    pub path: Vec<Term>,
    pub schema: Option<Vec<Term>>,
    pub definition: Option<JsonValue>,
}
