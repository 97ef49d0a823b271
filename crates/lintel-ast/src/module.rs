//! Module-level AST nodes: package, imports, rules, comments

use crate::{Annotations, Body, ExprTerms, SourceSpan, Term};

/// Name of the root document every package path starts with
pub const ROOT_DOCUMENT: &str = "data";

/// One parsed policy file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub package: Option<Package>,
    pub imports: Vec<Import>,
    pub rules: Vec<Rule>,
    /// Every annotation block found in the file, in source order
    pub annotations: Vec<Annotations>,
    pub comments: Vec<Comment>,
}

impl Module {
    /// Unlocated `data` var term that heads every package path
    pub fn default_root_document() -> Term {
        Term::var(ROOT_DOCUMENT)
    }

    /// Annotations that apply to the package rather than to a rule
    pub fn package_annotations(&self) -> impl Iterator<Item = &Annotations> {
        self.annotations.iter().filter(|a| a.is_package_scoped())
    }
}

/// `package a.b.c`
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// Full path including the leading root document term
    pub path: Vec<Term>,
    pub location: Option<SourceSpan>,
}

/// `import data.x.y as z`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: Term,
    /// Empty when no alias was given
    pub alias: String,
    pub location: Option<SourceSpan>,
}

/// A rule definition, possibly with an `else` chain
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub annotations: Vec<Annotations>,
    pub default: bool,
    pub head: Head,
    pub body: Body,
    pub else_rule: Option<Box<Rule>>,
    pub location: Option<SourceSpan>,
}

impl Rule {
    /// True when the body was inserted by the parser, not written
    pub fn is_body_generated(&self) -> bool {
        if self.default || self.body.is_empty() {
            return true;
        }

        if let [expr] = self.body.as_slice() {
            if expr.generated && matches!(&expr.terms, ExprTerms::Term(t) if t.is_true()) {
                return true;
            }
        }

        match (&self.body[0].location, &self.head.location) {
            (Some(body), Some(head)) => body == head,
            _ => false,
        }
    }
}

/// Rule head: name or ref, arguments, key and value
#[derive(Debug, Clone, PartialEq)]
pub struct Head {
    /// `a.b.c` part of `a.b.c := 1`
    pub reference: Vec<Term>,
    pub args: Vec<Term>,
    /// Partial set key: `deny contains msg`
    pub key: Option<Term>,
    pub value: Option<Term>,
    /// Written with `:=`
    pub assign: bool,
    pub location: Option<SourceSpan>,
}

impl Head {
    pub fn new(reference: Vec<Term>) -> Self {
        Self {
            reference,
            args: Vec::new(),
            key: None,
            value: None,
            assign: false,
            location: None,
        }
    }
}

/// A `#` comment
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Raw bytes following the `#`
    pub text: Vec<u8>,
    pub location: Option<SourceSpan>,
}
