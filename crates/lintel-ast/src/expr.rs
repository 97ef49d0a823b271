//! Expression AST nodes

use crate::{SourceSpan, Term};

/// A rule or comprehension body: expressions that must all hold
pub type Body = Vec<Expr>;

/// One boolean expression in a body
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// `not expr`
    pub negated: bool,
    /// Inserted by the parser rather than written by the author
    pub generated: bool,
    pub with: Vec<With>,
    pub terms: ExprTerms,
    pub location: Option<SourceSpan>,
}

impl Expr {
    pub fn new(terms: ExprTerms) -> Self {
        Self {
            negated: false,
            generated: false,
            with: Vec::new(),
            terms,
            location: None,
        }
    }

    pub fn with_location(mut self, location: Option<SourceSpan>) -> Self {
        self.location = location;
        self
    }

    /// The body the parser synthesizes for rules written without one
    pub fn generated_true(location: Option<SourceSpan>) -> Self {
        Self {
            generated: true,
            ..Self::new(ExprTerms::Term(Term::boolean(true).with_location(location.clone())))
        }
        .with_location(location)
    }

    /// Operator name when the expression is a call, e.g. `assign`
    pub fn operator(&self) -> Option<String> {
        match &self.terms {
            ExprTerms::Terms(terms) => terms.first().and_then(ref_name),
            _ => None,
        }
    }
}

/// What an expression is made of
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ExprTerms {
    /// A lone term: `input.allowed`
    Term(Term),
    /// Operator ref followed by operands: `x := 1`, `count(xs)`
    Terms(Vec<Term>),
    /// `some x, y` / `some x in xs`
    SomeDecl(SomeDecl),
    /// `every k, v in xs { ... }`
    Every(Every),
}

/// `with target as value`
#[derive(Debug, Clone, PartialEq)]
pub struct With {
    pub target: Term,
    pub value: Term,
    pub location: Option<SourceSpan>,
}

/// `some` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct SomeDecl {
    pub symbols: Vec<Term>,
    pub location: Option<SourceSpan>,
}

/// `every` quantifier
#[derive(Debug, Clone, PartialEq)]
pub struct Every {
    pub key: Option<Term>,
    pub value: Term,
    pub domain: Term,
    pub body: Body,
    pub location: Option<SourceSpan>,
}

/// Built-in operators the parser rewrites infix syntax into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Assign,
    Unify,
    Equal,
    NotEqual,
    LessThan,
    LessThanEq,
    GreaterThan,
    GreaterThanEq,
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    And,
    Or,
    Member,
    MemberWithKey,
}

impl Operator {
    /// Dotted name of the built-in function behind the operator
    pub fn name(self) -> &'static str {
        match self {
            Operator::Assign => "assign",
            Operator::Unify => "eq",
            Operator::Equal => "equal",
            Operator::NotEqual => "neq",
            Operator::LessThan => "lt",
            Operator::LessThanEq => "lte",
            Operator::GreaterThan => "gt",
            Operator::GreaterThanEq => "gte",
            Operator::Plus => "plus",
            Operator::Minus => "minus",
            Operator::Multiply => "mul",
            Operator::Divide => "div",
            Operator::Remainder => "rem",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Member => "internal.member_2",
            Operator::MemberWithKey => "internal.member_3",
        }
    }

    /// Ref term naming this operator, each segment placed at `location`
    pub fn ref_term(self, location: Option<SourceSpan>) -> Term {
        let mut parts = self.name().split('.');
        let mut terms = Vec::new();
        if let Some(head) = parts.next() {
            terms.push(Term::var(head).with_location(location.clone()));
        }
        terms.extend(parts.map(|p| Term::string(p).with_location(location.clone())));
        Term::reference(terms).with_location(location)
    }
}

/// Dotted name of a ref term whose segments are all plain names
pub fn ref_name(term: &Term) -> Option<String> {
    let crate::Value::Ref(terms) = &term.value else {
        return None;
    };
    let mut name = String::new();
    for (i, t) in terms.iter().enumerate() {
        match (&t.value, i) {
            (crate::Value::Var(v), 0) => name.push_str(v),
            (crate::Value::String(s), i) if i > 0 => {
                name.push('.');
                name.push_str(s);
            }
            _ => return None,
        }
    }
    Some(name)
}
