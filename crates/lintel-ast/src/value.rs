//! Terms and the values they wrap

use crate::{Body, SourceSpan};

/// A value together with the place it was written.
///
/// Equality compares values only; two terms spelled at different places
/// are the same term. Sets and objects rely on this for membership.
#[derive(Debug, Clone)]
pub struct Term {
    pub value: Value,
    pub location: Option<SourceSpan>,
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Term {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            location: None,
        }
    }

    pub fn with_location(mut self, location: Option<SourceSpan>) -> Self {
        self.location = location;
        self
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::new(Value::String(s.into()))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::new(Value::Var(name.into()))
    }

    pub fn number(literal: impl Into<String>) -> Self {
        Self::new(Value::Number(Number::new(literal)))
    }

    pub fn boolean(b: bool) -> Self {
        Self::new(Value::Boolean(b))
    }

    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    pub fn reference(terms: Vec<Term>) -> Self {
        Self::new(Value::Ref(terms))
    }

    pub fn array(terms: Vec<Term>) -> Self {
        Self::new(Value::Array(terms))
    }

    pub fn object(object: Object) -> Self {
        Self::new(Value::Object(object))
    }

    pub fn set(set: Set) -> Self {
        Self::new(Value::Set(set))
    }

    pub fn call(terms: Vec<Term>) -> Self {
        Self::new(Value::Call(terms))
    }

    /// True for the literal `true`
    pub fn is_true(&self) -> bool {
        matches!(self.value, Value::Boolean(true))
    }
}

/// The closed set of value kinds a term can hold
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    String(String),
    Number(Number),
    Boolean(bool),
    Null,
    Var(String),
    /// `a.b[c]`: head term followed by its segments
    Ref(Vec<Term>),
    Array(Vec<Term>),
    Object(Object),
    Set(Set),
    ArrayComprehension(Box<ArrayComprehension>),
    SetComprehension(Box<SetComprehension>),
    ObjectComprehension(Box<ObjectComprehension>),
    /// Operator ref followed by the arguments
    Call(Vec<Term>),
}

impl Value {
    /// The name downstream tools use to tell value kinds apart
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Null => "null",
            Value::Var(_) => "var",
            Value::Ref(_) => "ref",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Set(_) => "set",
            Value::ArrayComprehension(_) => "arraycomprehension",
            Value::SetComprehension(_) => "setcomprehension",
            Value::ObjectComprehension(_) => "objectcomprehension",
            Value::Call(_) => "call",
        }
    }
}

/// A number kept as the literal that was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number(String);

impl Number {
    pub fn new(literal: impl Into<String>) -> Self {
        Self(literal.into())
    }

    pub fn literal(&self) -> &str {
        &self.0
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|f| f.is_finite())
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

/// Key/value pairs in insertion order.
///
/// Insertion order is whatever the producer chose; it is not guaranteed
/// to be the order the entries were written in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    entries: Vec<(Term, Term)>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair, replacing the value of an equal key
    pub fn insert(&mut self, key: Term, value: Term) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &Term) -> Option<&Term> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(Term, Term)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &Term)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl FromIterator<(Term, Term)> for Object {
    fn from_iter<I: IntoIterator<Item = (Term, Term)>>(iter: I) -> Self {
        let mut object = Object::new();
        for (k, v) in iter {
            object.insert(k, v);
        }
        object
    }
}

/// Distinct terms in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Set {
    elems: Vec<Term>,
}

impl Set {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term; returns false when an equal term is already present
    pub fn insert(&mut self, term: Term) -> bool {
        if self.elems.contains(&term) {
            return false;
        }
        self.elems.push(term);
        true
    }

    pub fn contains(&self, term: &Term) -> bool {
        self.elems.contains(term)
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn elems(&self) -> &[Term] {
        &self.elems
    }

    pub fn iter(&self) -> impl Iterator<Item = &Term> {
        self.elems.iter()
    }
}

impl FromIterator<Term> for Set {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        let mut set = Set::new();
        for term in iter {
            set.insert(term);
        }
        set
    }
}

/// `[term | body]`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayComprehension {
    pub term: Term,
    pub body: Body,
}

/// `{term | body}`
#[derive(Debug, Clone, PartialEq)]
pub struct SetComprehension {
    pub term: Term,
    pub body: Body,
}

/// `{key: value | body}`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectComprehension {
    pub key: Term,
    pub value: Term,
    pub body: Body,
}
