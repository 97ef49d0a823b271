//! `# METADATA` comment blocks
//!
//! The block content is a small YAML document. Only the subset annotations
//! need is understood: block mappings and sequences, plain scalars
//! (possibly folded over indented lines), quoted scalars, `|`/`>` block
//! scalars, single-line flow collections and ` #` trailing comments.

use lintel_ast::{
    Annotations, Author, RelatedResource, SchemaAnnotation, Term, SCOPE_DOCUMENT, SCOPE_PACKAGE,
    SCOPE_RULE, SCOPE_SUBPACKAGES,
};
use serde_json::{Map, Number, Value};

/// Build annotations from the lines of a metadata block (`#` removed)
pub fn parse_annotations(lines: &[&str]) -> Result<Annotations, String> {
    let document = parse_yaml(lines)?;
    let fields = match document {
        Value::Null => return Ok(Annotations::default()),
        Value::Object(fields) => fields,
        _ => return Err("expected a mapping".to_string()),
    };

    let mut annotations = Annotations::default();
    for (key, value) in fields {
        match key.as_str() {
            "scope" => {
                let scope = expect_string(&key, value)?;
                if ![SCOPE_PACKAGE, SCOPE_SUBPACKAGES, SCOPE_RULE, SCOPE_DOCUMENT]
                    .contains(&scope.as_str())
                {
                    return Err(format!("invalid scope: {scope}"));
                }
                annotations.scope = scope;
            }
            "title" => annotations.title = expect_string(&key, value)?,
            "description" => annotations.description = expect_string(&key, value)?,
            "entrypoint" => match value {
                Value::Bool(b) => annotations.entrypoint = b,
                _ => return Err("entrypoint must be a boolean".to_string()),
            },
            "organizations" => {
                for org in expect_list(&key, value)? {
                    annotations.organizations.push(expect_string(&key, org)?);
                }
            }
            "related_resources" => {
                for item in expect_list(&key, value)? {
                    annotations.related_resources.push(related_resource(item)?);
                }
            }
            "authors" => {
                for item in expect_list(&key, value)? {
                    annotations.authors.push(author(item)?);
                }
            }
            "schemas" => {
                for item in expect_list(&key, value)? {
                    annotations.schemas.push(schema(item)?);
                }
            }
            "custom" => match value {
                Value::Object(map) => annotations.custom = map,
                Value::Null => {}
                _ => return Err("custom must be a mapping".to_string()),
            },
            // Unknown keys are tolerated so newer metadata still parses.
            _ => {}
        }
    }

    Ok(annotations)
}

fn expect_string(key: &str, value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(format!("{key} must be a string")),
    }
}

fn expect_list(key: &str, value: Value) -> Result<Vec<Value>, String> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        _ => Err(format!("{key} must be a list")),
    }
}

fn related_resource(item: Value) -> Result<RelatedResource, String> {
    match item {
        Value::String(reference) => Ok(RelatedResource {
            reference,
            description: String::new(),
        }),
        Value::Object(mut fields) => {
            let reference = match fields.remove("ref") {
                Some(v) => expect_string("ref", v)?,
                None => return Err("related resource needs a ref".to_string()),
            };
            let description = match fields.remove("description") {
                Some(v) => expect_string("description", v)?,
                None => String::new(),
            };
            Ok(RelatedResource {
                reference,
                description,
            })
        }
        _ => Err("invalid related resource".to_string()),
    }
}

fn author(item: Value) -> Result<Author, String> {
    match item {
        Value::String(s) => Ok(Author::parse(&s)),
        Value::Object(mut fields) => {
            let name = match fields.remove("name") {
                Some(v) => expect_string("name", v)?,
                None => String::new(),
            };
            let email = match fields.remove("email") {
                Some(v) => expect_string("email", v)?,
                None => String::new(),
            };
            if name.is_empty() && email.is_empty() {
                return Err("author needs a name or email".to_string());
            }
            Ok(Author { name, email })
        }
        _ => Err("invalid author".to_string()),
    }
}

fn schema(item: Value) -> Result<SchemaAnnotation, String> {
    let Value::Object(fields) = item else {
        return Err("schema entry must be a mapping".to_string());
    };
    let mut entries = fields.into_iter();
    let (Some((path, value)), None) = (entries.next(), entries.next()) else {
        return Err("schema entry must have exactly one key".to_string());
    };

    let path = dotted_ref(&path);
    Ok(match value {
        Value::String(s) => SchemaAnnotation {
            path,
            schema: Some(dotted_ref(&s)),
            definition: None,
        },
        definition => SchemaAnnotation {
            path,
            schema: None,
            definition: Some(definition),
        },
    })
}

/// `input.user.name` as ref terms: a var head followed by string keys
fn dotted_ref(path: &str) -> Vec<Term> {
    let mut parts = path.split('.');
    let mut terms = Vec::new();
    if let Some(head) = parts.next() {
        terms.push(Term::var(head.trim()));
    }
    terms.extend(parts.map(|p| Term::string(p.trim())));
    terms
}

// === YAML subset ===

struct Line {
    indent: usize,
    /// Text after the indentation, trailing comment removed
    content: String,
    /// Text after the indentation as written; block scalars keep `#`
    raw: String,
}

/// Parse block lines into a generic value
pub fn parse_yaml(lines: &[&str]) -> Result<Value, String> {
    let mut parsed = Vec::new();
    for raw in lines {
        let trimmed = raw.trim_end();
        let text = trimmed.trim_start();
        let content = strip_comment(text);
        if content.is_empty() {
            continue;
        }
        if trimmed.starts_with('\t') {
            return Err("tabs are not allowed for indentation".to_string());
        }
        parsed.push(Line {
            indent: trimmed.len() - text.len(),
            content: content.to_string(),
            raw: text.to_string(),
        });
    }

    if parsed.is_empty() {
        return Ok(Value::Null);
    }

    let mut reader = YamlReader {
        lines: parsed,
        pos: 0,
    };
    let indent = reader.lines[0].indent;
    let value = reader.block(indent)?;
    if reader.pos < reader.lines.len() {
        return Err(format!("unexpected content: {}", reader.lines[reader.pos].content));
    }
    Ok(value)
}

struct YamlReader {
    lines: Vec<Line>,
    pos: usize,
}

impl YamlReader {
    fn block(&mut self, indent: usize) -> Result<Value, String> {
        if is_sequence_item(&self.lines[self.pos].content) {
            self.sequence(indent)
        } else {
            self.mapping(indent)
        }
    }

    fn mapping(&mut self, indent: usize) -> Result<Value, String> {
        let mut map = Map::new();

        while self.pos < self.lines.len() && self.lines[self.pos].indent == indent {
            let content = self.lines[self.pos].content.clone();
            if is_sequence_item(&content) {
                break;
            }
            let (key, rest) =
                split_key(&content).ok_or_else(|| format!("expected `key: value`, found {content}"))?;
            self.pos += 1;

            let value = match rest {
                "" => self.nested(indent)?,
                "|" | "|-" | ">" | ">-" => self.block_scalar(indent, rest),
                scalar => self.flow_with_continuation(indent, scalar)?,
            };
            map.insert(unquote(key), value);
        }

        Ok(Value::Object(map))
    }

    /// Value of a key written without one on its line
    fn nested(&mut self, indent: usize) -> Result<Value, String> {
        match self.lines.get(self.pos) {
            Some(next) if next.indent > indent => {
                let next_indent = next.indent;
                self.block(next_indent)
            }
            // sequences may sit at the same indentation as their key
            Some(next) if next.indent == indent && is_sequence_item(&next.content) => {
                self.sequence(indent)
            }
            _ => Ok(Value::Null),
        }
    }

    fn sequence(&mut self, indent: usize) -> Result<Value, String> {
        let mut items = Vec::new();

        while self.pos < self.lines.len()
            && self.lines[self.pos].indent == indent
            && is_sequence_item(&self.lines[self.pos].content)
        {
            let content = self.lines[self.pos].content.clone();
            let rest = content[1..].trim_start();

            if rest.is_empty() {
                self.pos += 1;
                items.push(self.nested(indent)?);
            } else if split_key(rest).is_some() && !rest.starts_with(['[', '{', '"', '\'']) {
                // `- key: value` opens a mapping indented at the key
                let offset = content.len() - rest.len();
                let raw = self.lines[self.pos].raw.clone();
                self.lines[self.pos] = Line {
                    indent: indent + offset,
                    content: rest.to_string(),
                    raw: raw[offset.min(raw.len())..].to_string(),
                };
                items.push(self.mapping(indent + offset)?);
            } else {
                self.pos += 1;
                items.push(self.flow_with_continuation(indent, rest)?);
            }
        }

        Ok(Value::Array(items))
    }

    /// A value on the key's line; a plain scalar continues on every
    /// following line indented deeper than `indent`, joined by spaces
    fn flow_with_continuation(&mut self, indent: usize, first: &str) -> Result<Value, String> {
        let start = self.pos;
        while self.pos < self.lines.len() && self.lines[self.pos].indent > indent {
            self.pos += 1;
        }
        if start == self.pos {
            return flow(first);
        }
        if first.starts_with(['[', '{', '"', '\'']) {
            return Err(format!(
                "unexpected content: {}",
                self.lines[start].content
            ));
        }

        let mut text = first.to_string();
        for line in &self.lines[start..self.pos] {
            text.push(' ');
            text.push_str(&line.content);
        }
        Ok(scalar(&text))
    }

    fn block_scalar(&mut self, indent: usize, style: &str) -> Value {
        let start = self.pos;
        while self.pos < self.lines.len() && self.lines[self.pos].indent > indent {
            self.pos += 1;
        }
        let taken = &self.lines[start..self.pos];
        let Some(min_indent) = taken.iter().map(|l| l.indent).min() else {
            return Value::String(String::new());
        };

        let text: Vec<String> = taken
            .iter()
            .map(|l| format!("{}{}", " ".repeat(l.indent - min_indent), l.raw))
            .collect();
        let mut joined = if style.starts_with('|') {
            text.join("\n")
        } else {
            text.join(" ")
        };
        if !style.ends_with('-') {
            joined.push('\n');
        }
        Value::String(joined)
    }
}

/// Drop a ` # comment` tail that is not inside quotes
fn strip_comment(text: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev = ' ';

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if prev.is_whitespace() || "[{,:".contains(prev) => {
                quote = Some(c)
            }
            (None, '#') if prev.is_whitespace() => return text[..i].trim_end(),
            _ => {}
        }
        prev = c;
    }
    text
}

fn is_sequence_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

/// Split `key: value` / `key:`; the key may not contain `": "`
fn split_key(content: &str) -> Option<(&str, &str)> {
    if let Some(key) = content.strip_suffix(':') {
        if !key.contains(": ") {
            return Some((key.trim(), ""));
        }
    }
    content
        .find(": ")
        .map(|i| (content[..i].trim(), content[i + 2..].trim()))
}

fn unquote(s: &str) -> String {
    match scalar(s) {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Single-line value: flow collection or scalar
fn flow(s: &str) -> Result<Value, String> {
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| format!("unterminated flow sequence: {s}"))?;
        return split_flow(inner)?
            .into_iter()
            .map(flow)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array);
    }
    if let Some(inner) = s.strip_prefix('{') {
        let inner = inner
            .strip_suffix('}')
            .ok_or_else(|| format!("unterminated flow mapping: {s}"))?;
        let mut map = Map::new();
        for entry in split_flow(inner)? {
            let (key, value) = entry
                .split_once(':')
                .ok_or_else(|| format!("expected `key: value`, found {entry}"))?;
            map.insert(unquote(key.trim()), flow(value)?);
        }
        return Ok(Value::Object(map));
    }
    Ok(scalar(s))
}

/// Split on top-level commas, ignoring commas nested in brackets or quotes
fn split_flow(s: &str) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '{') => depth += 1,
            (None, ']' | '}') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 || quote.is_some() {
        return Err(format!("unbalanced flow collection: {s}"));
    }
    let last = s[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    Ok(parts)
}

fn scalar(s: &str) -> Value {
    let s = s.trim();
    if s.starts_with('"') {
        if let Ok(decoded) = serde_json::from_str::<String>(s) {
            return Value::String(decoded);
        }
    }
    if let Some(inner) = s.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        return Value::String(inner.replace("''", "'"));
    }
    match s {
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        "null" | "Null" | "NULL" | "~" => return Value::Null,
        _ => {}
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Some(n) = s.parse::<f64>().ok().and_then(Number::from_f64) {
        if s.chars().all(|c| c.is_ascii_digit() || ".-+eE".contains(c)) {
            return Value::Number(n);
        }
    }
    Value::String(s.to_string())
}
