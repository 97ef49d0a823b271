//! Lintel Parser - Recursive descent parser
//!
//! Parses policy source into a `lintel_ast::Module`.
//! Things worth knowing:
//! - `=` unifies, `:=` assigns, `==` compares; all become builtin calls
//! - expressions in a body are separated by newlines or `;`
//! - rules without a value get a `true` value placed at the head, rules
//!   without a body get a generated `true` body
//! - `# METADATA` comment blocks become annotations

mod error;
mod metadata;
mod parser;

pub use error::*;
pub use parser::*;

use lintel_ast::{Module, Term};
use lintel_lexer::tokenize;

/// Parse a source string into a Module AST
pub fn parse(source: &str) -> Result<Module, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    parser.parse_module()
}

/// Parse a single term such as `{"a": [1, 2]}` or `input.user.name`
pub fn parse_term(source: &str) -> Result<Term, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    parser.parse_single_term()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintel_ast::{ExprTerms, SourceSpan, Value};

    fn parse_ok(source: &str) -> Module {
        match parse(source) {
            Ok(module) => module,
            Err(e) => panic!("Failed to parse: {e:?}"),
        }
    }

    #[test]
    fn test_parse_package() {
        let module = parse_ok("package foo.bar");
        let package = module.package.unwrap();

        assert_eq!(
            package.path,
            vec![Term::var("data"), Term::string("foo"), Term::string("bar")]
        );
        assert_eq!(package.path[0].location, None);
        assert_eq!(package.path[1].location, Some(SourceSpan::new(1, 9, "foo")));
        assert_eq!(package.location, Some(SourceSpan::new(1, 1, "package")));
    }

    #[test]
    fn test_missing_package() {
        let err = parse("allow := true").unwrap_err();
        assert!(matches!(err, ParseError::MissingPackage { .. }));
    }

    #[test]
    fn test_parse_imports() {
        let module = parse_ok("package p\n\nimport data.users as people\nimport rego.v1\n");

        assert_eq!(module.imports.len(), 2);
        assert_eq!(module.imports[0].alias, "people");
        assert_eq!(
            module.imports[0].path,
            Term::reference(vec![Term::var("data"), Term::string("users")])
        );
        assert_eq!(
            module.imports[0].location,
            Some(SourceSpan::new(3, 1, "import"))
        );
        assert_eq!(module.imports[1].alias, "");
    }

    #[test]
    fn test_constant_rule() {
        let module = parse_ok("package p\n\nlimit := 10\n");
        let rule = &module.rules[0];

        assert!(rule.head.assign);
        assert_eq!(rule.head.reference, vec![Term::var("limit")]);
        assert_eq!(rule.head.value, Some(Term::number("10")));
        assert_eq!(rule.head.location, Some(SourceSpan::new(3, 1, "limit := 10")));
        assert!(rule.is_body_generated());
    }

    #[test]
    fn test_value_less_rule_gets_true_at_head() {
        let module = parse_ok("package p\n\nallow if {\n\tinput.admin\n}\n");
        let head = &module.rules[0].head;
        let value = head.value.as_ref().unwrap();

        assert!(value.is_true());
        assert_eq!(value.location, head.location);
        assert_eq!(head.location, Some(SourceSpan::new(3, 1, "allow")));
        assert!(!module.rules[0].is_body_generated());
    }

    #[test]
    fn test_rule_location_spans_body() {
        let source = "package p\n\nallow if {\n\ttrue\n}\n";
        let module = parse_ok(source);

        assert_eq!(
            module.rules[0].location,
            Some(SourceSpan::new(3, 1, "allow if {\n\ttrue\n}"))
        );
    }

    #[test]
    fn test_body_expressions() {
        let source = r#"package p

allow if {
    x := input.user
    x.role == "admin"; not input.blocked
    count(x.groups) > 0
}
"#;
        let module = parse_ok(source);
        let body = &module.rules[0].body;

        assert_eq!(body.len(), 4);
        assert_eq!(body[0].operator().as_deref(), Some("assign"));
        assert_eq!(body[1].operator().as_deref(), Some("equal"));
        assert!(body[2].negated);
        assert_eq!(body[3].operator().as_deref(), Some("gt"));

        let ExprTerms::Terms(terms) = &body[3].terms else {
            panic!("expected call terms");
        };
        assert!(matches!(terms[1].value, Value::Call(_)));
    }

    #[test]
    fn test_single_expression_if() {
        let module = parse_ok("package p\n\nallow if input.x == 1\ndeny := false\n");

        assert_eq!(module.rules.len(), 2);
        assert_eq!(module.rules[0].body.len(), 1);
        assert_eq!(module.rules[0].body[0].operator().as_deref(), Some("equal"));
    }

    #[test]
    fn test_operator_ref_location() {
        let module = parse_ok("package p\n\nallow if x == 1\n");
        let ExprTerms::Terms(terms) = &module.rules[0].body[0].terms else {
            panic!("expected call terms");
        };

        assert_eq!(terms[0].location, Some(SourceSpan::new(3, 12, "==")));
        assert_eq!(
            module.rules[0].body[0].location,
            Some(SourceSpan::new(3, 10, "x == 1"))
        );
    }

    #[test]
    fn test_contains_rule() {
        let module = parse_ok("package p\n\ndeny contains msg if {\n\tmsg := \"no\"\n}\n");
        let head = &module.rules[0].head;

        assert_eq!(head.key, Some(Term::var("msg")));
        assert_eq!(head.value, None);
    }

    #[test]
    fn test_legacy_partial_set() {
        let module = parse_ok("package p\n\ndeny[msg] {\n\tmsg := 1\n}\n");
        let head = &module.rules[0].head;

        assert_eq!(head.reference, vec![Term::var("deny")]);
        assert_eq!(head.key, Some(Term::var("msg")));
    }

    #[test]
    fn test_function_rule() {
        let module = parse_ok("package p\n\nf(x, y) := x + y\n");
        let head = &module.rules[0].head;

        assert_eq!(head.args, vec![Term::var("x"), Term::var("y")]);
        let value = head.value.as_ref().unwrap();
        let Value::Call(terms) = &value.value else {
            panic!("expected call");
        };
        assert_eq!(lintel_ast::ref_name(&terms[0]).as_deref(), Some("plus"));
    }

    #[test]
    fn test_default_and_else() {
        let source = r#"package p

default level := 0

level := 2 if {
    input.admin
} else := 1 if {
    input.user
} else := -1
"#;
        let module = parse_ok(source);

        assert!(module.rules[0].default);
        let first = module.rules[1].else_rule.as_ref().unwrap();
        assert_eq!(first.head.value, Some(Term::number("1")));
        assert_eq!(first.head.reference, vec![Term::var("level")]);
        let second = first.else_rule.as_ref().unwrap();
        assert_eq!(second.head.value, Some(Term::number("-1")));
        assert!(second.is_body_generated());
        assert!(second.else_rule.is_none());
    }

    #[test]
    fn test_some_in() {
        let module = parse_ok("package p\n\nallow if {\n\tsome k, v in input.xs\n\tsome y\n}\n");
        let body = &module.rules[0].body;

        let ExprTerms::SomeDecl(decl) = &body[0].terms else {
            panic!("expected some");
        };
        let Value::Call(terms) = &decl.symbols[0].value else {
            panic!("expected member call");
        };
        assert_eq!(
            lintel_ast::ref_name(&terms[0]).as_deref(),
            Some("internal.member_3")
        );
        assert_eq!(terms.len(), 4);

        let ExprTerms::SomeDecl(decl) = &body[1].terms else {
            panic!("expected some");
        };
        assert_eq!(decl.symbols, vec![Term::var("y")]);
    }

    #[test]
    fn test_every() {
        let module = parse_ok("package p\n\nallow if {\n\tevery x in [1, 2] {\n\t\tx > 0\n\t}\n}\n");
        let ExprTerms::Every(every) = &module.rules[0].body[0].terms else {
            panic!("expected every");
        };

        assert_eq!(every.key, None);
        assert_eq!(every.value, Term::var("x"));
        assert_eq!(every.body.len(), 1);
    }

    #[test]
    fn test_with_modifiers() {
        let module = parse_ok("package p\n\nallow if {\n\ttest with input as {} with data.x as 1\n}\n");
        let expr = &module.rules[0].body[0];

        assert_eq!(expr.with.len(), 2);
        assert_eq!(
            expr.with[1].target,
            Term::reference(vec![Term::var("data"), Term::string("x")])
        );
    }

    #[test]
    fn test_wildcards_are_numbered() {
        let term = parse_term("input.xs[_][_]").unwrap();
        let Value::Ref(terms) = term.value else {
            panic!("expected ref");
        };

        assert_eq!(terms[2], Term::var("$0"));
        assert_eq!(terms[3], Term::var("$1"));
    }

    #[test]
    fn test_composite_terms() {
        assert_eq!(
            parse_term("[1, \"a\", true, null]").unwrap(),
            Term::array(vec![
                Term::number("1"),
                Term::string("a"),
                Term::boolean(true),
                Term::null(),
            ])
        );

        let Value::Object(object) = parse_term("{\"b\": 1, \"a\": 2}").unwrap().value else {
            panic!("expected object");
        };
        assert_eq!(object.len(), 2);

        let Value::Set(set) = parse_term("{1, 2, 1}").unwrap().value else {
            panic!("expected set");
        };
        assert_eq!(set.len(), 2);

        assert_eq!(parse_term("set()").unwrap(), Term::set(Default::default()));
        assert_eq!(
            parse_term("{}").unwrap(),
            Term::object(Default::default())
        );
    }

    #[test]
    fn test_comprehensions() {
        assert!(matches!(
            parse_term("[x | x := input.xs[_]]").unwrap().value,
            Value::ArrayComprehension(_)
        ));
        assert!(matches!(
            parse_term("{x | some x in input.xs}").unwrap().value,
            Value::SetComprehension(_)
        ));
        assert!(matches!(
            parse_term("{k: v | some k, v in input.m}").unwrap().value,
            Value::ObjectComprehension(_)
        ));
    }

    #[test]
    fn test_pipe_in_array_starts_comprehension() {
        let term = parse_term("[a | b]").unwrap();
        let Value::ArrayComprehension(comprehension) = term.value else {
            panic!("expected comprehension");
        };
        assert_eq!(comprehension.term, Term::var("a"));
    }

    #[test]
    fn test_strings() {
        assert_eq!(parse_term(r#""a\tb""#).unwrap(), Term::string("a\tb"));
        assert_eq!(parse_term("`raw\\n`").unwrap(), Term::string("raw\\n"));
    }

    #[test]
    fn test_negative_numbers() {
        let term = parse_term("-1.5").unwrap();
        assert_eq!(term, Term::number("-1.5"));
        assert_eq!(term.location, Some(SourceSpan::new(1, 1, "-1.5")));

        let Value::Call(terms) = parse_term("x - 1").unwrap().value else {
            panic!("expected call");
        };
        assert_eq!(lintel_ast::ref_name(&terms[0]).as_deref(), Some("minus"));
    }

    #[test]
    fn test_precedence() {
        let Value::Call(terms) = parse_term("1 + 2 * 3").unwrap().value else {
            panic!("expected call");
        };
        assert_eq!(lintel_ast::ref_name(&terms[0]).as_deref(), Some("plus"));
        assert!(matches!(terms[2].value, Value::Call(_)));
    }

    #[test]
    fn test_comments_are_collected() {
        let module = parse_ok("# top\npackage p\n\nx := 1 # trailing\n");

        assert_eq!(module.comments.len(), 2);
        assert_eq!(module.comments[0].text, b" top");
        assert_eq!(
            module.comments[1].location,
            Some(SourceSpan::new(4, 8, "# trailing"))
        );
    }

    #[test]
    fn test_metadata_scopes() {
        let source = r#"# METADATA
# title: Package
# description: Package docs
package p

# METADATA
# title: Allow
allow if true

# METADATA
# scope: document
# title: Deny docs
deny := false
"#;
        let module = parse_ok(source);

        assert_eq!(module.annotations.len(), 3);
        assert_eq!(module.annotations[0].scope, "package");
        assert_eq!(module.annotations[0].title, "Package");
        assert_eq!(
            module.annotations[0].location,
            Some(SourceSpan::new(1, 1, "# METADATA"))
        );
        assert_eq!(module.rules[0].annotations[0].scope, "rule");
        assert_eq!(module.rules[0].annotations[0].title, "Allow");
        assert_eq!(module.rules[1].annotations[0].scope, "document");
        assert_eq!(module.package_annotations().count(), 1);
    }

    #[test]
    fn test_metadata_folded_description_and_comments() {
        let source = "# METADATA\n# title: Deny # shown in docs\n# description: This is a long\n#   description continued\npackage p\n";
        let module = parse_ok(source);

        let annotations = &module.annotations[0];
        assert_eq!(annotations.title, "Deny");
        assert_eq!(annotations.description, "This is a long description continued");
    }

    #[test]
    fn test_invalid_metadata() {
        let err = parse("# METADATA\n# scope: nowhere\npackage p\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidMetadata { .. }));
    }

    #[test]
    fn test_empty_body_is_error() {
        let err = parse("package p\n\nallow if {}\n").unwrap_err();
        assert!(matches!(err, ParseError::EmptyBody { .. }));
    }

    #[test]
    fn test_unexpected_eof() {
        let err = parse("package p\n\nallow if {\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_expressions_need_separators() {
        let err = parse("package p\n\nallow if { x y }\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }
}
