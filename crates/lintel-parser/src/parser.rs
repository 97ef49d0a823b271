//! Recursive descent parser implementation

use lintel_ast::*;
use lintel_lexer::{Token, TokenKind, TokenStream};

use crate::metadata::parse_annotations;
use crate::ParseError;

const MEMBERSHIP: &[(TokenKind, Operator)] = &[(TokenKind::In, Operator::Member)];

const RELATIONS: &[(TokenKind, Operator)] = &[
    (TokenKind::EqEq, Operator::Equal),
    (TokenKind::Ne, Operator::NotEqual),
    (TokenKind::Lt, Operator::LessThan),
    (TokenKind::Le, Operator::LessThanEq),
    (TokenKind::Gt, Operator::GreaterThan),
    (TokenKind::Ge, Operator::GreaterThanEq),
];

const OR: &[(TokenKind, Operator)] = &[(TokenKind::Pipe, Operator::Or)];

const AND: &[(TokenKind, Operator)] = &[(TokenKind::Amp, Operator::And)];

const ARITH: &[(TokenKind, Operator)] = &[
    (TokenKind::Plus, Operator::Plus),
    (TokenKind::Minus, Operator::Minus),
];

const FACTOR: &[(TokenKind, Operator)] = &[
    (TokenKind::Star, Operator::Multiply),
    (TokenKind::Slash, Operator::Divide),
    (TokenKind::Percent, Operator::Remainder),
];

/// A `# METADATA` block waiting for the package or rule that follows it
struct MetadataBlock {
    end: usize,
    annotations: Annotations,
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    comments: Vec<Token>,
    pos: usize,
    lines: LineIndex,
    blocks: Vec<MetadataBlock>,
    next_block: usize,
    wildcards: usize,
    /// Inside a comprehension head `|` ends the term instead of meaning `or`
    pipe_is_separator: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, stream: TokenStream) -> Self {
        let TokenStream { mut tokens, comments } = stream;
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            tokens.push(Token::eof(source.len()));
        }

        Self {
            source,
            tokens,
            comments,
            pos: 0,
            lines: LineIndex::new(source),
            blocks: Vec::new(),
            next_block: 0,
            wildcards: 0,
            pipe_is_separator: false,
        }
    }

    // === Utilities ===

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = *self.current();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(
                kind.describe(),
                self.peek(),
                self.current().span,
            ))
        }
    }

    fn text(&self, token: &Token) -> &'a str {
        &self.source[token.range()]
    }

    fn span(&self) -> Span {
        self.current().span
    }

    fn prev_end(&self) -> usize {
        match self.pos {
            0 => 0,
            pos => self.tokens[pos - 1].span.end,
        }
    }

    /// A line break separates the previous token from the current one
    fn on_new_line(&self) -> bool {
        let start = self.span().start;
        let end = self.prev_end().min(start);
        self.source[end..start].contains('\n')
    }

    /// The current token directly follows the previous one
    fn adjacent(&self) -> bool {
        self.pos > 0 && self.prev_end() == self.span().start
    }

    fn loc(&self, span: Span) -> Option<SourceSpan> {
        Some(self.lines.source_span(self.source, span))
    }

    fn loc_from(&self, start: usize) -> Option<SourceSpan> {
        self.loc(Span::new(start, self.prev_end().max(start)))
    }

    fn with_pipe_separator<T>(
        &mut self,
        separator: bool,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved = std::mem::replace(&mut self.pipe_is_separator, separator);
        let result = f(self);
        self.pipe_is_separator = saved;
        result
    }

    // === Module ===

    pub fn parse_module(&mut self) -> Result<Module, ParseError> {
        self.blocks = self.metadata_blocks()?;

        let mut module = Module {
            package: Some(self.parse_package()?),
            ..Module::default()
        };

        while self.at(TokenKind::Import) {
            module.imports.push(self.parse_import()?);
        }

        while !self.at(TokenKind::Eof) {
            module.rules.push(self.parse_rule()?);
        }

        // blocks after the last rule have nothing to attach to
        self.take_blocks(self.source.len(), SCOPE_RULE);

        module.comments = self.comments.iter().map(|t| self.comment(t)).collect();
        module.annotations = self.blocks.drain(..).map(|b| b.annotations).collect();
        Ok(module)
    }

    /// Parse exactly one term, e.g. `input.users[_].name`
    pub fn parse_single_term(&mut self) -> Result<Term, ParseError> {
        let term = self.parse_expr_term()?;
        if !self.at(TokenKind::Eof) {
            return Err(ParseError::unexpected(
                "end of input",
                self.peek(),
                self.span(),
            ));
        }
        Ok(term)
    }

    fn parse_package(&mut self) -> Result<Package, ParseError> {
        if !self.at(TokenKind::Package) {
            return Err(ParseError::MissingPackage { span: self.span() });
        }
        let keyword = self.advance();
        self.take_blocks(keyword.span.start, SCOPE_PACKAGE);

        let reference = self.parse_ref()?;
        let span = keyword.span.merge(Span::new(keyword.span.end, self.prev_end()));

        let mut path = vec![Module::default_root_document()];
        for (i, segment) in ref_segments(reference).into_iter().enumerate() {
            match segment.value {
                Value::Var(name) if i == 0 => {
                    path.push(Term::string(name).with_location(segment.location));
                }
                Value::String(_) => path.push(segment),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "package path segment".to_string(),
                        found: other.type_name().to_string(),
                        span,
                    });
                }
            }
        }

        Ok(Package {
            path,
            location: self.loc(keyword.span),
        })
    }

    fn parse_import(&mut self) -> Result<Import, ParseError> {
        let keyword = self.consume(TokenKind::Import)?;
        let path = self.parse_ref()?;

        let alias = if self.at(TokenKind::As) {
            self.advance();
            let name = self.consume(TokenKind::Ident)?;
            self.text(&name).to_string()
        } else {
            String::new()
        };

        Ok(Import {
            path,
            alias,
            location: self.loc(keyword.span),
        })
    }

    // === Rules ===

    fn parse_rule(&mut self) -> Result<Rule, ParseError> {
        let start = self.span().start;
        if !matches!(self.peek(), TokenKind::Default | TokenKind::Ident) {
            return Err(ParseError::ExpectedRule { span: self.span() });
        }

        let annotations: Vec<_> = self
            .take_blocks(start, SCOPE_RULE)
            .into_iter()
            .filter(|a| !a.is_package_scoped())
            .collect();

        let default = self.at(TokenKind::Default);
        if default {
            self.advance();
        }

        let head = self.parse_head()?;
        let body = self.parse_rule_body(head.location.clone())?;
        let location = self.loc_from(start);

        let mut chain = Vec::new();
        while self.at(TokenKind::Else) {
            chain.push(self.parse_else(&head)?);
        }
        let else_rule = chain.into_iter().rev().fold(None, |next, mut rule: Rule| {
            rule.else_rule = next.map(Box::new);
            Some(rule)
        });

        Ok(Rule {
            annotations,
            default,
            head,
            body,
            else_rule: else_rule.map(Box::new),
            location,
        })
    }

    fn parse_head(&mut self) -> Result<Head, ParseError> {
        let start = self.span().start;
        let name = self.consume(TokenKind::Ident)?;
        let name = self.var_term(&name);
        let term = self.parse_postfix_from(name, start, false)?;

        let mut reference = match term.value {
            Value::Ref(terms) => terms,
            value => vec![Term {
                value,
                location: term.location,
            }],
        };
        let mut head = Head::new(Vec::new());

        if self.at(TokenKind::LParen) && self.adjacent() {
            self.advance();
            head.args = self.parse_term_list(TokenKind::RParen)?;
            self.consume(TokenKind::RParen)?;
        }

        if self.at(TokenKind::Contains) {
            self.advance();
            head.key = Some(self.parse_expr_term()?);
        } else if self.at(TokenKind::ColonEq) || self.at(TokenKind::Eq) {
            head.assign = self.at(TokenKind::ColonEq);
            self.advance();
            head.value = Some(self.parse_expr_term()?);
        } else if reference.len() > 1
            && matches!(reference.last().map(|t| &t.value), Some(Value::Var(_)))
        {
            // `p[x] { ... }` defines a partial set
            head.key = reference.pop();
        }

        head.location = self.loc_from(start);
        if head.key.is_none() && head.value.is_none() {
            head.value = Some(Term::boolean(true).with_location(head.location.clone()));
        }
        head.reference = reference;

        Ok(head)
    }

    /// `if { ... }`, `if expr`, a legacy `{ ... }` or nothing at all
    fn parse_rule_body(&mut self, head_location: Option<SourceSpan>) -> Result<Body, ParseError> {
        if self.at(TokenKind::If) {
            self.advance();
            if !self.at(TokenKind::LBrace) {
                return Ok(vec![self.parse_literal()?]);
            }
        } else if !self.at(TokenKind::LBrace) {
            return Ok(vec![Expr::generated_true(head_location)]);
        }

        self.consume(TokenKind::LBrace)?;
        let body = self.parse_query(TokenKind::RBrace)?;
        self.consume(TokenKind::RBrace)?;
        Ok(body)
    }

    fn parse_else(&mut self, parent: &Head) -> Result<Rule, ParseError> {
        let keyword = self.consume(TokenKind::Else)?;

        let mut head = Head::new(parent.reference.clone());
        head.args = parent.args.clone();
        head.location = self.loc(keyword.span);

        if self.at(TokenKind::ColonEq) || self.at(TokenKind::Eq) {
            head.assign = self.at(TokenKind::ColonEq);
            self.advance();
            head.value = Some(self.parse_expr_term()?);
        } else {
            head.value = Some(Term::boolean(true).with_location(head.location.clone()));
        }

        let body = self.parse_rule_body(head.location.clone())?;

        Ok(Rule {
            annotations: Vec::new(),
            default: false,
            head,
            body,
            else_rule: None,
            location: self.loc_from(keyword.span.start),
        })
    }

    // === Bodies ===

    fn parse_query(&mut self, end: TokenKind) -> Result<Body, ParseError> {
        self.with_pipe_separator(false, |p| p.parse_literals(end))
    }

    fn parse_literals(&mut self, end: TokenKind) -> Result<Body, ParseError> {
        let start = self.span();
        let mut body = Vec::new();

        while !self.at(end) {
            body.push(self.parse_literal()?);

            if self.at(TokenKind::Semicolon) {
                self.advance();
            } else if !self.at(end) && !self.on_new_line() {
                return Err(ParseError::unexpected(
                    "newline or ';'",
                    self.peek(),
                    self.span(),
                ));
            }
        }

        if body.is_empty() {
            return Err(ParseError::EmptyBody {
                span: start.merge(self.span()),
            });
        }
        Ok(body)
    }

    fn parse_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.span().start;

        let negated = self.at(TokenKind::Not);
        if negated {
            self.advance();
        }

        let terms = match self.peek() {
            TokenKind::Some if !negated => self.parse_some()?,
            TokenKind::Every if !negated => self.parse_every()?,
            _ => self.parse_expr_terms()?,
        };

        let mut with = Vec::new();
        while self.at(TokenKind::With) {
            with.push(self.parse_with()?);
        }

        Ok(Expr {
            negated,
            generated: false,
            with,
            terms,
            location: self.loc_from(start),
        })
    }

    fn parse_expr_terms(&mut self) -> Result<ExprTerms, ParseError> {
        let start = self.span().start;
        let mut lhs = self.parse_expr_term()?;

        if self.at(TokenKind::Comma) && !self.on_new_line() {
            // `k, v in xs`
            self.advance();
            let value = self.parse_relation()?;
            let op = self.consume(TokenKind::In)?;
            let domain = self.parse_relation()?;
            lhs = Term::call(vec![
                Operator::MemberWithKey.ref_term(self.loc(op.span)),
                lhs,
                value,
                domain,
            ])
            .with_location(self.loc_from(start));
        }

        let assignment = match self.peek() {
            TokenKind::ColonEq => Some(Operator::Assign),
            TokenKind::Eq => Some(Operator::Unify),
            _ => None,
        };
        if let Some(op) = assignment {
            let token = self.advance();
            let rhs = self.parse_expr_term()?;
            return Ok(ExprTerms::Terms(vec![
                op.ref_term(self.loc(token.span)),
                lhs,
                rhs,
            ]));
        }

        Ok(match lhs.value {
            Value::Call(terms) => ExprTerms::Terms(terms),
            value => ExprTerms::Term(Term {
                value,
                location: lhs.location,
            }),
        })
    }

    fn parse_some(&mut self) -> Result<ExprTerms, ParseError> {
        let keyword = self.consume(TokenKind::Some)?;
        let symbols_start = self.span().start;

        let mut symbols = vec![self.parse_relation()?];
        while self.at(TokenKind::Comma) {
            self.advance();
            symbols.push(self.parse_relation()?);
        }

        if self.at(TokenKind::In) {
            let op = match symbols.len() {
                1 => Operator::Member,
                2 => Operator::MemberWithKey,
                _ => {
                    return Err(ParseError::unexpected(
                        "at most two symbols before 'in'",
                        self.peek(),
                        self.span(),
                    ))
                }
            };
            let token = self.advance();
            let domain = self.parse_relation()?;

            let mut terms = vec![op.ref_term(self.loc(token.span))];
            terms.append(&mut symbols);
            terms.push(domain);
            symbols = vec![Term::call(terms).with_location(self.loc_from(symbols_start))];
        }

        Ok(ExprTerms::SomeDecl(SomeDecl {
            symbols,
            location: self.loc_from(keyword.span.start),
        }))
    }

    fn parse_every(&mut self) -> Result<ExprTerms, ParseError> {
        let keyword = self.consume(TokenKind::Every)?;

        let first = self.parse_relation()?;
        let (key, value) = if self.at(TokenKind::Comma) {
            self.advance();
            (Some(first), self.parse_relation()?)
        } else {
            (None, first)
        };

        self.consume(TokenKind::In)?;
        let domain = self.parse_relation()?;

        self.consume(TokenKind::LBrace)?;
        let body = self.parse_query(TokenKind::RBrace)?;
        self.consume(TokenKind::RBrace)?;

        Ok(ExprTerms::Every(Every {
            key,
            value,
            domain,
            body,
            location: self.loc_from(keyword.span.start),
        }))
    }

    fn parse_with(&mut self) -> Result<With, ParseError> {
        let keyword = self.consume(TokenKind::With)?;
        let target = self.parse_ref()?;
        self.consume(TokenKind::As)?;
        let value = self.parse_relation()?;

        Ok(With {
            target,
            value,
            location: self.loc_from(keyword.span.start),
        })
    }

    // === Terms ===

    fn parse_expr_term(&mut self) -> Result<Term, ParseError> {
        self.parse_binary(MEMBERSHIP, Self::parse_relation)
    }

    fn parse_relation(&mut self) -> Result<Term, ParseError> {
        self.parse_binary(RELATIONS, Self::parse_or)
    }

    fn parse_or(&mut self) -> Result<Term, ParseError> {
        self.parse_binary(OR, Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Term, ParseError> {
        self.parse_binary(AND, Self::parse_arith)
    }

    fn parse_arith(&mut self) -> Result<Term, ParseError> {
        self.parse_binary(ARITH, Self::parse_factor)
    }

    fn parse_factor(&mut self) -> Result<Term, ParseError> {
        self.parse_binary(FACTOR, Self::parse_unary)
    }

    /// Left-associative infix level; operators only continue on the same line
    fn parse_binary(
        &mut self,
        ops: &[(TokenKind, Operator)],
        next: fn(&mut Self) -> Result<Term, ParseError>,
    ) -> Result<Term, ParseError> {
        let start = self.span().start;
        let mut left = next(self)?;

        while let Some(op) = self.infix(ops) {
            let token = self.advance();
            let right = next(self)?;
            left = Term::call(vec![op.ref_term(self.loc(token.span)), left, right])
                .with_location(self.loc_from(start));
        }

        Ok(left)
    }

    fn infix(&self, ops: &[(TokenKind, Operator)]) -> Option<Operator> {
        if self.on_new_line() {
            return None;
        }
        let kind = self.peek();
        if kind == TokenKind::Pipe && self.pipe_is_separator {
            return None;
        }
        ops.iter().find(|(k, _)| *k == kind).map(|(_, op)| *op)
    }

    fn parse_unary(&mut self) -> Result<Term, ParseError> {
        let negative_literal = self.at(TokenKind::Minus)
            && self.tokens.get(self.pos + 1).is_some_and(|next| {
                next.kind == TokenKind::Number && next.span.start == self.span().end
            });

        if negative_literal {
            let minus = self.advance();
            let number = self.advance();
            let literal = format!("-{}", self.text(&number));
            return Ok(Term::number(literal).with_location(self.loc(minus.span.merge(number.span))));
        }

        let start = self.span().start;
        let primary = self.parse_primary()?;
        self.parse_postfix_from(primary, start, true)
    }

    /// Dot and bracket segments, and calls when `calls` is set
    fn parse_postfix_from(
        &mut self,
        head: Term,
        start: usize,
        calls: bool,
    ) -> Result<Term, ParseError> {
        let mut parts = vec![head];

        loop {
            if self.at(TokenKind::Dot) && self.adjacent() {
                self.advance();
                let field = self.advance();
                if !matches!(
                    field.kind,
                    TokenKind::Ident | TokenKind::True | TokenKind::False | TokenKind::Null
                ) && !field.kind.is_keyword()
                {
                    return Err(ParseError::unexpected("identifier", field.kind, field.span));
                }
                parts.push(Term::string(self.text(&field)).with_location(self.loc(field.span)));
            } else if self.at(TokenKind::LBracket) && self.adjacent() {
                self.advance();
                let key = self.with_pipe_separator(false, Self::parse_expr_term)?;
                self.consume(TokenKind::RBracket)?;
                parts.push(key);
            } else if calls && self.at(TokenKind::LParen) && self.adjacent() {
                self.advance();
                let args = self.parse_term_list(TokenKind::RParen)?;
                self.consume(TokenKind::RParen)?;

                let is_set_constructor = parts.len() == 1
                    && args.is_empty()
                    && matches!(&parts[0].value, Value::Var(name) if name == "set");
                let term = if is_set_constructor {
                    Term::set(Set::new())
                } else {
                    let operator = into_ref(self.finish_ref(parts, start));
                    let mut terms = vec![operator];
                    terms.extend(args);
                    Term::call(terms)
                };
                parts = vec![term.with_location(self.loc_from(start))];
            } else {
                break;
            }
        }

        Ok(self.finish_ref(parts, start))
    }

    fn finish_ref(&self, mut parts: Vec<Term>, start: usize) -> Term {
        if parts.len() == 1 {
            if let Some(term) = parts.pop() {
                return term;
            }
        }
        Term::reference(parts).with_location(self.loc_from(start))
    }

    /// A plain ref such as `data.x.y`; a lone name becomes a one-segment ref
    fn parse_ref(&mut self) -> Result<Term, ParseError> {
        let start = self.span().start;
        let name = self.consume(TokenKind::Ident)?;
        let head = self.var_term(&name);
        let term = self.parse_postfix_from(head, start, false)?;
        Ok(into_ref(term))
    }

    fn parse_primary(&mut self) -> Result<Term, ParseError> {
        let token = *self.current();
        let location = self.loc(token.span);

        match token.kind {
            TokenKind::Number => {
                self.advance();
                Ok(Term::number(self.text(&token)).with_location(location))
            }
            TokenKind::String => {
                self.advance();
                let value: String = serde_json::from_str(self.text(&token))
                    .map_err(|_| ParseError::InvalidString { span: token.span })?;
                Ok(Term::string(value).with_location(location))
            }
            TokenKind::RawString => {
                self.advance();
                let text = self.text(&token);
                Ok(Term::string(&text[1..text.len() - 1]).with_location(location))
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(Term::boolean(token.kind == TokenKind::True).with_location(location))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Term::null().with_location(location))
            }
            TokenKind::Ident => {
                self.advance();
                Ok(self.var_term(&token))
            }
            TokenKind::LParen => {
                self.advance();
                let term = self.with_pipe_separator(false, Self::parse_expr_term)?;
                self.consume(TokenKind::RParen)?;
                Ok(term)
            }
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LBrace => self.parse_braced(),
            kind => Err(ParseError::unexpected("term", kind, token.span)),
        }
    }

    fn parse_array(&mut self) -> Result<Term, ParseError> {
        let start = self.consume(TokenKind::LBracket)?.span.start;

        if self.at(TokenKind::RBracket) {
            self.advance();
            return Ok(Term::array(Vec::new()).with_location(self.loc_from(start)));
        }

        let first = self.with_pipe_separator(true, Self::parse_expr_term)?;
        if self.at(TokenKind::Pipe) {
            self.advance();
            let body = self.parse_query(TokenKind::RBracket)?;
            self.consume(TokenKind::RBracket)?;
            let comprehension = ArrayComprehension { term: first, body };
            return Ok(Term::new(Value::ArrayComprehension(Box::new(comprehension)))
                .with_location(self.loc_from(start)));
        }

        let mut items = vec![first];
        self.parse_more_terms(TokenKind::RBracket, &mut items)?;
        self.consume(TokenKind::RBracket)?;
        Ok(Term::array(items).with_location(self.loc_from(start)))
    }

    /// Objects, sets and their comprehensions
    fn parse_braced(&mut self) -> Result<Term, ParseError> {
        let start = self.consume(TokenKind::LBrace)?.span.start;

        if self.at(TokenKind::RBrace) {
            self.advance();
            return Ok(Term::object(Object::new()).with_location(self.loc_from(start)));
        }

        let first = self.with_pipe_separator(true, Self::parse_expr_term)?;

        if self.at(TokenKind::Colon) {
            self.advance();
            let value = self.with_pipe_separator(true, Self::parse_expr_term)?;

            if self.at(TokenKind::Pipe) {
                self.advance();
                let body = self.parse_query(TokenKind::RBrace)?;
                self.consume(TokenKind::RBrace)?;
                let comprehension = ObjectComprehension {
                    key: first,
                    value,
                    body,
                };
                return Ok(Term::new(Value::ObjectComprehension(Box::new(comprehension)))
                    .with_location(self.loc_from(start)));
            }

            let mut object = Object::new();
            object.insert(first, value);
            while self.at(TokenKind::Comma) {
                self.advance();
                if self.at(TokenKind::RBrace) {
                    break;
                }
                let key = self.with_pipe_separator(false, Self::parse_expr_term)?;
                self.consume(TokenKind::Colon)?;
                let value = self.with_pipe_separator(false, Self::parse_expr_term)?;
                object.insert(key, value);
            }
            self.consume(TokenKind::RBrace)?;
            return Ok(Term::object(object).with_location(self.loc_from(start)));
        }

        if self.at(TokenKind::Pipe) {
            self.advance();
            let body = self.parse_query(TokenKind::RBrace)?;
            self.consume(TokenKind::RBrace)?;
            let comprehension = SetComprehension { term: first, body };
            return Ok(Term::new(Value::SetComprehension(Box::new(comprehension)))
                .with_location(self.loc_from(start)));
        }

        let mut items = vec![first];
        self.parse_more_terms(TokenKind::RBrace, &mut items)?;
        self.consume(TokenKind::RBrace)?;
        Ok(Term::set(items.into_iter().collect()).with_location(self.loc_from(start)))
    }

    fn parse_term_list(&mut self, end: TokenKind) -> Result<Vec<Term>, ParseError> {
        let mut terms = Vec::new();
        if self.at(end) {
            return Ok(terms);
        }
        terms.push(self.with_pipe_separator(false, Self::parse_expr_term)?);
        self.parse_more_terms(end, &mut terms)?;
        Ok(terms)
    }

    /// `, term` repeated, allowing a trailing comma before `end`
    fn parse_more_terms(&mut self, end: TokenKind, terms: &mut Vec<Term>) -> Result<(), ParseError> {
        while self.at(TokenKind::Comma) {
            self.advance();
            if self.at(end) {
                break;
            }
            terms.push(self.with_pipe_separator(false, Self::parse_expr_term)?);
        }
        Ok(())
    }

    // === Helpers ===

    /// Variable term; each `_` becomes a fresh `$N` wildcard
    fn var_term(&mut self, token: &Token) -> Term {
        let text = self.text(token);
        let name = if text == "_" {
            let name = format!("${}", self.wildcards);
            self.wildcards += 1;
            name
        } else {
            text.to_string()
        };
        Term::var(name).with_location(self.loc(token.span))
    }

    fn comment(&self, token: &Token) -> Comment {
        Comment {
            text: comment_body(self.text(token)).as_bytes().to_vec(),
            location: self.loc(token.span),
        }
    }

    /// Group `# METADATA` comments with the comment lines directly below
    fn metadata_blocks(&self) -> Result<Vec<MetadataBlock>, ParseError> {
        let mut blocks = Vec::new();
        let mut i = 0;

        while i < self.comments.len() {
            let first = &self.comments[i];
            i += 1;
            if comment_body(self.text(first)).trim() != "METADATA" {
                continue;
            }

            let (mut row, _) = self.lines.position(first.span.start);
            let mut span = first.span;
            let mut lines = Vec::new();

            while let Some(next) = self.comments.get(i) {
                let body = comment_body(self.text(next));
                let (next_row, _) = self.lines.position(next.span.start);
                if next_row != row + 1 || body.trim() == "METADATA" {
                    break;
                }
                lines.push(body);
                row = next_row;
                span = span.merge(next.span);
                i += 1;
            }

            let mut annotations = parse_annotations(&lines)
                .map_err(|message| ParseError::InvalidMetadata { message, span })?;
            annotations.location = self.loc(first.span);
            blocks.push(MetadataBlock {
                end: span.end,
                annotations,
            });
        }

        Ok(blocks)
    }

    /// Claim the blocks that end before `offset`, defaulting their scope
    fn take_blocks(&mut self, offset: usize, default_scope: &str) -> Vec<Annotations> {
        let mut taken = Vec::new();
        while let Some(block) = self.blocks.get_mut(self.next_block) {
            if block.end > offset {
                break;
            }
            if block.annotations.scope.is_empty() {
                block.annotations.scope = default_scope.to_string();
            }
            taken.push(block.annotations.clone());
            self.next_block += 1;
        }
        taken
    }
}

fn comment_body(text: &str) -> &str {
    text.strip_prefix('#').unwrap_or(text)
}

fn ref_segments(term: Term) -> Vec<Term> {
    match term.value {
        Value::Ref(terms) => terms,
        value => vec![Term {
            value,
            location: term.location,
        }],
    }
}

fn into_ref(term: Term) -> Term {
    if matches!(term.value, Value::Ref(_)) {
        return term;
    }
    let location = term.location.clone();
    Term::reference(vec![term]).with_location(location)
}
