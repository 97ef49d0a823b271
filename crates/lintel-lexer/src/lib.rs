//! Lintel Lexer - Tokenization using logos
//!
//! Comments are kept, but outside the main token stream: the parser
//! attaches them to the module and reads `# METADATA` blocks out of them.

mod token;

pub use token::*;

use std::ops::Range;

use lintel_ast::Span;
use logos::Logos;

/// Tokens of one source file.
///
/// `tokens` always ends with `Eof`. Comments never appear in it; they are
/// collected separately in source order.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub comments: Vec<Token>,
}

/// Tokenize a source string, splitting comments out of the token stream
pub fn tokenize(source: &str) -> TokenStream {
    let mut stream = TokenStream::default();

    for (result, range) in TokenKind::lexer(source).spanned() {
        let token = Token {
            kind: result.unwrap_or(TokenKind::Error),
            span: Span::new(range.start, range.end),
        };
        match token.kind {
            TokenKind::Comment => stream.comments.push(token),
            _ => stream.tokens.push(token),
        }
    }

    stream.tokens.push(Token::eof(source.len()));
    stream
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn eof(offset: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            span: Span::new(offset, offset),
        }
    }

    /// Byte range for slicing the source
    pub fn range(&self) -> Range<usize> {
        self.span.start..self.span.end
    }
}
