//! Parser error types

use lintel_ast::Span;
use lintel_lexer::TokenKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("unexpected end of file")]
    UnexpectedEof { span: Span },

    #[error("invalid string literal")]
    InvalidString { span: Span },

    #[error("found empty body")]
    EmptyBody { span: Span },

    #[error("expected package declaration")]
    MissingPackage { span: Span },

    #[error("expected rule")]
    ExpectedRule { span: Span },

    #[error("invalid metadata: {message}")]
    InvalidMetadata { message: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span } => *span,
            ParseError::InvalidString { span } => *span,
            ParseError::EmptyBody { span } => *span,
            ParseError::MissingPackage { span } => *span,
            ParseError::ExpectedRule { span } => *span,
            ParseError::InvalidMetadata { span, .. } => *span,
        }
    }

    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        if found == TokenKind::Eof {
            return ParseError::UnexpectedEof { span };
        }
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.describe().to_string(),
            span,
        }
    }
}
