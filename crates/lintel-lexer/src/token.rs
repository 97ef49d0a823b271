//! Token definitions for the policy language

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // === Keywords ===
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("as")]
    As,
    #[token("default")]
    Default,
    #[token("else")]
    Else,
    #[token("not")]
    Not,
    #[token("with")]
    With,
    #[token("some")]
    Some,
    #[token("every")]
    Every,
    #[token("in")]
    In,
    #[token("if")]
    If,
    #[token("contains")]
    Contains,

    // Literals
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // === Operators ===
    // `=` unifies, `:=` assigns, `==` compares
    #[token("=")]
    Eq,
    #[token(":=")]
    ColonEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // === Punctuation ===
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,

    // === Literals ===
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    #[regex(r"`[^`]*`")]
    RawString,

    // === Identifiers ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    /// `# ...` up to the end of the line
    #[regex(r"#[^\n]*")]
    Comment,

    // === Special ===
    Error,
    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Package
                | TokenKind::Import
                | TokenKind::As
                | TokenKind::Default
                | TokenKind::Else
                | TokenKind::Not
                | TokenKind::With
                | TokenKind::Some
                | TokenKind::Every
                | TokenKind::In
                | TokenKind::If
                | TokenKind::Contains
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Package => "'package'",
            TokenKind::Import => "'import'",
            TokenKind::As => "'as'",
            TokenKind::Default => "'default'",
            TokenKind::Else => "'else'",
            TokenKind::Not => "'not'",
            TokenKind::With => "'with'",
            TokenKind::Some => "'some'",
            TokenKind::Every => "'every'",
            TokenKind::In => "'in'",
            TokenKind::If => "'if'",
            TokenKind::Contains => "'contains'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::Eq => "'='",
            TokenKind::ColonEq => "':='",
            TokenKind::EqEq => "'=='",
            TokenKind::Ne => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Dot => "'.'",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::RawString => "raw string",
            TokenKind::Ident => "identifier",
            TokenKind::Comment => "comment",
            TokenKind::Error => "error",
            TokenKind::Eof => "end of file",
        }
    }
}
