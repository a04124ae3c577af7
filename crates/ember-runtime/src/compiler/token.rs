//! Token types for builtin source
//!
//! The compiler only needs enough structure to read a function header and
//! match brackets in the body, so most operators collapse into
//! [`TokenKind::Operator`].

use crate::span::Span;
use serde::Serialize;

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text, or the unescaped value for string literals
    pub lexeme: String,
    /// Byte range in the source
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Literals
    Number,
    String,
    /// Backtick template, kept whole
    Template,
    Identifier,
    /// `@name` or `#name`
    PrivateIdentifier,

    /// `function` keyword
    Function,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,
    Dot,
    /// `...`
    Ellipsis,
    /// `=` (assignment and parameter defaults)
    Equal,
    /// Any other operator
    Operator,

    Eof,
    Error,
}

impl TokenKind {
    /// Keywords the header parser distinguishes
    pub fn is_keyword(ident: &str) -> Option<TokenKind> {
        match ident {
            "function" => Some(TokenKind::Function),
            _ => None,
        }
    }

    /// Closing bracket matching an opening one
    pub fn closer(self) -> Option<TokenKind> {
        match self {
            TokenKind::LeftParen => Some(TokenKind::RightParen),
            TokenKind::LeftBrace => Some(TokenKind::RightBrace),
            TokenKind::LeftBracket => Some(TokenKind::RightBracket),
            _ => None,
        }
    }

    pub fn is_closer(self) -> bool {
        matches!(
            self,
            TokenKind::RightParen | TokenKind::RightBrace | TokenKind::RightBracket
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Template => "template",
            TokenKind::Identifier => "identifier",
            TokenKind::PrivateIdentifier => "private identifier",
            TokenKind::Function => "'function'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Dot => "'.'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::Equal => "'='",
            TokenKind::Operator => "operator",
            TokenKind::Eof => "end of input",
            TokenKind::Error => "error",
        }
    }
}
