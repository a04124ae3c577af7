//! Lexical analysis of builtin source
//!
//! Spans are byte offsets so diagnostics can slice the original text. A `/`
//! is always an operator; builtin sources do not use regular expression
//! literals.

use crate::compiler::token::{Token, TokenKind};
use crate::diagnostic::{error_codes, Diagnostic};
use crate::span::Span;

/// Multi-character operators, longest first
const OPERATORS: &[&str] = &[
    ">>>=", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==", "!=",
    "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "**", "<<", ">>",
];

/// Lexer state for tokenizing builtin source
pub struct Lexer<'src> {
    source: &'src str,
    chars: Vec<char>,
    /// Current position in chars
    current: usize,
    /// Byte offset of `current`
    offset: usize,
    /// Byte offset where the current token starts
    start_offset: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            current: 0,
            offset: 0,
            start_offset: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the source, returning tokens and any diagnostics
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        (tokens, self.diagnostics)
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start_offset = self.offset;

        if self.is_at_end() {
            return self.make_token(TokenKind::Eof);
        }

        let c = self.advance();

        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            '{' => self.make_token(TokenKind::LeftBrace),
            '}' => self.make_token(TokenKind::RightBrace),
            '[' => self.make_token(TokenKind::LeftBracket),
            ']' => self.make_token(TokenKind::RightBracket),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),

            '.' => {
                if self.peek() == '.' && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    self.make_token(TokenKind::Ellipsis)
                } else if self.peek().is_ascii_digit() {
                    self.number()
                } else {
                    self.make_token(TokenKind::Dot)
                }
            }

            '"' | '\'' => self.string(c),
            '`' => self.template(),

            c if c.is_ascii_digit() => self.number(),

            '@' | '#' if is_identifier_start(self.peek()) => {
                self.identifier_tail();
                self.make_token(TokenKind::PrivateIdentifier)
            }

            c if is_identifier_start(c) => {
                self.identifier_tail();
                let lexeme = &self.source[self.start_offset..self.offset];
                let kind = TokenKind::is_keyword(lexeme).unwrap_or(TokenKind::Identifier);
                self.make_token(kind)
            }

            c if is_operator_char(c) => self.operator(),

            _ => self.error_token(
                error_codes::UNEXPECTED_TOKEN,
                &format!("unexpected character '{}'", c),
            ),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            if self.is_at_end() {
                return;
            }

            match self.peek() {
                c if c.is_whitespace() => {
                    self.advance();
                }
                '/' if self.peek_next() == Some('/') => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                '/' if self.peek_next() == Some('*') => {
                    let comment_start = self.offset;
                    self.advance(); // /
                    self.advance(); // *

                    let mut terminated = false;
                    while !self.is_at_end() {
                        if self.peek() == '*' && self.peek_next() == Some('/') {
                            self.advance();
                            self.advance();
                            terminated = true;
                            break;
                        }
                        self.advance();
                    }

                    if !terminated {
                        let span = Span::new(comment_start, comment_start + 2);
                        self.diagnostics.push(
                            Diagnostic::error_with_code(
                                error_codes::UNTERMINATED_COMMENT,
                                "unterminated block comment",
                                span,
                            )
                            .located_in(self.source, span)
                            .with_label("comment starts here")
                            .with_help("add '*/' to close the comment"),
                        );
                    }
                }
                _ => return,
            }
        }
    }

    /// Scan a quoted string; the lexeme is the unescaped value
    fn string(&mut self, quote: char) -> Token {
        let mut value = String::new();

        loop {
            if self.is_at_end() || self.peek() == '\n' {
                return self.error_token(
                    error_codes::UNTERMINATED_STRING,
                    "unterminated string literal",
                );
            }

            let c = self.advance();
            if c == quote {
                break;
            }
            if c == '\\' {
                if self.is_at_end() {
                    continue;
                }
                match self.advance() {
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    '0' => value.push('\0'),
                    // Line continuation
                    '\n' => {}
                    other => value.push(other),
                }
            } else {
                value.push(c);
            }
        }

        Token::new(
            TokenKind::String,
            value,
            Span::new(self.start_offset, self.offset),
        )
    }

    /// Scan a template literal without interpreting substitutions
    fn template(&mut self) -> Token {
        loop {
            if self.is_at_end() {
                return self.error_token(
                    error_codes::UNTERMINATED_STRING,
                    "unterminated template literal",
                );
            }
            match self.advance() {
                '`' => break,
                '\\' if !self.is_at_end() => {
                    self.advance();
                }
                _ => {}
            }
        }
        self.make_token(TokenKind::Template)
    }

    /// Scan a number literal (decimal, hex, exponent, bigint suffix)
    fn number(&mut self) -> Token {
        let first = self.chars[self.current - 1];

        if first == '0' && matches!(self.peek(), 'x' | 'X' | 'o' | 'O' | 'b' | 'B') {
            self.advance();
            while self.peek().is_ascii_hexdigit() || self.peek() == '_' {
                self.advance();
            }
        } else {
            while self.peek().is_ascii_digit() || self.peek() == '_' {
                self.advance();
            }
            if first != '.'
                && self.peek() == '.'
                && self.peek_next().is_some_and(|c| c.is_ascii_digit())
            {
                self.advance();
            }
            while self.peek().is_ascii_digit() || self.peek() == '_' {
                self.advance();
            }
            if matches!(self.peek(), 'e' | 'E') {
                self.advance();
                if matches!(self.peek(), '+' | '-') {
                    self.advance();
                }
                if !self.peek().is_ascii_digit() {
                    return self.error_token(
                        error_codes::SYNTAX_ERROR,
                        "invalid number: exponent requires digits",
                    );
                }
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            }
        }

        if self.peek() == 'n' {
            self.advance();
        }

        self.make_token(TokenKind::Number)
    }

    fn identifier_tail(&mut self) {
        while is_identifier_part(self.peek()) {
            self.advance();
        }
    }

    fn operator(&mut self) -> Token {
        let rest = &self.source[self.start_offset..];
        let matched = OPERATORS
            .iter()
            .find(|op| rest.starts_with(**op))
            // `a?.5:b` is a conditional, not optional chaining
            .filter(|op| !(**op == "?." && self.peek_next().is_some_and(|c| c.is_ascii_digit())));

        if let Some(op) = matched {
            // First char was consumed by next_token
            for _ in 1..op.chars().count() {
                self.advance();
            }
            return self.make_token(TokenKind::Operator);
        }

        if rest.starts_with('=') {
            self.make_token(TokenKind::Equal)
        } else {
            self.make_token(TokenKind::Operator)
        }
    }

    // === Character navigation ===

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        self.offset += c.len_utf8();
        c
    }

    fn peek(&self) -> char {
        self.chars.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.current + 1).copied()
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    // === Token creation ===

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            &self.source[self.start_offset..self.offset],
            Span::new(self.start_offset, self.offset),
        )
    }

    fn error_token(&mut self, code: &str, message: &str) -> Token {
        let span = Span::new(self.start_offset, self.offset.max(self.start_offset + 1));
        self.diagnostics.push(
            Diagnostic::error_with_code(code, message, span)
                .located_in(self.source, span)
                .with_label("lexer error"),
        );
        Token::new(TokenKind::Error, message, span)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '%' | '=' | '!' | '<' | '>' | '&' | '|' | '^' | '~' | '?' | ':'
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, diagnostics) = Lexer::new(source).tokenize();
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_function_header() {
        assert_eq!(
            kinds("(function (a, ...rest) {})"),
            vec![
                TokenKind::LeftParen,
                TokenKind::Function,
                TokenKind::LeftParen,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Ellipsis,
                TokenKind::Identifier,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_default_uses_equal_but_arrow_does_not() {
        assert_eq!(
            kinds("a = b => c === d"),
            vec![
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_private_identifier_and_comments() {
        let (tokens, _) = Lexer::new("// lead\n@toLength(/* n */ x)").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::PrivateIdentifier);
        assert_eq!(tokens[0].lexeme, "@toLength");
        assert_eq!(tokens[0].span, Span::new(8, 17));
    }

    #[test]
    fn test_string_escapes_unescaped_in_lexeme() {
        let (tokens, _) = Lexer::new(r#""a\"b""#).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "a\"b");
        assert_eq!(tokens[0].span, Span::new(0, 6));
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let (tokens, _) = Lexer::new("'é' x").tokenize();
        assert_eq!(tokens[1].span, Span::new(5, 6));
    }

    #[test]
    fn test_unterminated_string() {
        let (_, diagnostics) = Lexer::new("\"open\n\"").tokenize();
        assert_eq!(diagnostics[0].code, error_codes::UNTERMINATED_STRING);
        assert_eq!(diagnostics[0].line, 1);
    }

    #[test]
    fn test_unterminated_comment() {
        let (_, diagnostics) = Lexer::new("x /* never").tokenize();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, error_codes::UNTERMINATED_COMMENT);
        assert_eq!(diagnostics[0].column, 3);
    }

    #[test]
    fn test_optional_chain_and_nullish() {
        let (tokens, _) = Lexer::new("input?.length ?? 0").tokenize();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["input", "?.", "length", "??", "0", ""]);
    }
}
