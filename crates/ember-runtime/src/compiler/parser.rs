//! Function header parsing
//!
//! Every builtin source is a single parenthesized function expression:
//!
//! ```text
//! (function [name] (params) { body })
//! ```
//!
//! The parser reads the header exactly and checks that the body's brackets
//! balance. It does not build a body AST.

use crate::compiler::lexer::Lexer;
use crate::compiler::token::{Token, TokenKind};
use crate::diagnostic::{error_codes, Diagnostic};
use crate::names::Identifier;
use crate::source::SourceCode;
use crate::span::Span;

/// What the compiler learns from a builtin's source
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionHeader {
    /// Name written after `function`, if any
    pub declared_name: Option<String>,
    pub parameters: Vec<Identifier>,
    /// Parameters before the first default or rest parameter
    pub arity: u32,
    pub strict: bool,
    pub is_async: bool,
    pub is_generator: bool,
    /// Parameter list including its parentheses
    pub parameters_span: Span,
    /// Body including its braces
    pub body: Span,
}

/// Parse the function expression in `source`
pub fn parse_function(source: &SourceCode) -> Result<FunctionHeader, Diagnostic> {
    let (tokens, mut diagnostics) = Lexer::new(source.text()).tokenize();
    if !diagnostics.is_empty() {
        return Err(diagnostics.remove(0).with_file(source.origin()));
    }

    Parser {
        tokens,
        current: 0,
        source,
    }
    .function_expression()
}

struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    source: &'a SourceCode,
}

impl Parser<'_> {
    fn function_expression(&mut self) -> Result<FunctionHeader, Diagnostic> {
        self.expect(TokenKind::LeftParen, "builtin source must be a parenthesized function")?;

        let is_async = self.peek().kind == TokenKind::Identifier && self.peek().lexeme == "async";
        if is_async {
            self.advance();
        }
        self.expect(TokenKind::Function, "expected 'function'")?;

        let is_generator = self.peek().kind == TokenKind::Operator && self.peek().lexeme == "*";
        if is_generator {
            self.advance();
        }

        let declared_name = if self.check(TokenKind::Identifier) {
            Some(self.advance().lexeme.clone())
        } else {
            None
        };

        let (parameters, arity, parameters_span) = self.parameters()?;
        let (body, strict) = self.body()?;

        self.expect(TokenKind::RightParen, "expected ')' after function body")?;
        if !self.check(TokenKind::Eof) {
            let token = self.peek().clone();
            return Err(self
                .error(
                    error_codes::TRAILING_INPUT,
                    format!("unexpected '{}' after function expression", token.lexeme),
                    token.span,
                )
                .with_help("builtin source must contain exactly one function expression"));
        }

        Ok(FunctionHeader {
            declared_name,
            parameters,
            arity,
            strict,
            is_async,
            is_generator,
            parameters_span,
            body,
        })
    }

    fn parameters(&mut self) -> Result<(Vec<Identifier>, u32, Span), Diagnostic> {
        let open = self.expect(TokenKind::LeftParen, "expected '(' before parameters")?.span;
        let mut parameters: Vec<Identifier> = Vec::new();
        let mut arity: Option<u32> = None;

        while !self.check(TokenKind::RightParen) {
            let is_rest = self.check(TokenKind::Ellipsis);
            if is_rest {
                self.advance();
            }

            let name = self.expect(TokenKind::Identifier, "expected parameter name")?.clone();
            if let Some(previous) = parameters.iter().find(|p| p.as_str() == name.lexeme) {
                return Err(self
                    .error(
                        error_codes::DUPLICATE_PARAMETER,
                        format!("duplicate parameter '{}'", previous),
                        name.span,
                    )
                    .with_label("declared twice"));
            }

            if is_rest || self.check(TokenKind::Equal) {
                arity.get_or_insert(parameters.len() as u32);
            }
            parameters.push(Identifier::new(&name.lexeme));

            if is_rest {
                if !self.check(TokenKind::RightParen) {
                    let token = self.peek().clone();
                    return Err(self.error(
                        error_codes::UNEXPECTED_TOKEN,
                        "rest parameter must be last",
                        token.span,
                    ));
                }
                break;
            }

            if self.check(TokenKind::Equal) {
                self.advance();
                self.skip_default_value()?;
            }

            if !self.check(TokenKind::RightParen) {
                self.expect(TokenKind::Comma, "expected ',' or ')' in parameter list")?;
            }
        }

        let close = self.advance().span;
        let arity = arity.unwrap_or(parameters.len() as u32);
        Ok((parameters, arity, open.to(close)))
    }

    /// Skip a default expression up to the next top-level `,` or `)`
    fn skip_default_value(&mut self) -> Result<(), Diagnostic> {
        let mut open: Vec<Token> = Vec::new();
        loop {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Comma | TokenKind::RightParen if open.is_empty() => return Ok(()),
                TokenKind::Eof => {
                    return Err(match open.last() {
                        Some(opener) => self.unclosed(opener),
                        None => self.error(
                            error_codes::UNBALANCED_BRACES,
                            "unclosed parameter list",
                            token.span,
                        ),
                    })
                }
                kind if kind.closer().is_some() => open.push(token),
                kind if kind.is_closer() => self.close_bracket(&mut open, &token)?,
                _ => {}
            }
            self.advance();
        }
    }

    /// Consume the body, returning its span and whether it is strict
    fn body(&mut self) -> Result<(Span, bool), Diagnostic> {
        let open_brace = self
            .expect(TokenKind::LeftBrace, "expected '{' before function body")?
            .clone();
        let strict = self.directive_prologue();

        let mut open = vec![open_brace.clone()];
        loop {
            let token = self.advance().clone();
            match token.kind {
                TokenKind::Eof => return Err(self.unclosed(open.last().unwrap_or(&open_brace))),
                kind if kind.closer().is_some() => open.push(token),
                kind if kind.is_closer() => {
                    self.close_bracket(&mut open, &token)?;
                    if open.is_empty() {
                        return Ok((open_brace.span.to(token.span), strict));
                    }
                }
                _ => {}
            }
        }
    }

    /// Scan leading string statements for `"use strict"`
    fn directive_prologue(&mut self) -> bool {
        let mut strict = false;
        while self.check(TokenKind::String)
            && matches!(
                self.peek_at(1).kind,
                TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::String
            )
        {
            // Escapes disqualify a directive, so compare the raw text
            let raw = self.source.slice(self.peek().span);
            if raw == "\"use strict\"" || raw == "'use strict'" {
                strict = true;
            }
            self.advance();
            if self.check(TokenKind::Semicolon) {
                self.advance();
            }
        }
        strict
    }

    fn close_bracket(&self, open: &mut Vec<Token>, closer: &Token) -> Result<(), Diagnostic> {
        match open.pop() {
            Some(opener) if opener.kind.closer() == Some(closer.kind) => Ok(()),
            Some(opener) => Err(self
                .error(
                    error_codes::UNEXPECTED_TOKEN,
                    format!("mismatched '{}'", closer.lexeme),
                    closer.span,
                )
                .with_note(format!(
                    "'{}' opened at byte {} is still unclosed",
                    opener.lexeme, opener.span.start
                ))),
            None => Err(self.error(
                error_codes::UNBALANCED_BRACES,
                format!("unmatched '{}'", closer.lexeme),
                closer.span,
            )),
        }
    }

    fn unclosed(&self, opener: &Token) -> Diagnostic {
        self.error(
            error_codes::UNBALANCED_BRACES,
            format!("unclosed '{}'", opener.lexeme),
            opener.span,
        )
        .with_label("opened here")
    }

    // === Token navigation ===

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, distance: usize) -> &Token {
        let index = (self.current + distance).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if self.current < self.tokens.len() - 1 {
            self.current += 1;
            &self.tokens[self.current - 1]
        } else {
            &self.tokens[self.current]
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<&Token, Diagnostic> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let found = self.peek().clone();
        let found_text = if found.kind == TokenKind::Eof {
            found.kind.as_str().to_string()
        } else {
            format!("'{}'", self.source.slice(found.span))
        };
        Err(self
            .error(error_codes::UNEXPECTED_TOKEN, message, found.span)
            .with_label(format!("expected {}, found {}", kind.as_str(), found_text)))
    }

    fn error(&self, code: &str, message: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic::error_with_code(code, message, span)
            .with_file(self.source.origin())
            .located_in(self.source.text(), span)
    }
}
