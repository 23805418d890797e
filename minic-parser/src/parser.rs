//! Recursive descent parser for MiniC.
//!
//! Expressions are parsed with binding powers (see [`TokenKind::binop_bp`]). Parsing stops at
//! the first syntax error: it is reported to the [`Source`] once and no tree is returned.

use std::mem;

use minic_source::{Position, Source};
use thiserror::Error;

use crate::ast::*;
use crate::lexer::{tokenize, Lexer, Token, TokenKind};

mod decl;
mod expr;
mod stmt;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Syntax error at token '{found}'")]
    UnexpectedToken { found: TokenKind, line: usize },
    #[error("Syntax error: unexpected end of input")]
    UnexpectedEof,
    #[error("Syntax error: nesting deeper than {max} levels", max = MAX_NESTING)]
    TooDeep { line: usize },
}

impl ParseError {
    /// Where the error is reported.
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { line, .. } | ParseError::TooDeep { line } => {
                Position::Line(*line)
            }
            ParseError::UnexpectedEof => Position::Eof,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum number of nested statements and expressions.
pub const MAX_NESTING: usize = 256;

pub struct Parser<'a> {
    /// Cached token for peeking.
    current: Token,
    lexer: Lexer<'a>,
    /// Source code
    source: &'a Source<'a>,
    /// Current number of nested statements and expressions.
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a Source<'a>) -> Self {
        let mut lexer = tokenize(source);
        let current = lexer
            .next()
            .unwrap_or_else(|| end_of_input(source, &lexer));
        Self {
            current,
            lexer,
            source,
            depth: 0,
        }
    }
}

impl<'a> Parser<'a> {
    /// Parses a whole program.
    /// Returns `None` if a syntax error was found. The error has been reported to the `Source`.
    pub fn parse_program(&mut self) -> Option<Program> {
        match self.program() {
            Ok(program) => Some(program),
            Err(error) => {
                self.source.report(error.position(), error);
                None
            }
        }
    }

    fn program(&mut self) -> ParseResult<Program> {
        let line = self.current.line;
        let mut decls = vec![self.parse_declaration()?];
        while !self.at(&TokenKind::Eof) {
            decls.push(self.parse_declaration()?);
        }
        Ok(Program::new(decls).with_line(line))
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    /// Advances to the next token and returns the one that was current.
    fn next(&mut self) -> Token {
        let token = self
            .lexer
            .next()
            .unwrap_or_else(|| end_of_input(self.source, &self.lexer));
        mem::replace(&mut self.current, token)
    }

    /// Predicate that tests whether the current token has the same discriminant as `kind`.
    fn at(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.current.kind) == mem::discriminant(kind)
    }

    /// Predicate that tests whether the next token has the same discriminant and eats the next token if yes as a side effect.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(&kind) {
            self.next(); // eat token
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(&kind) {
            Ok(self.next())
        } else {
            Err(self.unexpected())
        }
    }

    /// Eats an identifier, returning its name and line.
    fn expect_ident(&mut self) -> ParseResult<(String, usize)> {
        match &self.current.kind {
            TokenKind::Identifier(ident) => {
                let ident = ident.clone();
                let line = self.next().line;
                Ok((ident, line))
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Runs `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep {
                line: self.current.line,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Syntax error at the current token.
    fn unexpected(&self) -> ParseError {
        match &self.current.kind {
            TokenKind::Eof => ParseError::UnexpectedEof,
            found => ParseError::UnexpectedToken {
                found: found.clone(),
                line: self.current.line,
            },
        }
    }
}

fn end_of_input(source: &Source, lexer: &Lexer) -> Token {
    let end = source.content.len();
    Token {
        kind: TokenKind::Eof,
        line: lexer.line(),
        span: end..end,
    }
}
