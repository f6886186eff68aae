//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `statements`: Parsing declarations and expression statements
//! - `expressions`: Parsing expressions with precedence climbing
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, Error)]
#[error("{message} ({location})")]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Deepest expression nesting the parser accepts. Brackets, parentheses,
/// unary operators and operator chains each count one level.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Recursive descent parser for the JavaScript subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Current expression nesting
    pub(crate) depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            depth: 0,
        })
    }

    /// Parse the entire program (a flat list of top-level statements)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let mut statements = self.parse_statement()?;
            program.statements.append(&mut statements);
        }

        Ok(program)
    }

    // ===== Helper methods =====

    /// Go one nesting level deeper, failing past [`MAX_NESTING_DEPTH`]
    pub(crate) fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError {
                message: "Maximum nesting depth exceeded".to_string(),
                location: self.current_location(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof and `advance` never
        // moves past it.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.peek().clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    /// Build an "Unexpected token" error at the current token
    pub(crate) fn unexpected(&self) -> ParseError {
        let message = match self.peek() {
            Token::Reserved(word, _) => format!("Unsupported syntax: '{}'", word),
            Token::PlusPlus(_) | Token::MinusMinus(_) | Token::FatArrow(_) | Token::Question(_) => {
                format!("Unsupported syntax: {}", self.peek())
            }
            Token::Eof(_) => "Unexpected end of input".to_string(),
            other => format!("Unexpected token {}", other),
        };
        ParseError {
            message,
            location: self.current_location(),
        }
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError {
                message: format!("{}, found {}", message, self.peek()),
                location: self.current_location(),
            })
        }
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_rbracket(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RBracket(self.current_location()),
            &format!("Expected ']' {ctx}"),
        )
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(ParseError {
                message: format!("Expected identifier, found {}", self.peek()),
                location: self.current_location(),
            })
        }
    }

    /// Any identifier-like word, keywords included (`a.null`, `{ let: 1 }`)
    pub(crate) fn expect_property_name(&mut self) -> Result<String, ParseError> {
        let name = match self.peek() {
            Token::Ident(name, _) | Token::Reserved(name, _) => name.clone(),
            Token::Let(_) => "let".to_string(),
            Token::Const(_) => "const".to_string(),
            Token::Var(_) => "var".to_string(),
            Token::True(_) => "true".to_string(),
            Token::False(_) => "false".to_string(),
            Token::Null(_) => "null".to_string(),
            Token::Undefined(_) => "undefined".to_string(),
            Token::Typeof(_) => "typeof".to_string(),
            _ => {
                return Err(ParseError {
                    message: format!("Expected property name, found {}", self.peek()),
                    location: self.current_location(),
                })
            }
        };
        self.advance();
        Ok(name)
    }
}

/// Parse a complete snippet
pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}
