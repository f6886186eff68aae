//! Statement parsing implementation
//!
//! Snippets are flat: a sequence of `let`/`const`/`var` declarations and
//! expression statements. A declaration list (`let a = 1, b;`) expands into
//! one [`AstNode::VarDecl`] per declarator so the evaluator binds them in
//! source order.
//!
//! # Statement Termination
//!
//! A statement ends at `;`, at end of input, or before a token on a later line
//! (the common case of automatic semicolon insertion). Two statements on one
//! line without a `;` between them are a syntax error.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse one statement; declarations may yield several nodes
    pub(crate) fn parse_statement(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let loc = self.current_location();

        if self.match_token(&Token::Semicolon(loc)) {
            return Ok(vec![AstNode::Empty { location: loc }]);
        }

        let kind = match self.peek() {
            Token::Let(_) => Some(DeclKind::Let),
            Token::Const(_) => Some(DeclKind::Const),
            Token::Var(_) => Some(DeclKind::Var),
            _ => None,
        };

        let nodes = match kind {
            Some(kind) => {
                self.advance();
                self.parse_declarators(kind)?
            }
            None => {
                if self.check(&Token::LBrace(loc)) {
                    return Err(ParseError {
                        message: "Unsupported syntax: block statement".to_string(),
                        location: loc,
                    });
                }
                let expr = self.parse_expression()?;
                vec![AstNode::ExpressionStatement {
                    expr: Box::new(expr),
                    location: loc,
                }]
            }
        };

        self.end_statement()?;
        Ok(nodes)
    }

    /// Parse `name [= expr] {, name [= expr]}` after the declaration keyword
    fn parse_declarators(&mut self, kind: DeclKind) -> Result<Vec<AstNode>, ParseError> {
        let mut nodes = Vec::new();

        loop {
            let location = self.current_location();
            let name = self.expect_identifier()?;

            let init = if self.match_token(&Token::Eq(self.current_location())) {
                Some(Box::new(self.parse_assignment()?))
            } else if kind == DeclKind::Const {
                return Err(ParseError {
                    message: "Missing initializer in const declaration".to_string(),
                    location: self.current_location(),
                });
            } else {
                None
            };

            nodes.push(AstNode::VarDecl {
                kind,
                name,
                init,
                location,
            });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(nodes)
    }

    /// Consume a statement terminator, or accept an implicit one
    fn end_statement(&mut self) -> Result<(), ParseError> {
        if self.match_token(&Token::Semicolon(self.current_location())) || self.is_at_end() {
            return Ok(());
        }
        if self.check(&Token::RBrace(self.current_location())) {
            return Err(self.unexpected());
        }
        if self.current_location().line > self.previous_location().line {
            return Ok(());
        }
        Err(self.unexpected())
    }
}
