//! Expression parsing implementation
//!
//! This module handles parsing of expressions using precedence climbing
//! for binary operators and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, strings, `true`, `false`, `null`, `undefined`
//! - Array literals `[a, b]` and object literals `{a: 1, "b": 2, 3: x, c}`
//! - Binary operators: arithmetic, equality, relational, logical
//! - Unary operators: `-`, `+`, `!`, `typeof`
//! - Postfix: `.name`, `[expr]`, `(args)`
//! - Assignment: `=`, `+=`, `-=`, `*=`, `/=`, `%=` (right-associative)
//!
//! # Precedence
//!
//! Lowest to highest: assignment, `||`, `&&`, equality, relational, additive,
//! multiplicative, unary, postfix.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.parse_assignment()
    }

    /// Parse assignment (right-associative). Every nested expression starts
    /// here, so this is where nesting depth is counted.
    pub(crate) fn parse_assignment(&mut self) -> Result<AstNode, ParseError> {
        self.enter()?;
        let result = self.parse_assignment_inner();
        self.depth -= 1;
        result
    }

    fn parse_assignment_inner(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_logical_or()?;

        let loc = self.current_location();
        let compound_op = match self.peek() {
            Token::Eq(_) => None,
            Token::PlusEq(_) => Some(BinOp::Add),
            Token::MinusEq(_) => Some(BinOp::Sub),
            Token::StarEq(_) => Some(BinOp::Mul),
            Token::SlashEq(_) => Some(BinOp::Div),
            Token::PercentEq(_) => Some(BinOp::Mod),
            _ => return Ok(expr),
        };

        if !expr.is_assignable() {
            return Err(ParseError {
                message: "Invalid left-hand side in assignment".to_string(),
                location: *expr.location(),
            });
        }
        self.advance();

        let rhs = Box::new(self.parse_assignment()?);
        let lhs = Box::new(expr);
        Ok(match compound_op {
            Some(op) => AstNode::CompoundAssignment {
                lhs,
                op,
                rhs,
                location: loc,
            },
            None => AstNode::Assignment {
                lhs,
                rhs,
                location: loc,
            },
        })
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_logical_and()?;
        let depth = self.depth;

        while self.match_token(&Token::OrOr(self.current_location())) {
            self.enter()?; // Left-nested chains recurse when evaluated
            let loc = self.previous_location();
            let right = Box::new(self.parse_logical_and()?);
            left = AstNode::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        self.depth = depth;
        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_equality()?;
        let depth = self.depth;

        while self.match_token(&Token::AndAnd(self.current_location())) {
            self.enter()?; // Left-nested chains recurse when evaluated
            let loc = self.previous_location();
            let right = Box::new(self.parse_equality()?);
            left = AstNode::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        self.depth = depth;
        Ok(left)
    }

    /// Parse equality (=== !== == !=)
    fn parse_equality(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_relational()?;
        let depth = self.depth;

        loop {
            let op = match self.peek() {
                Token::EqEqEq(_) => BinOp::StrictEq,
                Token::NotEqEq(_) => BinOp::StrictNe,
                Token::EqEq(_) => BinOp::LooseEq,
                Token::NotEq(_) => BinOp::LooseNe,
                _ => break,
            };
            self.enter()?; // Left-nested chains recurse when evaluated
            let loc = self.advance().location();
            let right = Box::new(self.parse_relational()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        self.depth = depth;
        Ok(left)
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_additive()?;
        let depth = self.depth;

        loop {
            let op = match self.peek() {
                Token::Lt(_) => BinOp::Lt,
                Token::Le(_) => BinOp::Le,
                Token::Gt(_) => BinOp::Gt,
                Token::Ge(_) => BinOp::Ge,
                _ => break,
            };
            self.enter()?; // Left-nested chains recurse when evaluated
            let loc = self.advance().location();
            let right = Box::new(self.parse_additive()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        self.depth = depth;
        Ok(left)
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_multiplicative()?;
        let depth = self.depth;

        loop {
            let op = match self.peek() {
                Token::Plus(_) => BinOp::Add,
                Token::Minus(_) => BinOp::Sub,
                _ => break,
            };
            self.enter()?; // Left-nested chains recurse when evaluated
            let loc = self.advance().location();
            let right = Box::new(self.parse_multiplicative()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        self.depth = depth;
        Ok(left)
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_unary()?;
        let depth = self.depth;

        loop {
            let op = match self.peek() {
                Token::Star(_) => BinOp::Mul,
                Token::Slash(_) => BinOp::Div,
                Token::Percent(_) => BinOp::Mod,
                _ => break,
            };
            self.enter()?; // Left-nested chains recurse when evaluated
            let loc = self.advance().location();
            let right = Box::new(self.parse_unary()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        self.depth = depth;
        Ok(left)
    }

    /// Parse unary operators (- + ! typeof)
    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        let op = match self.peek() {
            Token::Minus(_) => UnOp::Neg,
            Token::Plus(_) => UnOp::Plus,
            Token::Bang(_) => UnOp::Not,
            Token::Typeof(_) => UnOp::Typeof,
            _ => return self.parse_postfix(),
        };
        let loc = self.advance().location();
        self.enter()?;
        let operand = self.parse_unary();
        self.depth -= 1;
        let operand = Box::new(operand?);

        Ok(AstNode::UnaryOp {
            op,
            operand,
            location: loc,
        })
    }

    /// Parse postfix: member access, indexing, calls
    fn parse_postfix(&mut self) -> Result<AstNode, ParseError> {
        let mut expr = self.parse_primary()?;
        let depth = self.depth;

        loop {
            let loc = self.current_location();
            if matches!(
                self.peek(),
                Token::Dot(_) | Token::LBracket(_) | Token::LParen(_)
            ) {
                self.enter()?;
            }
            if self.match_token(&Token::Dot(loc)) {
                let member = self.expect_property_name()?;
                expr = AstNode::MemberAccess {
                    object: Box::new(expr),
                    member,
                    location: loc,
                };
            } else if self.match_token(&Token::LBracket(loc)) {
                let index = Box::new(self.parse_expression()?);
                self.expect_rbracket("after index expression")?;
                expr = AstNode::IndexAccess {
                    object: Box::new(expr),
                    index,
                    location: loc,
                };
            } else if self.match_token(&Token::LParen(loc)) {
                let args = self.parse_arguments()?;
                expr = AstNode::Call {
                    callee: Box::new(expr),
                    args,
                    location: loc,
                };
            } else {
                break;
            }
        }

        self.depth = depth;
        Ok(expr)
    }

    /// Parse call arguments after `(`, trailing comma allowed
    fn parse_arguments(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();

        while !self.check(&Token::RParen(self.current_location())) {
            args.push(self.parse_assignment()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_rparen("after arguments")?;

        Ok(args)
    }

    /// Parse primary expressions
    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        let node = match self.peek_token() {
            Token::Number(n, _) => AstNode::NumberLiteral(n, loc),
            Token::Str(s, _) => AstNode::StringLiteral(s, loc),
            Token::True(_) => AstNode::BoolLiteral(true, loc),
            Token::False(_) => AstNode::BoolLiteral(false, loc),
            Token::Null(_) => AstNode::Null { location: loc },
            Token::Undefined(_) => AstNode::Undefined { location: loc },
            Token::Ident(name, _) => AstNode::Variable(name, loc),
            Token::LBracket(_) => {
                self.advance();
                return self.parse_array_literal(loc);
            }
            Token::LBrace(_) => {
                self.advance();
                return self.parse_object_literal(loc);
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                return Ok(expr);
            }
            _ => return Err(self.unexpected()),
        };

        self.advance();
        Ok(node)
    }

    /// Parse array literal after `[`
    fn parse_array_literal(&mut self, location: SourceLocation) -> Result<AstNode, ParseError> {
        let mut elements = Vec::new();

        while !self.check(&Token::RBracket(self.current_location())) {
            if self.check(&Token::Comma(self.current_location())) {
                return Err(ParseError {
                    message: "Unsupported syntax: array holes".to_string(),
                    location: self.current_location(),
                });
            }
            elements.push(self.parse_assignment()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_rbracket("to close array literal")?;

        Ok(AstNode::ArrayLiteral { elements, location })
    }

    /// Parse object literal after `{`
    fn parse_object_literal(&mut self, location: SourceLocation) -> Result<AstNode, ParseError> {
        let mut properties = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) {
            let key_loc = self.current_location();
            let (key, shorthand) = match self.peek_token() {
                Token::Str(s, _) => {
                    self.advance();
                    (PropertyKey::Name(s), None)
                }
                Token::Number(n, _) => {
                    self.advance();
                    (PropertyKey::Number(n), None)
                }
                Token::Ident(name, _) => {
                    self.advance();
                    (PropertyKey::Name(name.clone()), Some(name))
                }
                Token::LBracket(_) => {
                    return Err(ParseError {
                        message: "Unsupported syntax: computed property name".to_string(),
                        location: key_loc,
                    })
                }
                _ => (PropertyKey::Name(self.expect_property_name()?), None),
            };

            let value = if self.match_token(&Token::Colon(self.current_location())) {
                self.parse_assignment()?
            } else if let Some(name) = shorthand.filter(|_| {
                self.check(&Token::Comma(self.current_location()))
                    || self.check(&Token::RBrace(self.current_location()))
            }) {
                AstNode::Variable(name, key_loc)
            } else {
                return Err(ParseError {
                    message: format!("Expected ':' after property name, found {}", self.peek()),
                    location: self.current_location(),
                });
            };

            properties.push((key, value));
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_token(
            &Token::RBrace(self.current_location()),
            "Expected '}' to close object literal",
        )?;

        Ok(AstNode::ObjectLiteral {
            properties,
            location,
        })
    }
}
