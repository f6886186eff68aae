//! Lexer (tokenizer) for JavaScript snippets
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Keywords outside the supported subset (`function`, `if`, `new`, ...) are
//! lexed as [`Token::Reserved`] so the parser can reject them with a precise
//! location instead of treating them as identifiers.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64, SourceLocation),
    Str(String, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Keywords
    Let(SourceLocation),
    Const(SourceLocation),
    Var(SourceLocation),
    True(SourceLocation),
    False(SourceLocation),
    Null(SourceLocation),
    Undefined(SourceLocation),
    Typeof(SourceLocation),
    Reserved(String, SourceLocation), // Keyword outside the subset

    // Arithmetic
    Plus(SourceLocation),    // +
    Minus(SourceLocation),   // -
    Star(SourceLocation),    // *
    Slash(SourceLocation),   // /
    Percent(SourceLocation), // %

    // Comparison
    EqEqEq(SourceLocation),  // ===
    NotEqEq(SourceLocation), // !==
    EqEq(SourceLocation),    // ==
    NotEq(SourceLocation),   // !=
    Lt(SourceLocation),      // <
    Le(SourceLocation),      // <=
    Gt(SourceLocation),      // >
    Ge(SourceLocation),      // >=

    // Logical
    AndAnd(SourceLocation), // &&
    OrOr(SourceLocation),   // ||
    Bang(SourceLocation),   // !

    // Assignment
    Eq(SourceLocation),        // =
    PlusEq(SourceLocation),    // +=
    MinusEq(SourceLocation),   // -=
    StarEq(SourceLocation),    // *=
    SlashEq(SourceLocation),   // /=
    PercentEq(SourceLocation), // %=

    // Increment/Decrement (lexed only to be rejected)
    PlusPlus(SourceLocation),   // ++
    MinusMinus(SourceLocation), // --

    // Member access
    Dot(SourceLocation), // .

    // Misc
    Question(SourceLocation), // ?
    Colon(SourceLocation),    // :
    FatArrow(SourceLocation), // =>

    // Punctuation
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,

    // End of file
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::Number(_, loc)
            | Token::Str(_, loc)
            | Token::Ident(_, loc)
            | Token::Reserved(_, loc)
            | Token::Let(loc)
            | Token::Const(loc)
            | Token::Var(loc)
            | Token::True(loc)
            | Token::False(loc)
            | Token::Null(loc)
            | Token::Undefined(loc)
            | Token::Typeof(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Slash(loc)
            | Token::Percent(loc)
            | Token::EqEqEq(loc)
            | Token::NotEqEq(loc)
            | Token::EqEq(loc)
            | Token::NotEq(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::AndAnd(loc)
            | Token::OrOr(loc)
            | Token::Bang(loc)
            | Token::Eq(loc)
            | Token::PlusEq(loc)
            | Token::MinusEq(loc)
            | Token::StarEq(loc)
            | Token::SlashEq(loc)
            | Token::PercentEq(loc)
            | Token::PlusPlus(loc)
            | Token::MinusMinus(loc)
            | Token::Dot(loc)
            | Token::Question(loc)
            | Token::Colon(loc)
            | Token::FatArrow(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n, _) => write!(f, "number {}", n),
            Token::Str(s, _) => write!(f, "string \"{}\"", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Reserved(s, _) => write!(f, "'{}'", s),
            Token::Let(_) => write!(f, "'let'"),
            Token::Const(_) => write!(f, "'const'"),
            Token::Var(_) => write!(f, "'var'"),
            Token::True(_) => write!(f, "'true'"),
            Token::False(_) => write!(f, "'false'"),
            Token::Null(_) => write!(f, "'null'"),
            Token::Undefined(_) => write!(f, "'undefined'"),
            Token::Typeof(_) => write!(f, "'typeof'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::Slash(_) => write!(f, "'/'"),
            Token::Percent(_) => write!(f, "'%'"),
            Token::EqEqEq(_) => write!(f, "'==='"),
            Token::NotEqEq(_) => write!(f, "'!=='"),
            Token::EqEq(_) => write!(f, "'=='"),
            Token::NotEq(_) => write!(f, "'!='"),
            Token::Lt(_) => write!(f, "'<'"),
            Token::Le(_) => write!(f, "'<='"),
            Token::Gt(_) => write!(f, "'>'"),
            Token::Ge(_) => write!(f, "'>='"),
            Token::AndAnd(_) => write!(f, "'&&'"),
            Token::OrOr(_) => write!(f, "'||'"),
            Token::Bang(_) => write!(f, "'!'"),
            Token::Eq(_) => write!(f, "'='"),
            Token::PlusEq(_) => write!(f, "'+='"),
            Token::MinusEq(_) => write!(f, "'-='"),
            Token::StarEq(_) => write!(f, "'*='"),
            Token::SlashEq(_) => write!(f, "'/='"),
            Token::PercentEq(_) => write!(f, "'%='"),
            Token::PlusPlus(_) => write!(f, "'++'"),
            Token::MinusMinus(_) => write!(f, "'--'"),
            Token::Dot(_) => write!(f, "'.'"),
            Token::Question(_) => write!(f, "'?'"),
            Token::Colon(_) => write!(f, "':'"),
            Token::FatArrow(_) => write!(f, "'=>'"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::LBracket(_) => write!(f, "'['"),
            Token::RBracket(_) => write!(f, "']'"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Eof(_) => write!(f, "end of input"),
        }
    }
}

/// Keywords the subset does not support
const RESERVED_WORDS: &[&str] = &[
    "function", "return", "if", "else", "for", "while", "do", "switch", "case", "default",
    "break", "continue", "new", "delete", "class", "this", "throw", "try", "catch", "finally",
    "in", "of", "instanceof", "void", "yield", "async", "await", "import", "export", "super",
];

/// Lexer error type
#[derive(Debug, Clone, Error)]
#[error("{message} ({location})")]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for JavaScript snippets
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of input".to_string(),
            location: loc,
        })?;

        match ch {
            // String literals
            '"' | '\'' => self.string_literal(ch, loc),

            // Numeric literals (including `.5`)
            '0'..='9' => self.number_literal(ch, loc),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.number_literal(ch, loc),

            // Identifiers and keywords
            c if is_ident_start(c) => Ok(self.identifier_or_keyword(ch, loc)),

            '+' => {
                if self.peek() == Some('+') {
                    self.advance();
                    Ok(Token::PlusPlus(loc))
                } else if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::PlusEq(loc))
                } else {
                    Ok(Token::Plus(loc))
                }
            }
            '-' => {
                if self.peek() == Some('-') {
                    self.advance();
                    Ok(Token::MinusMinus(loc))
                } else if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::MinusEq(loc))
                } else {
                    Ok(Token::Minus(loc))
                }
            }
            '*' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::StarEq(loc))
                } else {
                    Ok(Token::Star(loc))
                }
            }
            '/' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::SlashEq(loc))
                } else {
                    Ok(Token::Slash(loc))
                }
            }
            '%' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::PercentEq(loc))
                } else {
                    Ok(Token::Percent(loc))
                }
            }
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        Ok(Token::EqEqEq(loc))
                    } else {
                        Ok(Token::EqEq(loc))
                    }
                } else if self.peek() == Some('>') {
                    self.advance();
                    Ok(Token::FatArrow(loc))
                } else {
                    Ok(Token::Eq(loc))
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        Ok(Token::NotEqEq(loc))
                    } else {
                        Ok(Token::NotEq(loc))
                    }
                } else {
                    Ok(Token::Bang(loc))
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::Le(loc))
                } else {
                    Ok(Token::Lt(loc))
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::Ge(loc))
                } else {
                    Ok(Token::Gt(loc))
                }
            }
            '&' if self.peek() == Some('&') => {
                self.advance();
                Ok(Token::AndAnd(loc))
            }
            '|' if self.peek() == Some('|') => {
                self.advance();
                Ok(Token::OrOr(loc))
            }
            '.' => Ok(Token::Dot(loc)),
            '?' => Ok(Token::Question(loc)),
            ':' => Ok(Token::Colon(loc)),
            '(' => Ok(Token::LParen(loc)),
            ')' => Ok(Token::RParen(loc)),
            '{' => Ok(Token::LBrace(loc)),
            '}' => Ok(Token::RBrace(loc)),
            '[' => Ok(Token::LBracket(loc)),
            ']' => Ok(Token::RBracket(loc)),
            ';' => Ok(Token::Semicolon(loc)),
            ',' => Ok(Token::Comma(loc)),

            '`' => Err(LexError {
                message: "Template literals are not supported".to_string(),
                location: loc,
            }),
            _ => Err(LexError {
                message: format!("Invalid or unexpected token '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Parse string literal delimited by `quote`
    fn string_literal(&mut self, quote: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == quote {
                self.advance(); // consume closing quote
                return Ok(Token::Str(string, loc));
            }
            if ch == '\n' {
                break;
            }

            self.advance();
            if ch != '\\' {
                string.push(ch);
                continue;
            }

            let escaped = self.advance().ok_or_else(|| LexError {
                message: "Invalid or unexpected token".to_string(),
                location: self.current_location(),
            })?;
            let unescaped = match escaped {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                '0' => '\0',
                'x' => self.hex_escape(2)?,
                'u' => self.hex_escape(4)?,
                '\n' => continue, // line continuation
                other => other,   // \\ \' \" and identity escapes
            };
            string.push(unescaped);
        }

        Err(LexError {
            message: "Invalid or unexpected token: unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Read `digits` hex digits of a `\x` / `\u` escape
    fn hex_escape(&mut self, digits: usize) -> Result<char, LexError> {
        let loc = self.current_location();
        let mut hex = String::with_capacity(digits);
        for _ in 0..digits {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.advance();
                }
                _ => {
                    return Err(LexError {
                        message: "Invalid hexadecimal escape sequence".to_string(),
                        location: loc,
                    });
                }
            }
        }

        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| LexError {
                message: format!("Invalid escape sequence: \\u{}", hex),
                location: loc,
            })
    }

    /// Parse numeric literal: decimal with optional fraction and exponent, or `0x` hex
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Result<Token, LexError> {
        if first == '0' && matches!(self.peek(), Some('x') | Some('X')) {
            self.advance();
            let mut hex = String::new();
            while let Some(c) = self.peek().filter(|c| c.is_ascii_hexdigit()) {
                hex.push(c);
                self.advance();
            }
            let value = u64::from_str_radix(&hex, 16).map_err(|_| LexError {
                message: format!("Invalid hexadecimal literal: 0x{}", hex),
                location: loc,
            })?;
            return Ok(Token::Number(value as f64, loc));
        }

        let mut num_str = String::new();
        num_str.push(first);
        let mut seen_dot = first == '.';

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.' && !seen_dot {
                seen_dot = true;
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign = self.peek_ahead(1);
            let signed = matches!(sign, Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self
                .peek_ahead(digit_at)
                .is_some_and(|c| c.is_ascii_digit())
            {
                num_str.push('e');
                self.advance();
                if digit_at == 2 {
                    if let Some(s) = self.advance() {
                        num_str.push(s);
                    }
                }
                while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                    num_str.push(c);
                    self.advance();
                }
            }
        }

        if self.peek().is_some_and(is_ident_start) {
            return Err(LexError {
                message: "Invalid or unexpected token: identifier directly after number"
                    .to_string(),
                location: self.current_location(),
            });
        }

        let value = num_str.parse::<f64>().map_err(|_| LexError {
            message: format!("Invalid number literal: {}", num_str),
            location: loc,
        })?;

        Ok(Token::Number(value, loc))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if is_ident_continue(ch) {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "let" => Token::Let(loc),
            "const" => Token::Const(loc),
            "var" => Token::Var(loc),
            "true" => Token::True(loc),
            "false" => Token::False(loc),
            "null" => Token::Null(loc),
            "undefined" => Token::Undefined(loc),
            "typeof" => Token::Typeof(loc),
            word if RESERVED_WORDS.contains(&word) => Token::Reserved(ident, loc),
            _ => Token::Ident(ident, loc),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("let a = [1, 'x'];");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Let(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "a"));
        assert!(matches!(tokens[2], Token::Eq(_)));
        assert!(matches!(tokens[3], Token::LBracket(_)));
        assert!(matches!(tokens[4], Token::Number(n, _) if n == 1.0));
        assert!(matches!(tokens[5], Token::Comma(_)));
        assert!(matches!(tokens[6], Token::Str(ref s, _) if s == "x"));
        assert!(matches!(tokens[7], Token::RBracket(_)));
        assert!(matches!(tokens[8], Token::Semicolon(_)));
        assert!(matches!(tokens[9], Token::Eof(_)));
    }

    #[test]
    fn test_operators() {
        let mut lexer = Lexer::new("=== !== == != += && || => ++");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::EqEqEq(_)));
        assert!(matches!(tokens[1], Token::NotEqEq(_)));
        assert!(matches!(tokens[2], Token::EqEq(_)));
        assert!(matches!(tokens[3], Token::NotEq(_)));
        assert!(matches!(tokens[4], Token::PlusEq(_)));
        assert!(matches!(tokens[5], Token::AndAnd(_)));
        assert!(matches!(tokens[6], Token::OrOr(_)));
        assert!(matches!(tokens[7], Token::FatArrow(_)));
        assert!(matches!(tokens[8], Token::PlusPlus(_)));
    }

    #[test]
    fn test_numbers() {
        let mut lexer = Lexer::new("0.5 .25 1e3 2.5E-2 0xFF 7");
        let tokens = lexer.tokenize().unwrap();
        let numbers: Vec<f64> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Number(n, _) => Some(*n),
                _ => None,
            })
            .collect();

        assert_eq!(numbers, vec![0.5, 0.25, 1000.0, 0.025, 255.0, 7.0]);
    }

    #[test]
    fn test_comments_and_locations() {
        let mut lexer = Lexer::new("x // comment\n/* block\ncomment */ y");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "y"));
        assert_eq!(tokens[1].location(), SourceLocation::new(3, 12));
    }

    #[test]
    fn test_string_escapes() {
        let mut lexer = Lexer::new(r#"'it\'s' "a\n\x41é""#);
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Str(ref s, _) if s == "it's"));
        assert!(matches!(tokens[1], Token::Str(ref s, _) if s == "a\nAé"));
    }

    #[test]
    fn test_reserved_words() {
        let mut lexer = Lexer::new("function $x");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Reserved(ref s, _) if s == "function"));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "$x"));
    }

    #[test]
    fn test_errors() {
        let err = Lexer::new("'open").tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(1, 1));

        let err = Lexer::new("a # b").tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(1, 3));

        assert!(Lexer::new("`t`").tokenize().is_err());
        assert!(Lexer::new("/* never closed").tokenize().is_err());
    }
}
