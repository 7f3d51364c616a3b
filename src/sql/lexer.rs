//! SQL Lexer (Tokenizer)
//!
//! This module converts query text into a stream of tokens. Every token
//! carries the byte span it was read from so clause and predicate text can
//! be sliced out of the source verbatim.

use super::token::{SpannedToken, Token};
use crate::error::{Error, Result};

/// SQL Lexer
pub struct Lexer<'a> {
    /// Source text
    source: &'a str,
    /// Input characters with their byte offsets
    input: Vec<(usize, char)>,
    /// Current position in input
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            input: source.char_indices().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let start = self.offset();
            let token = self.next_token()?;
            let end = self.offset();

            let at_end = token == Token::Eof;
            tokens.push(SpannedToken::new(token, start, end));
            if at_end {
                break;
            }
        }

        Ok(tokens)
    }

    /// Get the next token from the input
    fn next_token(&mut self) -> Result<Token> {
        if self.is_at_end() {
            return Ok(Token::Eof);
        }

        let ch = self.current_char();

        match ch {
            '(' => return Ok(self.single(Token::LParen)),
            ')' => return Ok(self.single(Token::RParen)),
            ',' => return Ok(self.single(Token::Comma)),
            ';' => return Ok(self.single(Token::Semicolon)),
            '.' => return Ok(self.single(Token::Dot)),
            '+' => return Ok(self.single(Token::Plus)),
            '*' => return Ok(self.single(Token::Asterisk)),
            '/' => return Ok(self.single(Token::Slash)),
            '%' => return Ok(self.single(Token::Percent)),
            '=' => return Ok(self.single(Token::Eq)),
            '-' => {
                self.advance();
                // Check for negative number
                if !self.is_at_end() && self.current_char().is_ascii_digit() {
                    let num = self.read_number()?;
                    return Ok(match num {
                        Token::IntegerLiteral(n) => Token::IntegerLiteral(-n),
                        Token::FloatLiteral(n) => Token::FloatLiteral(-n),
                        other => other,
                    });
                }
                return Ok(Token::Minus);
            }
            '<' => {
                self.advance();
                return Ok(match self.peek_current() {
                    Some('=') => self.single(Token::Lte),
                    Some('>') => self.single(Token::Neq),
                    _ => Token::Lt,
                });
            }
            '>' => {
                self.advance();
                return Ok(match self.peek_current() {
                    Some('=') => self.single(Token::Gte),
                    _ => Token::Gt,
                });
            }
            '!' => {
                let pos = self.position;
                self.advance();
                if self.peek_current() == Some('=') {
                    return Ok(self.single(Token::Neq));
                }
                return Err(Error::MalformedQuery(format!(
                    "unexpected character '!' at position {}",
                    pos
                )));
            }
            '\'' => return self.read_string(),
            '"' => return self.read_quoted_identifier(),
            _ => {}
        }

        // Numbers
        if ch.is_ascii_digit() {
            return self.read_number();
        }

        // Identifiers and keywords
        if ch.is_alphabetic() || ch == '_' {
            return Ok(self.read_identifier());
        }

        Err(Error::MalformedQuery(format!(
            "unexpected character '{}' at position {}",
            ch, self.position
        )))
    }

    /// Check if we've reached the end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Byte offset of the current position
    fn offset(&self) -> usize {
        self.input
            .get(self.position)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.source.len())
    }

    /// Get the current character
    fn current_char(&self) -> char {
        self.input[self.position].1
    }

    fn peek_current(&self) -> Option<char> {
        self.input.get(self.position).map(|(_, c)| *c)
    }

    /// Peek at the next character
    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).map(|(_, c)| *c)
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Consume one character and yield `token`
    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    /// Read a string literal (single-quoted)
    fn read_string(&mut self) -> Result<Token> {
        let start_pos = self.position;
        self.advance(); // skip opening quote

        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch == '\'' {
                // Check for escaped quote ''
                if self.peek_char() == Some('\'') {
                    value.push('\'');
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // skip closing quote
                    return Ok(Token::StringLiteral(value));
                }
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Err(Error::MalformedQuery(format!(
            "unterminated string literal starting at position {}",
            start_pos
        )))
    }

    /// Read a quoted identifier (double-quoted)
    fn read_quoted_identifier(&mut self) -> Result<Token> {
        let start_pos = self.position;
        self.advance(); // skip opening quote

        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch == '"' {
                if self.peek_char() == Some('"') {
                    value.push('"');
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // skip closing quote
                    return Ok(Token::Identifier(value));
                }
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Err(Error::MalformedQuery(format!(
            "unterminated quoted identifier starting at position {}",
            start_pos
        )))
    }

    /// Read a number (integer or float)
    fn read_number(&mut self) -> Result<Token> {
        let start_pos = self.position;
        let mut value = String::new();
        let mut is_float = false;

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch.is_ascii_digit() {
                value.push(ch);
                self.advance();
            } else if ch == '.' && !is_float {
                // Check if it's a float or a dot operator
                match self.peek_char() {
                    Some(next) if next.is_ascii_digit() => {
                        is_float = true;
                        value.push(ch);
                        self.advance();
                    }
                    _ => break,
                }
            } else {
                break;
            }
        }

        let invalid = || Error::MalformedQuery(format!("invalid number at position {}", start_pos));
        if is_float {
            value
                .parse::<f64>()
                .map(Token::FloatLiteral)
                .map_err(|_| invalid())
        } else {
            value
                .parse::<i64>()
                .map(Token::IntegerLiteral)
                .map_err(|_| invalid())
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();
            if ch.is_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::from_keyword(&value).unwrap_or(Token::Identifier(value))
    }
}
