//! SQL Token definitions
//!
//! This module defines all tokens that can appear in the supported query
//! dialect. Keywords outside the dialect are still recognized so the parser
//! can reject them with a precise message.

use std::fmt;

/// SQL Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // ========== Keywords ==========
    Select,
    From,
    Where,
    Join,
    Inner,
    On,
    And,
    Or,

    // Unsupported clauses and modifiers
    Left,
    Right,
    Full,
    Outer,
    Cross,
    Natural,
    Group,
    Order,
    Having,
    Limit,
    Offset,
    Union,
    Distinct,
    As,

    // ========== Literals ==========
    /// Integer literal
    IntegerLiteral(i64),
    /// Float literal
    FloatLiteral(f64),
    /// String literal (single-quoted)
    StringLiteral(String),
    /// Identifier (table name, column name, etc.)
    Identifier(String),

    // ========== Operators ==========
    /// =
    Eq,
    /// <> or !=
    Neq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Lte,
    /// >=
    Gte,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Asterisk,
    /// /
    Slash,
    /// %
    Percent,

    // ========== Delimiters ==========
    /// (
    LParen,
    /// )
    RParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,

    // ========== Special ==========
    /// End of input
    Eof,
}

impl Token {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Select
                | Token::From
                | Token::Where
                | Token::Join
                | Token::Inner
                | Token::On
                | Token::And
                | Token::Or
        ) || self.is_unsupported()
    }

    /// Keywords the dialect recognizes but does not accept
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Token::Left
                | Token::Right
                | Token::Full
                | Token::Outer
                | Token::Cross
                | Token::Natural
                | Token::Group
                | Token::Order
                | Token::Having
                | Token::Limit
                | Token::Offset
                | Token::Union
                | Token::Distinct
                | Token::As
        )
    }

    /// Check if this token is a comparison operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Token::Eq | Token::Neq | Token::Lt | Token::Gt | Token::Lte | Token::Gte
        )
    }

    /// Check if this token is a logical connective
    pub fn is_connective(&self) -> bool {
        matches!(self, Token::And | Token::Or)
    }

    /// Try to convert a string to a keyword token
    pub fn from_keyword(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            "SELECT" => Some(Token::Select),
            "FROM" => Some(Token::From),
            "WHERE" => Some(Token::Where),
            "JOIN" => Some(Token::Join),
            "INNER" => Some(Token::Inner),
            "ON" => Some(Token::On),
            "AND" => Some(Token::And),
            "OR" => Some(Token::Or),

            "LEFT" => Some(Token::Left),
            "RIGHT" => Some(Token::Right),
            "FULL" => Some(Token::Full),
            "OUTER" => Some(Token::Outer),
            "CROSS" => Some(Token::Cross),
            "NATURAL" => Some(Token::Natural),
            "GROUP" => Some(Token::Group),
            "ORDER" => Some(Token::Order),
            "HAVING" => Some(Token::Having),
            "LIMIT" => Some(Token::Limit),
            "OFFSET" => Some(Token::Offset),
            "UNION" => Some(Token::Union),
            "DISTINCT" => Some(Token::Distinct),
            "AS" => Some(Token::As),

            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Select => write!(f, "SELECT"),
            Token::From => write!(f, "FROM"),
            Token::Where => write!(f, "WHERE"),
            Token::Join => write!(f, "JOIN"),
            Token::Inner => write!(f, "INNER"),
            Token::On => write!(f, "ON"),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Left => write!(f, "LEFT"),
            Token::Right => write!(f, "RIGHT"),
            Token::Full => write!(f, "FULL"),
            Token::Outer => write!(f, "OUTER"),
            Token::Cross => write!(f, "CROSS"),
            Token::Natural => write!(f, "NATURAL"),
            Token::Group => write!(f, "GROUP"),
            Token::Order => write!(f, "ORDER"),
            Token::Having => write!(f, "HAVING"),
            Token::Limit => write!(f, "LIMIT"),
            Token::Offset => write!(f, "OFFSET"),
            Token::Union => write!(f, "UNION"),
            Token::Distinct => write!(f, "DISTINCT"),
            Token::As => write!(f, "AS"),
            Token::IntegerLiteral(n) => write!(f, "{}", n),
            Token::FloatLiteral(n) => write!(f, "{}", n),
            Token::StringLiteral(s) => write!(f, "'{}'", s),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Eq => write!(f, "="),
            Token::Neq => write!(f, "<>"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Lte => write!(f, "<="),
            Token::Gte => write!(f, ">="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Asterisk => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Dot => write!(f, "."),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

/// A token together with the byte range it covers in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

impl SpannedToken {
    pub fn new(token: Token, start: usize, end: usize) -> Self {
        Self { token, start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_parsing() {
        assert_eq!(Token::from_keyword("SELECT"), Some(Token::Select));
        assert_eq!(Token::from_keyword("select"), Some(Token::Select));
        assert_eq!(Token::from_keyword("JoIn"), Some(Token::Join));
        assert_eq!(Token::from_keyword("Produto"), None);
    }

    #[test]
    fn test_token_classes() {
        assert!(Token::Where.is_keyword());
        assert!(Token::Group.is_keyword());
        assert!(Token::Group.is_unsupported());
        assert!(!Token::Join.is_unsupported());
        assert!(Token::Gte.is_comparison());
        assert!(!Token::And.is_comparison());
        assert!(Token::Or.is_connective());
        assert!(!Token::IntegerLiteral(42).is_keyword());
    }
}
