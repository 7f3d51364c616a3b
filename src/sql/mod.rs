//! SQL front end
//!
//! Lexer, clause splitter and semantic validator for the supported
//! single-statement `SELECT ... FROM ... [JOIN ... ON ...] [WHERE ...]` dialect.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod predicate;
pub mod token;
pub mod validator;

pub use ast::{ColumnRef, JoinClause, ParsedQuery};
pub use lexer::Lexer;
pub use parser::{normalize_whitespace, ParseOutcome, Parser, ParserConfig};
pub use token::{SpannedToken, Token};
pub use validator::Validator;
