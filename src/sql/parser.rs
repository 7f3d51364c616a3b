//! SQL Parser
//!
//! This module turns query text into a validated [`ParsedQuery`]. Parsing is
//! a single pass over the token stream keyed on the clause keywords
//! `SELECT`, `FROM`, `JOIN`, `ON` and `WHERE`; predicate text between the
//! boundaries is kept verbatim and checked by the [`Validator`].

use super::ast::{ColumnRef, JoinClause, ParsedQuery};
use super::lexer::Lexer;
use super::token::{SpannedToken, Token};
use super::validator::Validator;
use crate::catalog::SchemaCatalog;
use crate::error::{Error, ErrorKind, Result};
use tracing::debug;

/// Parser configuration
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Accept `OR` between WHERE conditions
    pub allow_or: bool,
    /// Derive missing `ON` conditions from foreign keys
    pub infer_join_conditions: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            allow_or: true,
            infer_join_conditions: false,
        }
    }
}

impl ParserConfig {
    /// Create a new parser config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept or reject `OR` in WHERE
    pub fn allow_or(mut self, allow: bool) -> Self {
        self.allow_or = allow;
        self
    }

    /// Enable foreign-key inference for `JOIN <table>` without `ON`
    pub fn infer_join_conditions(mut self, infer: bool) -> Self {
        self.infer_join_conditions = infer;
        self
    }
}

/// Result of a parse in the shape presentation layers consume
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub ok: bool,
    /// Human-readable status or error detail
    pub message: String,
    pub parsed: Option<ParsedQuery>,
    /// Failure classification, `None` on success
    pub kind: Option<ErrorKind>,
}

impl From<Result<ParsedQuery>> for ParseOutcome {
    fn from(result: Result<ParsedQuery>) -> Self {
        match result {
            Ok(parsed) => Self {
                ok: true,
                message: "Query is valid".to_string(),
                parsed: Some(parsed),
                kind: None,
            },
            Err(e) => Self {
                ok: false,
                message: e.to_string(),
                parsed: None,
                kind: Some(e.kind()),
            },
        }
    }
}

/// SQL Parser
pub struct Parser<'a> {
    catalog: &'a dyn SchemaCatalog,
    config: ParserConfig,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration
    pub fn new(catalog: &'a dyn SchemaCatalog) -> Self {
        Self::with_config(catalog, ParserConfig::default())
    }

    /// Create a new parser
    pub fn with_config(catalog: &'a dyn SchemaCatalog, config: ParserConfig) -> Self {
        Self { catalog, config }
    }

    /// Parse and validate a single query
    pub fn parse(&self, sql: &str) -> Result<ParsedQuery> {
        let text = normalize_whitespace(sql);
        debug!(query = %text, "parsing query");

        check_structure(&text)?;

        let tokens = Lexer::new(&text).tokenize()?;
        let raw = ClauseSplitter::new(&text, &tokens, self.config.infer_join_conditions).split()?;
        debug!(
            select = raw.select.len(),
            joins = raw.joins.len(),
            has_where = raw.where_clause.is_some(),
            "clauses split"
        );

        let validator = Validator::new(self.catalog, self.config.allow_or);
        validator.validate_tables(
            std::iter::once(raw.from.as_str()).chain(raw.joins.iter().map(|j| j.table.as_str())),
        )?;

        let joins = self.resolve_joins(&raw.from, raw.joins)?;
        let query = ParsedQuery {
            select: raw.select,
            from: vec![raw.from],
            joins,
            where_clause: raw.where_clause,
        };

        validator.validate_columns(&query)?;
        validator.validate_conditions(&query)?;

        debug!(tables = ?query.tables(), "query validated");
        Ok(query)
    }

    /// Parse, reporting the outcome as `(ok, message, parsed)`
    pub fn check(&self, sql: &str) -> ParseOutcome {
        self.parse(sql).into()
    }

    fn resolve_joins(&self, from: &str, raw: Vec<RawJoin>) -> Result<Vec<JoinClause>> {
        let mut scope = vec![from.to_string()];
        let mut joins = Vec::with_capacity(raw.len());

        for join in raw {
            let condition = match join.condition {
                Some(condition) => condition,
                None => self.infer_join_condition(&scope, &join.table)?,
            };
            scope.push(join.table.clone());
            joins.push(JoinClause::new(join.table, condition));
        }

        Ok(joins)
    }

    fn infer_join_condition(&self, scope: &[String], table: &str) -> Result<String> {
        let path = scope
            .iter()
            .find_map(|t| self.catalog.find_join_path(t, table))
            .ok_or_else(|| {
                Error::MalformedQuery(format!(
                    "JOIN {} has no ON condition and no foreign key relates it to {}",
                    table,
                    scope.join(", ")
                ))
            })?;

        debug!(table, condition = %path, "inferred join condition");
        Ok(path.condition())
    }
}

/// Collapse whitespace runs into single spaces and trim
pub fn normalize_whitespace(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// SELECT and FROM must both appear, SELECT first
fn check_structure(text: &str) -> Result<()> {
    let words: Vec<String> = text
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_uppercase)
        .collect();

    let select_pos = words.iter().position(|w| w == "SELECT");
    let from_pos = words.iter().position(|w| w == "FROM");

    match (select_pos, from_pos) {
        (Some(s), Some(f)) if s < f => Ok(()),
        (Some(_), Some(_)) => Err(Error::Syntax("SELECT must come before FROM".to_string())),
        _ => Err(Error::Syntax(
            "query must contain both SELECT and FROM".to_string(),
        )),
    }
}

/// Clauses as written, before catalog checks
#[derive(Debug)]
struct RawQuery {
    select: Vec<ColumnRef>,
    from: String,
    joins: Vec<RawJoin>,
    where_clause: Option<String>,
}

#[derive(Debug)]
struct RawJoin {
    table: String,
    condition: Option<String>,
}

/// Splits a token stream at clause boundaries
struct ClauseSplitter<'t> {
    text: &'t str,
    tokens: &'t [SpannedToken],
    position: usize,
    allow_missing_on: bool,
}

impl<'t> ClauseSplitter<'t> {
    fn new(text: &'t str, tokens: &'t [SpannedToken], allow_missing_on: bool) -> Self {
        Self {
            text,
            tokens,
            position: 0,
            allow_missing_on,
        }
    }

    fn split(mut self) -> Result<RawQuery> {
        self.reject_unsupported()?;

        if !self.check(&Token::Select) {
            return Err(malformed(format!(
                "query must start with SELECT, found '{}'",
                self.current()
            )));
        }
        self.advance();

        let select = self.parse_select_list()?;

        self.expect(&Token::From)?;
        let from = self.parse_table_name("FROM")?;
        if self.check(&Token::Comma) {
            return Err(malformed(
                "FROM accepts exactly one table; combine tables with JOIN ... ON",
            ));
        }

        let mut joins = Vec::new();
        while self.is_join_start() {
            joins.push(self.parse_join()?);
        }

        let where_clause = if self.check(&Token::Where) {
            self.advance();
            Some(self.parse_predicate("WHERE")?)
        } else {
            None
        };

        self.parse_end()?;

        Ok(RawQuery {
            select,
            from,
            joins,
            where_clause,
        })
    }

    /// Reject constructs outside the dialect before looking at clause shape
    fn reject_unsupported(&self) -> Result<()> {
        for (i, spanned) in self.tokens.iter().enumerate() {
            match &spanned.token {
                t if t.is_unsupported() => {
                    return Err(malformed(format!("{} is not supported", t)));
                }
                Token::LParen | Token::RParen => {
                    return Err(malformed("parenthesized expressions are not supported"));
                }
                Token::Semicolon => {
                    let rest = &self.tokens[i + 1..];
                    if !matches!(rest.first().map(|t| &t.token), Some(Token::Eof)) {
                        return Err(malformed("multiple statements are not supported"));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_select_list(&mut self) -> Result<Vec<ColumnRef>> {
        if self.check(&Token::From) {
            return Err(malformed("empty SELECT list"));
        }

        let mut items = Vec::new();
        loop {
            items.push(self.parse_column_ref()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance(); // consume comma
        }

        if !self.check(&Token::From) {
            return Err(malformed(format!(
                "unexpected '{}' in SELECT list",
                self.current()
            )));
        }

        Ok(items)
    }

    fn parse_column_ref(&mut self) -> Result<ColumnRef> {
        if self.check(&Token::Asterisk) {
            return Err(malformed(
                "wildcard '*' is not supported; list the columns explicitly",
            ));
        }

        let first = match self.current().clone() {
            Token::Identifier(name) => name,
            other if other.is_keyword() => {
                return Err(malformed(format!(
                    "expected a column reference in SELECT list, found keyword {}",
                    other
                )))
            }
            other => {
                return Err(malformed(format!(
                    "expected a column reference in SELECT list, found '{}'",
                    other
                )))
            }
        };
        self.advance();

        if !self.check(&Token::Dot) {
            return Ok(ColumnRef::bare(first));
        }
        self.advance(); // consume dot

        match self.current().clone() {
            Token::Identifier(column) => {
                self.advance();
                Ok(ColumnRef::qualified(first, column))
            }
            other => Err(malformed(format!(
                "expected a column name after '{}.', found '{}'",
                first, other
            ))),
        }
    }

    fn parse_table_name(&mut self, clause: &str) -> Result<String> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other if other.is_keyword() => Err(malformed(format!(
                "expected a table name after {}, found keyword {}",
                clause, other
            ))),
            other => Err(malformed(format!(
                "expected a table name after {}, found '{}'",
                clause, other
            ))),
        }
    }

    fn is_join_start(&self) -> bool {
        self.check(&Token::Join)
            || (self.check(&Token::Inner) && self.peek() == Some(&Token::Join))
    }

    fn parse_join(&mut self) -> Result<RawJoin> {
        if self.check(&Token::Inner) {
            self.advance();
        }
        self.expect(&Token::Join)?;
        let table = self.parse_table_name("JOIN")?;

        let condition = if self.check(&Token::On) {
            self.advance();
            Some(self.parse_predicate("ON")?)
        } else if self.allow_missing_on {
            None
        } else {
            return Err(malformed(format!(
                "JOIN {} is missing its ON condition",
                table
            )));
        };

        Ok(RawJoin { table, condition })
    }

    /// Consume predicate tokens up to the next clause boundary, returning the
    /// covered source text
    fn parse_predicate(&mut self, clause: &str) -> Result<String> {
        let first = self.position;

        while !self.is_predicate_end() {
            if matches!(self.current(), Token::Select | Token::From | Token::On) {
                return Err(malformed(format!(
                    "unexpected {} in {} condition",
                    self.current(),
                    clause
                )));
            }
            self.advance();
        }

        if self.position == first {
            return Err(malformed(format!("empty {} condition", clause)));
        }

        let start = self.tokens[first].start;
        let end = self.tokens[self.position - 1].end;
        Ok(self.text[start..end].to_string())
    }

    fn is_predicate_end(&self) -> bool {
        matches!(
            self.current(),
            Token::Join | Token::Inner | Token::Where | Token::Semicolon | Token::Eof
        )
    }

    fn parse_end(&mut self) -> Result<()> {
        if self.check(&Token::Semicolon) {
            self.advance();
        }
        if self.is_at_end() {
            Ok(())
        } else {
            Err(malformed(format!("unexpected '{}'", self.current())))
        }
    }

    fn current(&self) -> &Token {
        self.tokens
            .get(self.position)
            .map(|t| &t.token)
            .unwrap_or(&Token::Eof)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position + 1).map(|t| &t.token)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(malformed(format!(
                "expected {}, found '{}'",
                token,
                self.current()
            )))
        }
    }
}

fn malformed(message: impl Into<String>) -> Error {
    Error::MalformedQuery(message.into())
}
