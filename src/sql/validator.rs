//! Semantic validation of parsed queries
//!
//! Checks run in a fixed order and stop at the first failure: table
//! existence, column existence, then operator well-formedness of the
//! predicates.

use super::ast::{ColumnRef, ParsedQuery};
use super::lexer::Lexer;
use super::predicate;
use super::token::Token;
use crate::catalog::SchemaCatalog;
use crate::error::{Error, Result};

/// Validates queries against a schema catalog
pub struct Validator<'a> {
    catalog: &'a dyn SchemaCatalog,
    allow_or: bool,
}

impl<'a> Validator<'a> {
    /// Create a new validator
    pub fn new(catalog: &'a dyn SchemaCatalog, allow_or: bool) -> Self {
        Self { catalog, allow_or }
    }

    /// Every table must exist in the catalog
    pub fn validate_tables<'t>(&self, tables: impl IntoIterator<Item = &'t str>) -> Result<()> {
        for table in tables {
            if !self.catalog.table_exists(table) {
                return Err(Error::UnknownTable(table.to_string()));
            }
        }
        Ok(())
    }

    /// Every SELECT column and every qualified column inside JOIN and WHERE
    /// predicates must resolve
    pub fn validate_columns(&self, query: &ParsedQuery) -> Result<()> {
        let tables = query.tables();

        for column in &query.select {
            match &column.table {
                Some(_) => self.check_qualified(column, "SELECT list")?,
                None => {
                    let found = tables
                        .iter()
                        .any(|t| self.catalog.column_exists(t, &column.column));
                    if !found {
                        return Err(Error::UnknownColumn(format!(
                            "column '{}' was not found in any table of the query",
                            column.column
                        )));
                    }
                }
            }
        }

        for join in &query.joins {
            for column in predicate::column_refs(&join.condition) {
                self.check_qualified(&column, "JOIN condition")?;
            }
        }

        if let Some(where_clause) = &query.where_clause {
            for column in predicate::column_refs(where_clause) {
                self.check_qualified(&column, "WHERE clause")?;
            }
        }

        Ok(())
    }

    fn check_qualified(&self, column: &ColumnRef, context: &str) -> Result<()> {
        let table = column.table.as_deref().unwrap_or_default();
        if !self.catalog.table_exists(table) {
            return Err(Error::UnknownColumn(format!(
                "table '{}' of column '{}' does not exist ({})",
                table, column, context
            )));
        }
        if !self.catalog.column_exists(table, &column.column) {
            return Err(Error::UnknownColumn(format!(
                "column '{}' does not exist in table '{}' ({})",
                column.column, table, context
            )));
        }
        Ok(())
    }

    /// Operator well-formedness of WHERE, then of every JOIN condition
    pub fn validate_conditions(&self, query: &ParsedQuery) -> Result<()> {
        if let Some(where_clause) = &query.where_clause {
            self.validate_condition(where_clause, "WHERE clause", self.allow_or)?;
        }
        for join in &query.joins {
            self.validate_condition(&join.condition, "JOIN condition", false)?;
        }
        Ok(())
    }

    fn validate_condition(&self, text: &str, clause: &str, allow_or: bool) -> Result<()> {
        let mut tokens = Lexer::new(text).tokenize()?;
        tokens.pop();

        for pair in tokens.windows(2) {
            if pair[0].token.is_comparison() && pair[1].token.is_comparison() {
                return Err(Error::malformed_condition(
                    &text[pair[0].start..pair[1].end],
                    format!("invalid operator in {}", clause),
                ));
            }
        }

        if let Some(last) = tokens.last() {
            if last.token.is_connective() {
                return Err(Error::malformed_condition(
                    text,
                    format!("{} ends with a dangling {}", clause, last.token),
                ));
            }
        }

        if !allow_or && tokens.iter().any(|t| t.token == Token::Or) {
            return Err(Error::malformed_condition(
                text,
                format!("OR is not supported in {}", clause),
            ));
        }

        for atom in tokens.split(|t| t.token.is_connective()) {
            if atom.is_empty() {
                return Err(Error::malformed_condition(
                    text,
                    format!("empty condition between logical connectives in {}", clause),
                ));
            }

            let fragment = &text[atom[0].start..atom[atom.len() - 1].end];
            let operators: Vec<usize> = atom
                .iter()
                .enumerate()
                .filter(|(_, t)| t.token.is_comparison())
                .map(|(i, _)| i)
                .collect();

            match operators.as_slice() {
                [] => {
                    return Err(Error::malformed_condition(
                        fragment,
                        "missing comparison operator",
                    ))
                }
                [i] if *i == 0 || *i == atom.len() - 1 => {
                    return Err(Error::malformed_condition(fragment, "incomplete expression"))
                }
                [_] => {}
                _ => {
                    return Err(Error::malformed_condition(
                        fragment,
                        "more than one comparison operator (missing AND/OR?)",
                    ))
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::ErrorKind;
    use crate::sql::ast::JoinClause;

    fn query(select: &[&str], joins: &[(&str, &str)], where_clause: Option<&str>) -> ParsedQuery {
        ParsedQuery {
            select: select.iter().map(|s| ColumnRef::from(*s)).collect(),
            from: vec!["Produto".to_string()],
            joins: joins
                .iter()
                .map(|(t, c)| JoinClause::new(*t, *c))
                .collect(),
            where_clause: where_clause.map(str::to_string),
        }
    }

    fn condition_error(where_clause: &str) -> Error {
        let catalog = Catalog::store_schema();
        let validator = Validator::new(&catalog, true);
        validator
            .validate_conditions(&query(&["Nome"], &[], Some(where_clause)))
            .unwrap_err()
    }

    #[test]
    fn test_unknown_table() {
        let catalog = Catalog::store_schema();
        let validator = Validator::new(&catalog, true);

        validator.validate_tables(["produto", "CATEGORIA"]).unwrap();
        match validator.validate_tables(["Produto", "Nope"]) {
            Err(Error::UnknownTable(t)) => assert_eq!(t, "Nope"),
            other => panic!("Expected UnknownTable, got {:?}", other),
        }
    }

    #[test]
    fn test_unqualified_column_in_any_table() {
        let catalog = Catalog::store_schema();
        let validator = Validator::new(&catalog, true);

        let q = query(
            &["Nome", "Descricao"],
            &[("Categoria", "Produto.Categoria_idCategoria = Categoria.idCategoria")],
            None,
        );
        validator.validate_columns(&q).unwrap();

        let q = query(&["Email"], &[], None);
        let err = validator.validate_columns(&q).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownColumn);
    }

    #[test]
    fn test_qualified_columns_in_predicates() {
        let catalog = Catalog::store_schema();
        let validator = Validator::new(&catalog, true);

        let q = query(&["Produto.Nome"], &[], Some("Produto.Preco > 100"));
        validator.validate_columns(&q).unwrap();

        let q = query(&["Produto.Nome"], &[], Some("Produto.Peso > 100"));
        let err = validator.validate_columns(&q).unwrap_err();
        assert!(err.to_string().contains("Peso"));
        assert!(err.to_string().contains("WHERE"));

        let q = query(&["Produto.Nome"], &[("Categoria", "Produto.x = Categoria.idCategoria")], None);
        let err = validator.validate_columns(&q).unwrap_err();
        assert!(err.to_string().contains("JOIN"));

        let q = query(&["Fornecedor.Nome"], &[], None);
        assert_eq!(
            validator.validate_columns(&q).unwrap_err().kind(),
            ErrorKind::UnknownColumn
        );
    }

    #[test]
    fn test_string_literals_are_not_columns() {
        let catalog = Catalog::store_schema();
        let validator = Validator::new(&catalog, true);

        let q = query(&["Produto.Nome"], &[], Some("Produto.Nome = 'Fake.Column'"));
        validator.validate_columns(&q).unwrap();
    }

    #[test]
    fn test_valid_conditions() {
        let catalog = Catalog::store_schema();
        let validator = Validator::new(&catalog, true);

        for cond in [
            "Produto.Preco > 100",
            "Produto.Preco >= 10 AND Produto.Preco <= 20",
            "Produto.Nome <> 'x' OR Produto.Preco != 3",
            "Produto.Preco * 2 < 50",
        ] {
            validator
                .validate_conditions(&query(&["Nome"], &[], Some(cond)))
                .unwrap();
        }
    }

    #[test]
    fn test_disallowed_operators() {
        for cond in ["a == 1", "a => 1", "a =< 1", "a >< 1"] {
            match condition_error(cond) {
                Error::MalformedCondition { reason, .. } => {
                    assert!(reason.contains("invalid operator"), "{}", cond)
                }
                other => panic!("Expected MalformedCondition, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_dangling_connective() {
        match condition_error("Produto.Preco > 1 AND") {
            Error::MalformedCondition { reason, .. } => assert!(reason.contains("dangling AND")),
            other => panic!("Expected MalformedCondition, got {:?}", other),
        }
        assert_eq!(
            condition_error("Produto.Preco > 1 or").kind(),
            ErrorKind::MalformedCondition
        );
    }

    #[test]
    fn test_atomic_condition_shape() {
        match condition_error("Produto.Preco > 1 AND Produto.Nome") {
            Error::MalformedCondition { fragment, reason } => {
                assert_eq!(fragment, "Produto.Nome");
                assert_eq!(reason, "missing comparison operator");
            }
            other => panic!("Expected MalformedCondition, got {:?}", other),
        }

        match condition_error("Produto.Preco >") {
            Error::MalformedCondition { reason, .. } => assert_eq!(reason, "incomplete expression"),
            other => panic!("Expected MalformedCondition, got {:?}", other),
        }

        match condition_error("a = 1 b = 2") {
            Error::MalformedCondition { reason, .. } => {
                assert!(reason.starts_with("more than one comparison operator"))
            }
            other => panic!("Expected MalformedCondition, got {:?}", other),
        }

        assert_eq!(
            condition_error("AND a = 1").kind(),
            ErrorKind::MalformedCondition
        );
    }

    #[test]
    fn test_or_can_be_disabled() {
        let catalog = Catalog::store_schema();
        let validator = Validator::new(&catalog, false);

        let err = validator
            .validate_conditions(&query(&["Nome"], &[], Some("a = 1 OR b = 2")))
            .unwrap_err();
        assert!(err.to_string().contains("OR is not supported"));
    }

    #[test]
    fn test_join_condition_checked() {
        let catalog = Catalog::store_schema();
        let validator = Validator::new(&catalog, true);

        let q = query(&["Nome"], &[("Categoria", "Produto.Categoria_idCategoria")], None);
        assert_eq!(
            validator.validate_conditions(&q).unwrap_err().kind(),
            ErrorKind::MalformedCondition
        );
    }
}
