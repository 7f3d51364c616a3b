//! Parsed query structures
//!
//! The supported dialect keeps predicates as raw text: the parser validates
//! them but later stages only slice and regroup the strings.

use serde::Serialize;
use std::fmt;

/// A validated single-statement query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    /// Select list, in order
    pub select: Vec<ColumnRef>,
    /// Base tables; the dialect admits exactly one
    pub from: Vec<String>,
    /// JOIN clauses, in order
    pub joins: Vec<JoinClause>,
    /// WHERE predicate
    #[serde(rename = "where")]
    pub where_clause: Option<String>,
}

impl ParsedQuery {
    /// All tables the query reads, FROM first then JOINs in order
    pub fn tables(&self) -> Vec<&str> {
        self.from
            .iter()
            .map(String::as_str)
            .chain(self.joins.iter().map(|j| j.table.as_str()))
            .collect()
    }

    /// Select list rendered as attribute strings
    pub fn select_attributes(&self) -> Vec<String> {
        self.select.iter().map(ColumnRef::to_string).collect()
    }
}

/// Column reference, bare or qualified with a table name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnRef {
    /// Optional table qualifier
    pub table: Option<String>,
    /// Column name
    pub column: String,
}

impl ColumnRef {
    /// Create an unqualified column reference
    pub fn bare(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    /// Create a `table.column` reference
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(s: &str) -> Self {
        match s.split_once('.') {
            Some((table, column)) => ColumnRef::qualified(table.trim(), column.trim()),
            None => ColumnRef::bare(s.trim()),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

/// JOIN clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinClause {
    /// Table to join
    pub table: String,
    /// Join condition
    pub condition: String,
}

impl JoinClause {
    pub fn new(table: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            condition: condition.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref_display() {
        assert_eq!(ColumnRef::bare("Nome").to_string(), "Nome");
        assert_eq!(
            ColumnRef::qualified("Produto", "Nome").to_string(),
            "Produto.Nome"
        );
        assert_eq!(
            ColumnRef::from("Produto.Nome"),
            ColumnRef::qualified("Produto", "Nome")
        );
    }

    #[test]
    fn test_tables_in_order() {
        let query = ParsedQuery {
            select: vec![ColumnRef::bare("Nome")],
            from: vec!["Produto".to_string()],
            joins: vec![JoinClause::new(
                "Categoria",
                "Produto.Categoria_idCategoria = Categoria.idCategoria",
            )],
            where_clause: None,
        };

        assert_eq!(query.tables(), vec!["Produto", "Categoria"]);
        assert_eq!(query.select_attributes(), vec!["Nome".to_string()]);
    }
}
