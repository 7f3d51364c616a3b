//! Schema definitions for RelOpt
//!
//! This module defines table metadata: column names, primary keys and
//! foreign-key relations. Column types are not modeled; the optimizer only
//! reasons about names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Foreign-key relation from a column to a column of another table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referencing column
    pub column: String,
    /// Referenced table
    pub ref_table: String,
    /// Referenced column
    pub ref_column: String,
}

impl ForeignKey {
    /// Create a new foreign key
    pub fn new(
        column: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            ref_table: ref_table.into(),
            ref_column: ref_column.into(),
        }
    }
}

/// Table definition - full table metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    /// Table name
    pub name: String,
    /// Ordered column names
    pub columns: Vec<String>,
    /// Primary key column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    /// Outgoing foreign keys
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableDef {
    /// Create a new table definition without columns
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
        }
    }

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get a column name as declared, matched case-insensitively
    pub fn get_column(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// Check if column exists (case-insensitive)
    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the foreign key declared on a column, if any
    pub fn foreign_key(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.column.eq_ignore_ascii_case(column))
    }
}

/// A join relation derived from a foreign key:
/// `table.column` references `ref_table.ref_column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinPath {
    pub table: String,
    pub column: String,
    pub ref_table: String,
    pub ref_column: String,
}

impl JoinPath {
    /// Equality predicate joining the two tables
    pub fn condition(&self) -> String {
        format!(
            "{}.{} = {}.{}",
            self.table, self.column, self.ref_table, self.ref_column
        )
    }
}

impl fmt::Display for JoinPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.condition())
    }
}
