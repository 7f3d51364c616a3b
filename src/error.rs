//! Error types for RelOpt
//!
//! This module defines all error types used throughout the query compiler.
//! Query validation failures map onto a fixed taxonomy exposed by [`ErrorKind`].

use std::fmt;
use thiserror::Error;

/// The main error type for RelOpt
#[derive(Error, Debug)]
pub enum Error {
    // ========== Query Errors ==========
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    #[error("Unknown table: '{0}' does not exist in the schema")]
    UnknownTable(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Malformed condition: {reason}: '{fragment}'")]
    MalformedCondition { fragment: String, reason: String },

    // ========== Catalog Errors ==========
    #[error("Catalog error: table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Catalog error: column '{0}' already exists in table '{1}'")]
    ColumnAlreadyExists(String, String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build a malformed condition error for the given fragment
    pub fn malformed_condition(fragment: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedCondition {
            fragment: fragment.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax(_) => ErrorKind::Syntax,
            Error::MalformedQuery(_) => ErrorKind::MalformedQuery,
            Error::UnknownTable(_) => ErrorKind::UnknownTable,
            Error::UnknownColumn(_) => ErrorKind::UnknownColumn,
            Error::MalformedCondition { .. } => ErrorKind::MalformedCondition,
            Error::TableAlreadyExists(_)
            | Error::ColumnAlreadyExists(_, _)
            | Error::CatalogError(_)
            | Error::IoError(_)
            | Error::Serialization(_) => ErrorKind::Catalog,
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// SELECT or FROM missing or misordered
    Syntax,
    /// Clause boundaries outside the supported shape
    MalformedQuery,
    UnknownTable,
    UnknownColumn,
    /// Bad operator, empty operand or dangling connective
    MalformedCondition,
    /// Schema catalog construction or loading failure
    Catalog,
}

impl ErrorKind {
    /// Stable name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::MalformedQuery => "MalformedQueryError",
            ErrorKind::UnknownTable => "UnknownTableError",
            ErrorKind::UnknownColumn => "UnknownColumnError",
            ErrorKind::MalformedCondition => "MalformedConditionError",
            ErrorKind::Catalog => "CatalogError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for RelOpt operations
pub type Result<T> = std::result::Result<T, Error>;
