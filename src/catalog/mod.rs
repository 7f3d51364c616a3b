//! Catalog module
//!
//! This module contains the schema catalog the parser validates against.

pub mod catalog;
pub mod schema;

pub use catalog::{Catalog, SchemaCatalog, TableBuilder};
pub use schema::{ForeignKey, JoinPath, TableDef};
