//! Relational algebra module
//!
//! This module contains the algebra tree and the builder that produces the
//! initial tree from a parsed query.

pub mod builder;
pub mod expr;

pub use builder::AlgebraBuilder;
pub use expr::AlgebraExpr;
