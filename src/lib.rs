//! relopt - A SQL to relational algebra compiler written in Rust
//!
//! This library compiles a restricted `SELECT ... FROM ... JOIN ... ON ...
//! WHERE ...` dialect into an optimized relational algebra tree and an
//! execution plan:
//! - SQL parsing and validation against a schema catalog
//! - Relational algebra trees and their linear rendering
//! - Heuristic optimizer (selection and projection pushdown)
//! - Operator graph and execution planner
//!
//! ```no_run
//! use relopt::catalog::Catalog;
//! use relopt::pipeline::QueryPipeline;
//!
//! let catalog = Catalog::store_schema();
//! let compiled = QueryPipeline::new(&catalog)
//!     .compile("SELECT Produto.Nome FROM Produto WHERE Produto.Preco > 100")?;
//! println!("{}", compiled.plan);
//! # Ok::<(), relopt::Error>(())
//! ```

pub mod algebra;
pub mod catalog;
pub mod error;
pub mod graph;
pub mod optimizer;
pub mod pipeline;
pub mod planner;
pub mod sql;

pub use error::{Error, ErrorKind, Result};
pub use pipeline::{CompiledQuery, PipelineConfig, QueryPipeline};
