//! Query optimizer
//!
//! Rule-based rewrites of relational algebra trees.

mod heuristic;
mod projection_pushdown;
mod selection_pushdown;

pub use heuristic::{HeuristicOptimizer, OptimizerConfig, UnattributedPredicates};
