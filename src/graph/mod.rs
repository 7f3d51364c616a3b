//! Operator graph
//!
//! A generic labeled tree decoupled from the algebra variants, consumed by
//! the execution planner and by renderers.

pub mod builder;
pub mod graph;
pub mod node;

pub use builder::GraphBuilder;
pub use graph::OperatorGraph;
pub use node::{OperatorKind, OperatorNode};
