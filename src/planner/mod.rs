//! Execution planning
//!
//! Turns an operator graph into a dependency-ordered list of steps.

pub mod plan;
pub mod planner;

pub use plan::{ExecutionPlan, ExecutionStep};
pub use planner::ExecutionPlanner;
