//! Execution Planner
//!
//! Walks an operator graph in postorder and numbers each node as a step, so
//! that executing steps in ascending order always finds its inputs ready.

use super::plan::{ExecutionPlan, ExecutionStep};
use crate::graph::{OperatorGraph, OperatorKind, OperatorNode};
use tracing::trace;

#[derive(Debug, Default, Clone, Copy)]
pub struct ExecutionPlanner;

impl ExecutionPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(&self, graph: &OperatorGraph) -> ExecutionPlan {
        let mut plan = ExecutionPlan::new();
        Self::visit(&graph.root, 1, &mut plan);
        plan
    }

    /// Emit the subtree's steps; returns the node's step number and the next
    /// free one
    fn visit(node: &OperatorNode, next: usize, plan: &mut ExecutionPlan) -> (usize, usize) {
        let mut next = next;
        let mut dependencies = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let (step_number, after) = Self::visit(child, next, plan);
            dependencies.push(step_number);
            next = after;
        }

        let step = ExecutionStep {
            step_number: next,
            operation: operation_label(&node.kind).to_string(),
            detail: node.detail.clone(),
            dependencies,
            node_id: node.id,
        };
        trace!(step = %step, "planned");
        plan.steps.push(step);

        (next, next + 1)
    }
}

fn operation_label(kind: &OperatorKind) -> &str {
    match kind {
        OperatorKind::Table => "table scan",
        OperatorKind::Selection => "apply filter",
        OperatorKind::Projection => "apply projection",
        OperatorKind::Join => "execute join",
        OperatorKind::Unknown(name) => name,
    }
}
