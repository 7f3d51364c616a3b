//! Execution plan types

use serde::Serialize;
use std::fmt;

/// One scheduled operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionStep {
    /// 1-based position in the schedule
    pub step_number: usize,
    pub operation: String,
    pub detail: String,
    /// Step numbers of the node's immediate children
    pub dependencies: Vec<usize>,
    /// Graph node this step executes
    pub node_id: usize,
}

impl fmt::Display for ExecutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: {} - {}", self.step_number, self.operation, self.detail)?;
        if !self.dependencies.is_empty() {
            let deps: Vec<String> = self.dependencies.iter().map(usize::to_string).collect();
            write!(f, " (depends on: {})", deps.join(", "))?;
        }
        Ok(())
    }
}

/// Steps in execution order, leaves first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    pub steps: Vec<ExecutionStep>,
}

impl ExecutionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, step_number: usize) -> Option<&ExecutionStep> {
        self.steps.iter().find(|s| s.step_number == step_number)
    }

    /// The step that produces the query result
    pub fn final_step(&self) -> Option<&ExecutionStep> {
        self.steps.last()
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "EXECUTION PLAN")?;
        writeln!(f, "{}", "=".repeat(80))?;
        writeln!(f)?;
        writeln!(f, "Execution order (sequential, leaves to root):")?;
        writeln!(f)?;
        for step in &self.steps {
            writeln!(f, "{}", step)?;
        }
        Ok(())
    }
}
