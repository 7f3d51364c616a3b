//! Heuristic optimizer
//!
//! Two rewrite passes over an algebra tree: selection pushdown followed by
//! projection pushdown. Both passes are pure and can be called on their own.

use super::{projection_pushdown, selection_pushdown};
use crate::algebra::AlgebraExpr;
use tracing::debug;

/// What selection pushdown does with a conjunct it cannot pin to one table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnattributedPredicates {
    /// Keep it as a filter at the lowest join covering its tables
    #[default]
    Retain,
    /// Discard it with a warning
    Drop,
}

/// Optimizer configuration
#[derive(Debug, Clone, Default)]
pub struct OptimizerConfig {
    pub unattributed_predicates: UnattributedPredicates,
}

impl OptimizerConfig {
    /// Create a new optimizer config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for conjuncts that reference no single table
    pub fn unattributed_predicates(mut self, policy: UnattributedPredicates) -> Self {
        self.unattributed_predicates = policy;
        self
    }
}

/// Heuristic-based query optimizer
#[derive(Debug, Clone, Default)]
pub struct HeuristicOptimizer {
    config: OptimizerConfig,
}

impl HeuristicOptimizer {
    /// Create a new optimizer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Move WHERE conjuncts down onto the table leaves they filter.
    ///
    /// Only applies to `Projection(attrs, Selection(cond, joinTree))`.
    pub fn push_selections(&self, expr: &AlgebraExpr) -> AlgebraExpr {
        selection_pushdown::push_selections(expr, self.config.unattributed_predicates)
    }

    /// Narrow every leaf to the attributes needed above it
    pub fn push_projections(&self, expr: &AlgebraExpr) -> AlgebraExpr {
        projection_pushdown::push_projections(expr)
    }

    /// Selection pushdown, then projection pushdown
    pub fn optimize(&self, expr: &AlgebraExpr) -> AlgebraExpr {
        let selected = self.push_selections(expr);
        let optimized = self.push_projections(&selected);
        debug!(
            before = expr.node_count(),
            after = optimized.node_count(),
            "optimized algebra"
        );
        optimized
    }
}
