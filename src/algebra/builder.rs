//! Algebra Builder
//!
//! This module converts a validated query into its initial, unoptimized
//! relational algebra tree.

use super::expr::AlgebraExpr;
use crate::sql::ParsedQuery;
use tracing::debug;

/// Builds the initial algebra tree for a query
#[derive(Debug, Default, Clone, Copy)]
pub struct AlgebraBuilder;

impl AlgebraBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Left-deep join chain in FROM/JOIN order, then the WHERE selection,
    /// then the SELECT projection
    pub fn build(&self, query: &ParsedQuery) -> AlgebraExpr {
        let base = query.from.first().cloned().unwrap_or_default();

        let mut plan = AlgebraExpr::table(base);
        for join in &query.joins {
            plan = AlgebraExpr::join(
                join.condition.clone(),
                plan,
                AlgebraExpr::table(join.table.clone()),
            );
        }

        if let Some(predicate) = &query.where_clause {
            plan = AlgebraExpr::selection(predicate.clone(), plan);
        }

        let plan = AlgebraExpr::projection(query.select_attributes(), plan);
        debug!(nodes = plan.node_count(), "initial algebra built");
        plan
    }
}
