//! Projection pushdown
//!
//! Demand for attributes flows from the root projection towards the leaves.
//! Each filtered or scanned leaf is narrowed to the attributes its ancestors
//! and its own predicate need. A join whose demand names a column it cannot
//! route to one input keeps its whole subtree unnarrowed.

use crate::algebra::AlgebraExpr;
use crate::sql::predicate;
use std::collections::BTreeSet;
use tracing::warn;

/// Sorted, de-duplicated attribute demand
type Demand = BTreeSet<String>;

/// Apply the pushdown below a root projection; any other shape is returned
/// unchanged
pub(crate) fn push_projections(expr: &AlgebraExpr) -> AlgebraExpr {
    match expr {
        AlgebraExpr::Projection { attributes, input } => {
            let demanded: Demand = attributes.iter().cloned().collect();
            AlgebraExpr::projection(attributes.clone(), push_down(input, demanded))
        }
        _ => expr.clone(),
    }
}

fn push_down(node: &AlgebraExpr, demanded: Demand) -> AlgebraExpr {
    match node {
        AlgebraExpr::Join {
            condition,
            left,
            right,
        } => {
            let mut required = demanded;
            required.extend(predicate::attributes(condition));

            let left_tables = left.tables();
            let right_tables = right.tables();
            let mut left_demand = Demand::new();
            let mut right_demand = Demand::new();

            for attribute in required {
                let side = match predicate::qualifier(&attribute) {
                    Some(table) if contains(&left_tables, table) => &mut left_demand,
                    Some(table) if contains(&right_tables, table) => &mut right_demand,
                    _ => {
                        warn!(%attribute, "attribute matches neither join input; subtree left unnarrowed");
                        return node.clone();
                    }
                };
                side.insert(attribute);
            }

            AlgebraExpr::join(
                condition.clone(),
                push_down(left, left_demand),
                push_down(right, right_demand),
            )
        }
        AlgebraExpr::Selection { condition, input } => {
            let mut combined = demanded;
            combined.extend(predicate::columns(condition));

            let input = match input.as_ref() {
                AlgebraExpr::Table { .. } => input.as_ref().clone(),
                other => push_down(other, combined.clone()),
            };
            narrow(combined, AlgebraExpr::selection(condition.clone(), input))
        }
        AlgebraExpr::Table { .. } => narrow(demanded, node.clone()),
        AlgebraExpr::Projection { .. } => node.clone(),
    }
}

fn narrow(demand: Demand, node: AlgebraExpr) -> AlgebraExpr {
    if demand.is_empty() {
        node
    } else {
        AlgebraExpr::projection(demand, node)
    }
}

fn contains(tables: &[&str], table: &str) -> bool {
    tables.iter().any(|t| t.eq_ignore_ascii_case(table))
}
