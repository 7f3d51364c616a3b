//! Selection pushdown
//!
//! Rewrites `Projection(attrs, Selection(cond, joinTree))` so that every
//! conjunct of `cond` that references exactly one table filters that table's
//! leaf directly.

use super::heuristic::UnattributedPredicates;
use crate::algebra::AlgebraExpr;
use crate::sql::predicate;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// A conjunct that could not be pinned to a single leaf
#[derive(Debug)]
struct Residual {
    predicate: String,
    tables: Vec<String>,
}

impl Residual {
    /// Every referenced table is reachable below `node`
    fn covered_by(&self, node: &AlgebraExpr) -> bool {
        !self.tables.is_empty() && self.tables.iter().all(|t| node.contains_table(t))
    }

    /// Some join at or below `node` will take this conjunct
    fn placed_within(&self, node: &AlgebraExpr) -> bool {
        matches!(node, AlgebraExpr::Join { .. }) && self.covered_by(node)
    }
}

/// Conjuncts grouped by the leaf they filter
struct Attribution {
    /// Keyed by lowercased table name, in order of first appearance
    leaves: IndexMap<String, Vec<String>>,
    residuals: Vec<Residual>,
}

impl Attribution {
    fn classify(condition: &str, tree: &AlgebraExpr) -> Self {
        let mut leaves: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut residuals = Vec::new();
        let single_table = tree
            .tables()
            .windows(2)
            .all(|w| w[0].eq_ignore_ascii_case(w[1]));

        for conjunct in predicate::split_conjuncts(condition) {
            // A bare column may belong to any joined table
            let tables = if single_table || predicate::bare_columns(&conjunct).is_empty() {
                predicate::referenced_tables(&conjunct)
            } else {
                Vec::new()
            };
            match tables.as_slice() {
                [table] if tree.contains_table(table) => {
                    leaves
                        .entry(table.to_ascii_lowercase())
                        .or_default()
                        .push(conjunct);
                }
                _ => residuals.push(Residual {
                    predicate: conjunct,
                    tables,
                }),
            }
        }

        Self { leaves, residuals }
    }
}

/// Apply the pushdown; any other shape is returned unchanged
pub(crate) fn push_selections(expr: &AlgebraExpr, policy: UnattributedPredicates) -> AlgebraExpr {
    let (attributes, condition, tree) = match expr {
        AlgebraExpr::Projection { attributes, input } => match input.as_ref() {
            AlgebraExpr::Selection { condition, input } => (attributes, condition, input.as_ref()),
            _ => return expr.clone(),
        },
        _ => return expr.clone(),
    };

    let mut attribution = Attribution::classify(condition, tree);
    debug!(
        leaves = attribution.leaves.len(),
        residuals = attribution.residuals.len(),
        "classified conjuncts"
    );

    if policy == UnattributedPredicates::Drop {
        for residual in attribution.residuals.drain(..) {
            warn!(predicate = %residual.predicate, "dropping predicate not attributable to a single table");
        }
    }

    let rewritten = rewrite(tree, &attribution);

    let above: Vec<&str> = attribution
        .residuals
        .iter()
        .filter(|r| !r.placed_within(tree))
        .map(|r| r.predicate.as_str())
        .collect();

    AlgebraExpr::projection(attributes.clone(), wrap(rewritten, &above))
}

/// Rebuild the join tree, filtering leaves and placing residuals at the
/// lowest join that covers them
fn rewrite(node: &AlgebraExpr, attribution: &Attribution) -> AlgebraExpr {
    match node {
        AlgebraExpr::Table { name } => {
            let group = attribution
                .leaves
                .get(&name.to_ascii_lowercase())
                .map(|g| g.iter().map(String::as_str).collect::<Vec<_>>())
                .unwrap_or_default();
            wrap(node.clone(), &group)
        }
        AlgebraExpr::Join {
            condition,
            left,
            right,
        } => {
            let join = AlgebraExpr::join(
                condition.clone(),
                rewrite(left, attribution),
                rewrite(right, attribution),
            );

            let here: Vec<&str> = attribution
                .residuals
                .iter()
                .filter(|r| r.covered_by(node) && !r.placed_within(left) && !r.placed_within(right))
                .map(|r| r.predicate.as_str())
                .collect();
            wrap(join, &here)
        }
        _ => node.clone(),
    }
}

fn wrap(node: AlgebraExpr, conjuncts: &[&str]) -> AlgebraExpr {
    if conjuncts.is_empty() {
        node
    } else {
        AlgebraExpr::selection(conjuncts.join(" AND "), node)
    }
}
