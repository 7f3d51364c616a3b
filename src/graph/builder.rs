//! Operator graph builder
//!
//! Translates an algebra tree one-to-one into an [`OperatorGraph`], handing
//! out ids in depth-first preorder.

use super::graph::OperatorGraph;
use super::node::{OperatorKind, OperatorNode};
use crate::algebra::AlgebraExpr;
use tracing::trace;

#[derive(Debug, Default, Clone, Copy)]
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, expr: &AlgebraExpr) -> OperatorGraph {
        let (root, _) = Self::build_node(expr, 0);
        OperatorGraph::new(root)
    }

    /// Returns the node and the next unused id
    fn build_node(expr: &AlgebraExpr, id: usize) -> (OperatorNode, usize) {
        let (kind, detail, inputs): (OperatorKind, String, Vec<&AlgebraExpr>) = match expr {
            AlgebraExpr::Projection { attributes, input } => {
                (OperatorKind::Projection, attributes.join(", "), vec![input.as_ref()])
            }
            AlgebraExpr::Selection { condition, input } => {
                (OperatorKind::Selection, condition.clone(), vec![input.as_ref()])
            }
            AlgebraExpr::Join {
                condition,
                left,
                right,
            } => (OperatorKind::Join, condition.clone(), vec![left.as_ref(), right.as_ref()]),
            AlgebraExpr::Table { name } => (OperatorKind::Table, name.clone(), Vec::new()),
        };
        trace!(id, %kind, %detail, "graph node");

        let mut next = id + 1;
        let mut children = Vec::with_capacity(inputs.len());
        for input in inputs {
            let (child, after) = Self::build_node(input, next);
            children.push(child);
            next = after;
        }

        (OperatorNode::new(id, kind, detail).with_children(children), next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn optimized_scenario() -> AlgebraExpr {
        AlgebraExpr::projection(
            ["Produto.Nome", "Categoria.Descricao"],
            AlgebraExpr::join(
                "Produto.Categoria_idCategoria = Categoria.idCategoria",
                AlgebraExpr::projection(
                    ["Produto.Categoria_idCategoria", "Produto.Nome", "Produto.Preco"],
                    AlgebraExpr::selection("Produto.Preco > 100", AlgebraExpr::table("Produto")),
                ),
                AlgebraExpr::projection(
                    ["Categoria.Descricao", "Categoria.idCategoria"],
                    AlgebraExpr::table("Categoria"),
                ),
            ),
        )
    }

    #[test]
    fn test_build_scenario() {
        let graph = GraphBuilder::new().build(&optimized_scenario());

        let shape: Vec<(usize, OperatorKind, &str)> = graph
            .nodes()
            .iter()
            .map(|n| (n.id, n.kind.clone(), n.detail.as_str()))
            .collect();

        assert_eq!(
            shape,
            vec![
                (0, OperatorKind::Projection, "Produto.Nome, Categoria.Descricao"),
                (
                    1,
                    OperatorKind::Join,
                    "Produto.Categoria_idCategoria = Categoria.idCategoria"
                ),
                (
                    2,
                    OperatorKind::Projection,
                    "Produto.Categoria_idCategoria, Produto.Nome, Produto.Preco"
                ),
                (3, OperatorKind::Selection, "Produto.Preco > 100"),
                (4, OperatorKind::Table, "Produto"),
                (5, OperatorKind::Projection, "Categoria.Descricao, Categoria.idCategoria"),
                (6, OperatorKind::Table, "Categoria"),
            ]
        );
    }

    #[test]
    fn test_node_count_matches_algebra() {
        let expr = optimized_scenario();
        let graph = GraphBuilder::new().build(&expr);
        assert_eq!(graph.node_count(), expr.node_count());
    }

    #[test]
    fn test_join_children_left_then_right() {
        let graph = GraphBuilder::new().build(&AlgebraExpr::join(
            "A.id = B.id",
            AlgebraExpr::table("A"),
            AlgebraExpr::table("B"),
        ));

        let details: Vec<&str> = graph.root.children.iter().map(|c| c.detail.as_str()).collect();
        assert_eq!(details, vec!["A", "B"]);
    }
}
