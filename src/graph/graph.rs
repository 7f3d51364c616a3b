//! Operator graph and its text renderings

use super::node::{OperatorKind, OperatorNode};
use serde::Serialize;
use std::fmt;

/// Generic labeled tree mirroring an algebra tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorGraph {
    pub root: OperatorNode,
}

impl OperatorGraph {
    pub fn new(root: OperatorNode) -> Self {
        Self { root }
    }

    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// All nodes in preorder, which is also id order for built graphs
    pub fn nodes(&self) -> Vec<&OperatorNode> {
        self.root.preorder()
    }

    pub fn find(&self, id: usize) -> Option<&OperatorNode> {
        self.nodes().into_iter().find(|n| n.id == id)
    }

    /// Graphviz DOT source, top to bottom, edges from parent to child
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph query {\n");
        dot.push_str("  rankdir=TB;\n");
        dot.push_str("  node [shape=box, style=\"rounded,filled\", fontname=\"Arial\"];\n");
        for node in self.nodes() {
            dot.push_str(&format!(
                "  node_{} [label=\"{}\", fillcolor=\"{}\"];\n",
                node.id,
                dot_label(node),
                fill_color(&node.kind)
            ));
            for child in &node.children {
                dot.push_str(&format!("  node_{} -> node_{};\n", node.id, child.id));
            }
        }
        dot.push_str("}\n");
        dot
    }

    fn fmt_node(
        f: &mut fmt::Formatter<'_>,
        node: &OperatorNode,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let connector = if is_last { "└─ " } else { "├─ " };
        writeln!(f, "{prefix}{connector}[{}] {}", node.id, node.label())?;

        let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });
        for (i, child) in node.children.iter().enumerate() {
            Self::fmt_node(f, child, &child_prefix, i == node.children.len() - 1)?;
        }
        Ok(())
    }
}

fn dot_label(node: &OperatorNode) -> String {
    let text = match node.kind.symbol() {
        Some(symbol) => format!("{}\\n{}", symbol, node.detail),
        None if node.kind == OperatorKind::Table => node.detail.clone(),
        None => format!("{}\\n{}", node.kind, node.detail),
    };
    text.replace('"', "\\\"")
}

fn fill_color(kind: &OperatorKind) -> &'static str {
    match kind {
        OperatorKind::Projection => "#E3F2FD",
        OperatorKind::Selection => "#FFF3E0",
        OperatorKind::Join => "#F3E5F5",
        OperatorKind::Table => "#E8F5E9",
        OperatorKind::Unknown(_) => "#F5F5F5",
    }
}

impl fmt::Display for OperatorGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.root.id, self.root.label())?;
        let children = &self.root.children;
        for (i, child) in children.iter().enumerate() {
            Self::fmt_node(f, child, "", i == children.len() - 1)?;
        }
        Ok(())
    }
}
