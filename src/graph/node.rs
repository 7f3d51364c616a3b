//! Operator graph nodes

use serde::Serialize;
use std::fmt;

/// Operator tag carried by a graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Table,
    Selection,
    Projection,
    Join,
    /// Operator this crate does not produce, kept under its raw name
    Unknown(String),
}

impl OperatorKind {
    /// Algebra symbol, if the operator has one
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            OperatorKind::Selection => Some("σ"),
            OperatorKind::Projection => Some("π"),
            OperatorKind::Join => Some("⋈"),
            OperatorKind::Table | OperatorKind::Unknown(_) => None,
        }
    }

    /// Raw kind name
    pub fn name(&self) -> &str {
        match self {
            OperatorKind::Table => "Table",
            OperatorKind::Selection => "Selection",
            OperatorKind::Projection => "Projection",
            OperatorKind::Join => "Join",
            OperatorKind::Unknown(name) => name,
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of the operator graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorNode {
    /// Preorder position, starting at 0
    pub id: usize,
    pub kind: OperatorKind,
    /// Attribute list, condition or table name
    pub detail: String,
    pub children: Vec<OperatorNode>,
}

impl OperatorNode {
    pub fn new(id: usize, kind: OperatorKind, detail: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            detail: detail.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<OperatorNode>) -> Self {
        self.children = children;
        self
    }

    /// Display label: `π a, b`, `σ cond`, `⋈ cond` or the bare table name
    pub fn label(&self) -> String {
        match (&self.kind, self.kind.symbol()) {
            (_, Some(symbol)) => format!("{} {}", symbol, self.detail),
            (OperatorKind::Table, None) => self.detail.clone(),
            (kind, None) => format!("{} {}", kind, self.detail),
        }
    }

    /// Nodes of this subtree in preorder
    pub fn preorder(&self) -> Vec<&OperatorNode> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.preorder());
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(
            OperatorNode::new(0, OperatorKind::Projection, "A.x, A.y").label(),
            "π A.x, A.y"
        );
        assert_eq!(
            OperatorNode::new(1, OperatorKind::Selection, "A.x > 1").label(),
            "σ A.x > 1"
        );
        assert_eq!(
            OperatorNode::new(2, OperatorKind::Join, "A.id = B.id").label(),
            "⋈ A.id = B.id"
        );
        assert_eq!(OperatorNode::new(3, OperatorKind::Table, "A").label(), "A");
        assert_eq!(
            OperatorNode::new(4, OperatorKind::Unknown("Sort".into()), "A.x").label(),
            "Sort A.x"
        );
    }

    #[test]
    fn test_preorder() {
        let node = OperatorNode::new(0, OperatorKind::Join, "c").with_children(vec![
            OperatorNode::new(1, OperatorKind::Table, "A"),
            OperatorNode::new(2, OperatorKind::Table, "B"),
        ]);

        let ids: Vec<usize> = node.preorder().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(node.children.len(), 2);
        assert!(node.children[0].children.is_empty());
    }
}
