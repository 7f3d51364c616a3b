//! Relational algebra expressions
//!
//! A closed tree of the four operators the dialect compiles to. Trees are
//! immutable values: every rewrite builds new nodes.

use crate::sql::predicate;
use serde::Serialize;
use std::fmt;

/// Indentation added per nesting level in the linear rendering
const INDENT: &str = "  ";

/// Relational algebra expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AlgebraExpr {
    /// Base relation
    Table { name: String },
    /// σ: filter rows by a predicate
    Selection {
        condition: String,
        input: Box<AlgebraExpr>,
    },
    /// π: restrict columns
    Projection {
        attributes: Vec<String>,
        input: Box<AlgebraExpr>,
    },
    /// ⋈: combine two inputs on a predicate
    Join {
        condition: String,
        left: Box<AlgebraExpr>,
        right: Box<AlgebraExpr>,
    },
}

impl AlgebraExpr {
    pub fn table(name: impl Into<String>) -> Self {
        AlgebraExpr::Table { name: name.into() }
    }

    pub fn selection(condition: impl Into<String>, input: AlgebraExpr) -> Self {
        AlgebraExpr::Selection {
            condition: condition.into(),
            input: Box::new(input),
        }
    }

    pub fn projection<S: Into<String>>(
        attributes: impl IntoIterator<Item = S>,
        input: AlgebraExpr,
    ) -> Self {
        AlgebraExpr::Projection {
            attributes: attributes.into_iter().map(Into::into).collect(),
            input: Box::new(input),
        }
    }

    pub fn join(condition: impl Into<String>, left: AlgebraExpr, right: AlgebraExpr) -> Self {
        AlgebraExpr::Join {
            condition: condition.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Base table names reachable from this node, left to right
    pub fn tables(&self) -> Vec<&str> {
        let mut tables = Vec::new();
        self.collect_tables(&mut tables);
        tables
    }

    fn collect_tables<'a>(&'a self, tables: &mut Vec<&'a str>) {
        match self {
            AlgebraExpr::Table { name } => tables.push(name),
            AlgebraExpr::Selection { input, .. } | AlgebraExpr::Projection { input, .. } => {
                input.collect_tables(tables)
            }
            AlgebraExpr::Join { left, right, .. } => {
                left.collect_tables(tables);
                right.collect_tables(tables);
            }
        }
    }

    /// Whether a base table with this name (case-insensitive) is reachable
    pub fn contains_table(&self, name: &str) -> bool {
        self.tables().iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    /// Number of operator nodes in the tree
    pub fn node_count(&self) -> usize {
        match self {
            AlgebraExpr::Table { .. } => 1,
            AlgebraExpr::Selection { input, .. } | AlgebraExpr::Projection { input, .. } => {
                1 + input.node_count()
            }
            AlgebraExpr::Join { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    /// Render in the indented linear notation
    pub fn to_linear_string(&self) -> String {
        let mut out = String::new();
        self.write_linear(&mut out, 0);
        out
    }

    fn write_linear(&self, out: &mut String, depth: usize) {
        let indent = INDENT.repeat(depth);
        match self {
            AlgebraExpr::Table { name } => {
                out.push_str(&indent);
                out.push_str(name);
            }
            AlgebraExpr::Projection { attributes, input } => {
                out.push_str(&format!("{}π {} (\n", indent, attributes.join(", ")));
                input.write_linear(out, depth + 1);
                out.push_str(&format!("\n{})", indent));
            }
            AlgebraExpr::Selection { condition, input } => {
                let condition = predicate::split_conjuncts(condition).join(" ^ ");
                out.push_str(&format!("{}σ {} (\n", indent, condition));
                input.write_linear(out, depth + 1);
                out.push_str(&format!("\n{})", indent));
            }
            AlgebraExpr::Join {
                condition,
                left,
                right,
            } => {
                out.push_str(&format!("{}(\n", indent));
                left.write_linear(out, depth + 1);
                out.push_str(&format!("\n{}{}⋈ {}\n", indent, INDENT, condition));
                right.write_linear(out, depth + 1);
                out.push_str(&format!("\n{})", indent));
            }
        }
    }
}

impl fmt::Display for AlgebraExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_linear_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AlgebraExpr {
        AlgebraExpr::projection(
            ["Produto.Nome", "Categoria.Descricao"],
            AlgebraExpr::selection(
                "Produto.Preco > 100 and Produto.Preco < 500",
                AlgebraExpr::join(
                    "Produto.Categoria_idCategoria = Categoria.idCategoria",
                    AlgebraExpr::table("Produto"),
                    AlgebraExpr::table("Categoria"),
                ),
            ),
        )
    }

    #[test]
    fn test_tables_and_node_count() {
        let expr = sample();
        assert_eq!(expr.tables(), vec!["Produto", "Categoria"]);
        assert!(expr.contains_table("categoria"));
        assert!(!expr.contains_table("Cliente"));
        assert_eq!(expr.node_count(), 5);
    }

    #[test]
    fn test_linear_rendering() {
        let expected = "π Produto.Nome, Categoria.Descricao (\n\
                        \x20 σ Produto.Preco > 100 ^ Produto.Preco < 500 (\n\
                        \x20   (\n\
                        \x20     Produto\n\
                        \x20     ⋈ Produto.Categoria_idCategoria = Categoria.idCategoria\n\
                        \x20     Categoria\n\
                        \x20   )\n\
                        \x20 )\n\
                        )";
        assert_eq!(sample().to_linear_string(), expected);
    }

    #[test]
    fn test_literal_text_not_rewritten() {
        let expr = AlgebraExpr::selection(
            "Produto.Nome = 'salt and pepper' AND Produto.Preco < 5",
            AlgebraExpr::table("Produto"),
        );
        assert_eq!(
            expr.to_linear_string(),
            "σ Produto.Nome = 'salt and pepper' ^ Produto.Preco < 5 (\n  Produto\n)"
        );
    }

    #[test]
    fn test_table_renders_bare() {
        assert_eq!(AlgebraExpr::table("Produto").to_string(), "Produto");
    }
}
