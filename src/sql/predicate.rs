//! Token-aware helpers over raw predicate text
//!
//! Predicates travel through the pipeline as strings. These helpers slice
//! them with the lexer so that keywords or dots inside string literals are
//! never mistaken for structure. Input that fails to lex is treated as one
//! opaque predicate without column references.

use super::ast::ColumnRef;
use super::lexer::Lexer;
use super::token::{SpannedToken, Token};

/// Tokens of `text` without the trailing `Eof`, or `None` if it does not lex
fn lex(text: &str) -> Option<Vec<SpannedToken>> {
    let mut tokens = Lexer::new(text).tokenize().ok()?;
    tokens.pop();
    Some(tokens)
}

/// Split a predicate on top-level `AND` into its conjuncts
pub fn split_conjuncts(text: &str) -> Vec<String> {
    let tokens = match lex(text) {
        Some(tokens) => tokens,
        None => return vec![text.trim().to_string()],
    };

    tokens
        .split(|t| t.token == Token::And)
        .filter(|part| !part.is_empty())
        .map(|part| text[part[0].start..part[part.len() - 1].end].to_string())
        .collect()
}

/// Qualified `table.column` references in order of appearance, as written
pub fn column_refs(text: &str) -> Vec<ColumnRef> {
    let tokens = match lex(text) {
        Some(tokens) => tokens,
        None => return Vec::new(),
    };

    tokens
        .windows(3)
        .filter_map(|w| match (&w[0].token, &w[1].token, &w[2].token) {
            (Token::Identifier(table), Token::Dot, Token::Identifier(column)) => {
                Some(ColumnRef::qualified(table.clone(), column.clone()))
            }
            _ => None,
        })
        .collect()
}

/// Attributes referenced by a predicate, rendered as `table.column`
pub fn attributes(text: &str) -> Vec<String> {
    column_refs(text).iter().map(ColumnRef::to_string).collect()
}

/// Column names written without a table qualifier, in order of appearance
pub fn bare_columns(text: &str) -> Vec<String> {
    let tokens = match lex(text) {
        Some(tokens) => tokens,
        None => return Vec::new(),
    };

    tokens
        .iter()
        .enumerate()
        .filter_map(|(i, t)| match &t.token {
            Token::Identifier(name) => {
                let after_dot = i > 0 && tokens[i - 1].token == Token::Dot;
                let before_dot = tokens.get(i + 1).map_or(false, |n| n.token == Token::Dot);
                (!after_dot && !before_dot).then(|| name.clone())
            }
            _ => None,
        })
        .collect()
}

/// Every column a predicate reads: qualified attributes and bare names
pub fn columns(text: &str) -> Vec<String> {
    let mut columns = attributes(text);
    columns.extend(bare_columns(text));
    columns
}

/// Distinct table qualifiers referenced by a predicate.
///
/// Comparison is case-insensitive; the first spelling wins.
pub fn referenced_tables(text: &str) -> Vec<String> {
    let mut tables: Vec<String> = Vec::new();
    for column in column_refs(text) {
        if let Some(table) = column.table {
            if !tables.iter().any(|t| t.eq_ignore_ascii_case(&table)) {
                tables.push(table);
            }
        }
    }
    tables
}

/// Table qualifier of an attribute string (`"T.c"` → `Some("T")`)
pub fn qualifier(attribute: &str) -> Option<&str> {
    attribute
        .split_once('.')
        .map(|(table, _)| table.trim())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_conjuncts() {
        assert_eq!(
            split_conjuncts("Produto.Preco > 100 and Categoria.Descricao = 'x'"),
            vec!["Produto.Preco > 100", "Categoria.Descricao = 'x'"]
        );
        assert_eq!(split_conjuncts("a = 1"), vec!["a = 1"]);
    }

    #[test]
    fn test_split_keeps_or_groups_together() {
        assert_eq!(
            split_conjuncts("A.x = 1 OR A.y = 2 AND B.z = 3"),
            vec!["A.x = 1 OR A.y = 2", "B.z = 3"]
        );
    }

    #[test]
    fn test_split_ignores_and_inside_literal() {
        assert_eq!(
            split_conjuncts("Produto.Nome = 'salt and pepper'"),
            vec!["Produto.Nome = 'salt and pepper'"]
        );
    }

    #[test]
    fn test_attributes() {
        assert_eq!(
            attributes("Produto.Categoria_idCategoria = Categoria.idCategoria"),
            vec!["Produto.Categoria_idCategoria", "Categoria.idCategoria"]
        );
        assert!(attributes("Preco > 10").is_empty());
        assert!(attributes("Nome = 'Produto.Nome'").is_empty());
    }

    #[test]
    fn test_bare_columns() {
        assert_eq!(
            bare_columns("Produto.Preco > 1 OR Descricao = 'x'"),
            vec!["Descricao"]
        );
        assert!(bare_columns("Produto.Preco > Categoria.idCategoria").is_empty());
        assert!(bare_columns("Produto.Nome = 'Preco'").is_empty());
        assert_eq!(
            columns("Preco > Produto.QuantEstoque"),
            vec!["Produto.QuantEstoque", "Preco"]
        );
    }

    #[test]
    fn test_referenced_tables() {
        assert_eq!(
            referenced_tables("A.x = a.y AND B.z > 1"),
            vec!["A".to_string(), "B".to_string()]
        );
    }

    #[test]
    fn test_qualifier() {
        assert_eq!(qualifier("Produto.Nome"), Some("Produto"));
        assert_eq!(qualifier("Nome"), None);
    }

    #[test]
    fn test_unlexable_text_is_opaque() {
        assert_eq!(split_conjuncts(" a @ b "), vec!["a @ b"]);
        assert!(column_refs("A.x @ B.y").is_empty());
    }
}
