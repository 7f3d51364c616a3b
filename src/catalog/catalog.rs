//! System Catalog for RelOpt
//!
//! This module holds the table/column/foreign-key metadata the parser
//! validates queries against. The query pipeline only sees it through the
//! read-only [`SchemaCatalog`] trait.

use super::schema::{ForeignKey, JoinPath, TableDef};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::path::Path;
use tracing::debug;

/// Read-only view of a relational schema.
///
/// All name lookups are case-insensitive.
pub trait SchemaCatalog {
    /// Resolve a table name to its declared spelling
    fn canonical_table_name(&self, name: &str) -> Option<&str>;

    /// Columns of a table, in declaration order
    fn columns_of(&self, table: &str) -> Option<&[String]>;

    /// Foreign keys declared on a table (empty for unknown tables)
    fn foreign_keys_of(&self, table: &str) -> &[ForeignKey];

    fn table_exists(&self, name: &str) -> bool {
        self.canonical_table_name(name).is_some()
    }

    fn column_exists(&self, table: &str, column: &str) -> bool {
        self.columns_of(table)
            .map(|cols| cols.iter().any(|c| c.eq_ignore_ascii_case(column)))
            .unwrap_or(false)
    }

    /// Find a direct or inverse foreign-key relation between two tables
    fn find_join_path(&self, table1: &str, table2: &str) -> Option<JoinPath> {
        let t1 = self.canonical_table_name(table1)?;
        let t2 = self.canonical_table_name(table2)?;

        let direct = self
            .foreign_keys_of(t1)
            .iter()
            .find(|fk| fk.ref_table.eq_ignore_ascii_case(t2))
            .map(|fk| JoinPath {
                table: t1.to_string(),
                column: fk.column.clone(),
                ref_table: t2.to_string(),
                ref_column: fk.ref_column.clone(),
            });
        if direct.is_some() {
            return direct;
        }

        self.foreign_keys_of(t2)
            .iter()
            .find(|fk| fk.ref_table.eq_ignore_ascii_case(t1))
            .map(|fk| JoinPath {
                table: t2.to_string(),
                column: fk.column.clone(),
                ref_table: t1.to_string(),
                ref_column: fk.ref_column.clone(),
            })
    }
}

/// System Catalog - manages all schema metadata
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Table definitions keyed by lowercase name, in creation order
    tables: IndexMap<String, TableDef>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            tables: IndexMap::new(),
        }
    }

    /// Create a new table
    pub fn create_table(&mut self, table: TableDef) -> Result<&TableDef> {
        let key = table.name.to_lowercase();
        if self.tables.contains_key(&key) {
            return Err(Error::TableAlreadyExists(table.name));
        }

        for (i, col) in table.columns.iter().enumerate() {
            if table.columns[..i].iter().any(|c| c.eq_ignore_ascii_case(col)) {
                return Err(Error::ColumnAlreadyExists(col.clone(), table.name.clone()));
            }
        }
        if let Some(pk) = &table.primary_key {
            if !table.has_column(pk) {
                return Err(Error::CatalogError(format!(
                    "primary key '{}' is not a column of table '{}'",
                    pk, table.name
                )));
            }
        }
        for fk in &table.foreign_keys {
            if !table.has_column(&fk.column) {
                return Err(Error::CatalogError(format!(
                    "foreign key column '{}' is not a column of table '{}'",
                    fk.column, table.name
                )));
            }
        }

        debug!(table = %table.name, columns = table.columns.len(), "table registered");
        Ok(self.tables.entry(key).or_insert(table))
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(&name.to_lowercase())
    }

    /// List all table names
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.values().map(|t| t.name.as_str()).collect()
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Check that every foreign key points at an existing table and column
    pub fn check_foreign_keys(&self) -> Result<()> {
        for table in self.tables.values() {
            for fk in &table.foreign_keys {
                if !self.column_exists(&fk.ref_table, &fk.ref_column) {
                    return Err(Error::CatalogError(format!(
                        "foreign key {}.{} references unknown column {}.{}",
                        table.name, fk.column, fk.ref_table, fk.ref_column
                    )));
                }
            }
        }
        Ok(())
    }

    /// Get table schema info as a formatted string (for .schema command)
    pub fn get_table_info(&self, name: &str) -> Result<String> {
        let table = self
            .get_table(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))?;
        let mut info = format!("Table: {}\n", table.name());
        info.push_str("Columns:\n");

        for col in table.columns() {
            let mut flags = Vec::new();
            if table
                .primary_key
                .as_deref()
                .map_or(false, |pk| pk.eq_ignore_ascii_case(col))
            {
                flags.push("PRIMARY KEY".to_string());
            }
            if let Some(fk) = table.foreign_key(col) {
                flags.push(format!("REFERENCES {}({})", fk.ref_table, fk.ref_column));
            }

            let flags_str = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };

            info.push_str(&format!("  {}{}\n", col, flags_str));
        }

        Ok(info)
    }

    /// Parse a catalog from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        let data: CatalogData = serde_json::from_str(json)?;

        let mut catalog = Self::new();
        for table in data.tables {
            catalog.create_table(table)?;
        }
        catalog.check_foreign_keys()?;

        Ok(catalog)
    }

    /// Serialize the catalog to JSON
    pub fn to_json(&self) -> Result<String> {
        let data = CatalogData {
            tables: self.tables.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Save catalog to disk
    pub fn save_to_disk(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load catalog from disk
    pub fn load_from_disk(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The built-in store schema (products, customers and orders)
    pub fn store_schema() -> Self {
        let tables = vec![
            TableBuilder::new("Categoria")
                .primary_key("idCategoria")
                .column("Descricao")
                .finish(),
            TableBuilder::new("Produto")
                .primary_key("idProduto")
                .column("Nome")
                .column("Descricao")
                .column("Preco")
                .column("QuantEstoque")
                .foreign_key("Categoria_idCategoria", "Categoria", "idCategoria")
                .finish(),
            TableBuilder::new("TipoCliente")
                .primary_key("idTipoCliente")
                .column("Descricao")
                .finish(),
            TableBuilder::new("Cliente")
                .primary_key("idCliente")
                .column("Nome")
                .column("Email")
                .column("Nascimento")
                .column("Senha")
                .foreign_key("TipoCliente_idTipoCliente", "TipoCliente", "idTipoCliente")
                .column("DataRegistro")
                .finish(),
            TableBuilder::new("TipoEndereco")
                .primary_key("idTipoEndereco")
                .column("Descricao")
                .finish(),
            TableBuilder::new("Endereco")
                .primary_key("idEndereco")
                .column("EnderecoPadrao")
                .column("Logradouro")
                .column("Numero")
                .column("Complemento")
                .column("Bairro")
                .column("Cidade")
                .column("UF")
                .column("CEP")
                .foreign_key("TipoEndereco_idTipoEndereco", "TipoEndereco", "idTipoEndereco")
                .foreign_key("Cliente_idCliente", "Cliente", "idCliente")
                .finish(),
            TableBuilder::new("Telefone")
                .primary_key("Numero")
                .foreign_key("Cliente_idCliente", "Cliente", "idCliente")
                .finish(),
            TableBuilder::new("Status")
                .primary_key("idStatus")
                .column("Descricao")
                .finish(),
            TableBuilder::new("Pedido")
                .primary_key("idPedido")
                .foreign_key("Status_idStatus", "Status", "idStatus")
                .column("DataPedido")
                .column("ValorTotalPedido")
                .foreign_key("Cliente_idCliente", "Cliente", "idCliente")
                .finish(),
            TableBuilder::new("Pedido_has_Produto")
                .primary_key("idPedidoProduto")
                .foreign_key("Pedido_idPedido", "Pedido", "idPedido")
                .foreign_key("Produto_idProduto", "Produto", "idProduto")
                .column("Quantidade")
                .column("PrecoUnitario")
                .finish(),
        ];

        let mut catalog = Self::new();
        for table in tables {
            catalog.tables.insert(table.name.to_lowercase(), table);
        }
        catalog
    }
}

impl SchemaCatalog for Catalog {
    fn canonical_table_name(&self, name: &str) -> Option<&str> {
        self.get_table(name).map(TableDef::name)
    }

    fn columns_of(&self, table: &str) -> Option<&[String]> {
        self.get_table(table).map(TableDef::columns)
    }

    fn foreign_keys_of(&self, table: &str) -> &[ForeignKey] {
        self.get_table(table)
            .map(|t| t.foreign_keys.as_slice())
            .unwrap_or(&[])
    }
}

/// Serializable proxy for Catalog
#[derive(serde::Serialize, serde::Deserialize)]
struct CatalogData {
    tables: Vec<TableDef>,
}

/// Builder for creating tables with a fluent API
pub struct TableBuilder {
    table: TableDef,
}

impl TableBuilder {
    /// Start building a new table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: TableDef::new(name),
        }
    }

    /// Add a column
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.table.columns.push(name.into());
        self
    }

    /// Add the primary key column
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.table.primary_key = Some(name.clone());
        self.table.columns.push(name);
        self
    }

    /// Add a column referencing another table
    pub fn foreign_key(
        mut self,
        name: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.table
            .foreign_keys
            .push(ForeignKey::new(name.clone(), ref_table, ref_column));
        self.table.columns.push(name);
        self
    }

    /// Finish without registering anywhere
    pub fn finish(self) -> TableDef {
        self.table
    }

    /// Build the table in the catalog
    pub fn build(self, catalog: &mut Catalog) -> Result<&TableDef> {
        catalog.create_table(self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get_table() {
        let mut catalog = Catalog::new();

        let table = TableBuilder::new("users")
            .primary_key("id")
            .column("name")
            .build(&mut catalog)
            .unwrap();
        assert_eq!(table.name(), "users");
        assert_eq!(table.column_count(), 2);

        let retrieved = catalog.get_table("USERS").unwrap();
        assert_eq!(retrieved.name(), "users");
        assert_eq!(catalog.canonical_table_name("Users"), Some("users"));
    }

    #[test]
    fn test_table_already_exists() {
        let mut catalog = Catalog::new();
        catalog.create_table(TableDef::new("test")).unwrap();

        let result = catalog.create_table(TableDef::new("TEST"));
        assert!(matches!(result, Err(Error::TableAlreadyExists(_))));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut catalog = Catalog::new();
        let result = TableBuilder::new("t")
            .column("a")
            .column("A")
            .build(&mut catalog);
        assert!(matches!(result, Err(Error::ColumnAlreadyExists(_, _))));
    }

    #[test]
    fn test_column_exists_case_insensitive() {
        let catalog = Catalog::store_schema();

        assert!(catalog.table_exists("produto"));
        assert!(catalog.column_exists("PRODUTO", "preco"));
        assert!(!catalog.column_exists("Produto", "Email"));
        assert!(!catalog.column_exists("NoSuchTable", "Nome"));
        assert_eq!(catalog.columns_of("Categoria").unwrap().len(), 2);
        assert!(catalog.columns_of("NoSuchTable").is_none());
    }

    #[test]
    fn test_foreign_keys_of() {
        let catalog = Catalog::store_schema();

        let fks = catalog.foreign_keys_of("Endereco");
        assert_eq!(fks.len(), 2);
        assert_eq!(fks[1].ref_table, "Cliente");
        assert!(catalog.foreign_keys_of("Categoria").is_empty());
        assert!(catalog.foreign_keys_of("NoSuchTable").is_empty());
    }

    #[test]
    fn test_find_join_path_direct_and_inverse() {
        let catalog = Catalog::store_schema();

        let direct = catalog.find_join_path("produto", "categoria").unwrap();
        assert_eq!(
            direct.condition(),
            "Produto.Categoria_idCategoria = Categoria.idCategoria"
        );

        let inverse = catalog.find_join_path("Categoria", "Produto").unwrap();
        assert_eq!(inverse, direct);

        assert!(catalog.find_join_path("Categoria", "Status").is_none());
        assert!(catalog.find_join_path("Categoria", "Nope").is_none());
    }

    #[test]
    fn test_store_schema_is_consistent() {
        let catalog = Catalog::store_schema();
        assert_eq!(catalog.len(), 10);
        catalog.check_foreign_keys().unwrap();
    }

    #[test]
    fn test_dangling_foreign_key_rejected() {
        let json = r#"{"tables": [
            {"name": "A", "columns": ["id", "b_id"],
             "foreign_keys": [{"column": "b_id", "ref_table": "B", "ref_column": "id"}]}
        ]}"#;
        let result = Catalog::from_json(json);
        assert!(matches!(result, Err(Error::CatalogError(_))));
    }

    #[test]
    fn test_table_info() {
        let catalog = Catalog::store_schema();
        let info = catalog.get_table_info("produto").unwrap();

        assert!(info.starts_with("Table: Produto\n"));
        assert!(info.contains("  idProduto [PRIMARY KEY]\n"));
        assert!(info.contains("  Categoria_idCategoria [REFERENCES Categoria(idCategoria)]\n"));
        assert!(matches!(
            catalog.get_table_info("missing"),
            Err(Error::UnknownTable(_))
        ));
    }
}
