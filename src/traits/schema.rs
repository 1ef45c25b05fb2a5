//! Schema introspection trait and metadata types.
//!
//! This module defines the `SchemaIntrospection` trait the host generator programs
//! against, plus the column/key/table types it returns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::connection::DatabaseConnection;
use crate::drivers::clickhouse::HostType;
use crate::error::Result;

/// A table column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Catalog type including parameters, e.g. `FixedString(16)`
    pub full_db_type: String,
    /// Catalog type with the parameter list stripped, e.g. `FixedString`
    pub db_type: String,
    /// Default-value expression, empty when the column has none
    pub default: String,
    /// Target-language type, set by `translate_column_type`
    #[serde(default)]
    pub host_type: Option<HostType>,
}

impl Column {
    /// Create an untranslated column; `db_type` is derived from `full_db_type`.
    pub fn new(
        name: impl Into<String>,
        full_db_type: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        let full_db_type = full_db_type.into();
        Self {
            name: name.into(),
            db_type: base_type(&full_db_type).to_string(),
            full_db_type,
            default: default.into(),
            host_type: None,
        }
    }
}

/// Strip the parameter list from a catalog type: `FixedString(16)` → `FixedString`.
pub fn base_type(full_db_type: &str) -> &str {
    match full_db_type.find('(') {
        Some(idx) if idx > 0 => &full_db_type[..idx],
        _ => full_db_type,
    }
}

/// Primary key of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub name: String,
    /// Key columns in key order
    pub columns: Vec<String>,
}

/// A foreign key relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub table: String,
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

/// Everything the generator needs to know about one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    /// Columns with `host_type` filled in
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Trait for drivers that can describe a database to the generator.
#[async_trait]
pub trait SchemaIntrospection: DatabaseConnection {
    /// List table names in `database`.
    ///
    /// A non-empty `whitelist` restricts the result to those names; otherwise a
    /// non-empty `blacklist` excludes its names. The whitelist wins when both are set.
    async fn table_names(
        &self,
        database: &str,
        whitelist: &[String],
        blacklist: &[String],
    ) -> Result<Vec<String>>;

    /// List the columns of `table`, untranslated.
    async fn columns(&self, database: &str, table: &str) -> Result<Vec<Column>>;

    /// Look up the primary key of `table`.
    ///
    /// Returns `Ok(None)` when the catalog has no entry for the table.
    async fn primary_key(&self, database: &str, table: &str) -> Result<Option<PrimaryKey>>;

    /// Look up the foreign keys of `table`.
    async fn foreign_keys(&self, database: &str, table: &str) -> Result<Vec<ForeignKey>>;

    /// Assign the target-language type to a column.
    fn translate_column_type(&self, column: Column) -> Column;

    /// Character opening a quoted identifier.
    fn left_quote(&self) -> char;

    /// Character closing a quoted identifier.
    fn right_quote(&self) -> char;

    /// Quote an identifier with this driver's quote characters.
    fn quote_identifier(&self, identifier: &str) -> String {
        format!("{}{}{}", self.left_quote(), identifier, self.right_quote())
    }

    /// Describe every selected table: translated columns, primary key and foreign keys.
    ///
    /// Tables are visited one at a time in catalog order; the first failure aborts.
    async fn tables(
        &self,
        database: &str,
        whitelist: &[String],
        blacklist: &[String],
    ) -> Result<Vec<Table>> {
        let names = self.table_names(database, whitelist, blacklist).await?;
        let mut tables = Vec::with_capacity(names.len());

        for name in names {
            let columns = self
                .columns(database, &name)
                .await?
                .into_iter()
                .map(|c| self.translate_column_type(c))
                .collect();
            let primary_key = self.primary_key(database, &name).await?;
            let foreign_keys = self.foreign_keys(database, &name).await?;

            tables.push(Table {
                name,
                columns,
                primary_key,
                foreign_keys,
            });
        }

        Ok(tables)
    }
}

/// A boxed schema introspection trait object.
pub type BoxedSchemaIntrospection = Box<dyn SchemaIntrospection>;
