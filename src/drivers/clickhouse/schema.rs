//! ClickHouse schema introspection implementation.
//!
//! ClickHouse exposes its metadata through system tables:
//! - system.tables - table names and the `engine_full` descriptor
//! - system.columns - column names, types and default expressions
//!
//! Primary keys are not declared separately on legacy MergeTree tables; they are
//! recovered from the engine descriptor (see [`super::engine`]). ClickHouse has no
//! foreign keys.

use async_trait::async_trait;
use clickhouse::{Client, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::connection::ClickHouseDriver;
use super::engine::parse_engine;
use crate::error::{DriverError, Result};
use crate::traits::{Column, ForeignKey, PrimaryKey, SchemaIntrospection};

const TABLE_NAMES_QUERY: &str =
    "select name from system.tables where database = ? and database <> 'system'";

const COLUMNS_QUERY: &str = r#"
	select name, type, default_expression
		from system.columns
	where table = ? and database = ?
	"#;

const PRIMARY_KEY_QUERY: &str = r#"
	select name, engine_full
	from system.tables
	where name = ? and database = ?"#;

#[derive(Debug, Clone, PartialEq, Eq, Row, Serialize, Deserialize)]
pub struct TableNameRow {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Row, Serialize, Deserialize)]
pub struct ColumnRow {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub default_expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Row, Serialize, Deserialize)]
pub struct EngineRow {
    pub name: String,
    pub engine_full: String,
}

/// Executes catalog queries with positional `?` binds.
///
/// Implemented for [`clickhouse::Client`]; the introspection functions below only
/// depend on this trait.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn fetch_table_names(
        &self,
        sql: &str,
        binds: &[&str],
    ) -> Result<Vec<TableNameRow>, clickhouse::error::Error>;

    async fn fetch_columns(
        &self,
        sql: &str,
        binds: &[&str],
    ) -> Result<Vec<ColumnRow>, clickhouse::error::Error>;

    async fn fetch_engine(
        &self,
        sql: &str,
        binds: &[&str],
    ) -> Result<Option<EngineRow>, clickhouse::error::Error>;
}

fn bound_query(client: &Client, sql: &str, binds: &[&str]) -> clickhouse::query::Query {
    binds
        .iter()
        .fold(client.query(sql), |query, value| query.bind(*value))
}

#[async_trait]
impl Catalog for Client {
    async fn fetch_table_names(
        &self,
        sql: &str,
        binds: &[&str],
    ) -> Result<Vec<TableNameRow>, clickhouse::error::Error> {
        bound_query(self, sql, binds).fetch_all::<TableNameRow>().await
    }

    async fn fetch_columns(
        &self,
        sql: &str,
        binds: &[&str],
    ) -> Result<Vec<ColumnRow>, clickhouse::error::Error> {
        bound_query(self, sql, binds).fetch_all::<ColumnRow>().await
    }

    async fn fetch_engine(
        &self,
        sql: &str,
        binds: &[&str],
    ) -> Result<Option<EngineRow>, clickhouse::error::Error> {
        bound_query(self, sql, binds).fetch_optional::<EngineRow>().await
    }
}

/// Build the table listing query and its binds.
///
/// The whitelist takes precedence; the blacklist is only applied when the whitelist
/// is empty.
pub fn table_names_query<'a>(
    database: &'a str,
    whitelist: &'a [String],
    blacklist: &'a [String],
) -> (String, Vec<&'a str>) {
    let mut query = TABLE_NAMES_QUERY.to_string();
    let mut binds = vec![database];

    let (operator, names) = if !whitelist.is_empty() {
        ("in", whitelist)
    } else if !blacklist.is_empty() {
        ("not in", blacklist)
    } else {
        return (query, binds);
    };

    let placeholders = vec!["?"; names.len()].join(",");
    query.push_str(&format!(" and name {operator} ({placeholders})"));
    binds.extend(names.iter().map(String::as_str));

    (query, binds)
}

pub async fn table_names<C: Catalog + ?Sized>(
    catalog: &C,
    database: &str,
    whitelist: &[String],
    blacklist: &[String],
) -> Result<Vec<String>> {
    let (query, binds) = table_names_query(database, whitelist, blacklist);
    debug!(database, whitelist = whitelist.len(), blacklist = blacklist.len(), "listing tables");

    let rows = catalog
        .fetch_table_names(&query, &binds)
        .await
        .map_err(|e| DriverError::from_fetch("system.tables", e))?;

    Ok(rows.into_iter().map(|row| row.name).collect())
}

pub async fn columns<C: Catalog + ?Sized>(
    catalog: &C,
    database: &str,
    table: &str,
) -> Result<Vec<Column>> {
    debug!(database, table, "listing columns");

    let rows = catalog
        .fetch_columns(COLUMNS_QUERY, &[table, database])
        .await
        .map_err(|e| DriverError::from_fetch(table, e))?;

    Ok(rows
        .into_iter()
        .map(|row| Column::new(row.name, row.data_type, row.default_expression))
        .collect())
}

pub async fn primary_key<C: Catalog + ?Sized>(
    catalog: &C,
    database: &str,
    table: &str,
) -> Result<Option<PrimaryKey>> {
    debug!(database, table, "looking up primary key");

    let Some(row) = catalog
        .fetch_engine(PRIMARY_KEY_QUERY, &[table, database])
        .await
        .map_err(|e| DriverError::from_fetch(table, e))?
    else {
        return Ok(None);
    };

    let engine = parse_engine(&row.engine_full).map_err(|source| DriverError::EngineParse {
        engine: row.engine_full.clone(),
        source,
    })?;

    Ok(Some(PrimaryKey {
        name: row.name,
        columns: engine.primary_key,
    }))
}

#[async_trait]
impl SchemaIntrospection for ClickHouseDriver {
    async fn table_names(
        &self,
        database: &str,
        whitelist: &[String],
        blacklist: &[String],
    ) -> Result<Vec<String>> {
        table_names(self.client()?, database, whitelist, blacklist).await
    }

    async fn columns(&self, database: &str, table: &str) -> Result<Vec<Column>> {
        columns(self.client()?, database, table).await
    }

    async fn primary_key(&self, database: &str, table: &str) -> Result<Option<PrimaryKey>> {
        primary_key(self.client()?, database, table).await
    }

    async fn foreign_keys(&self, _database: &str, _table: &str) -> Result<Vec<ForeignKey>> {
        // ClickHouse has no foreign key constraints
        Ok(vec![])
    }

    fn translate_column_type(&self, column: Column) -> Column {
        self.translator().translate_column(column)
    }

    fn left_quote(&self) -> char {
        '`'
    }

    fn right_quote(&self) -> char {
        '`'
    }
}
