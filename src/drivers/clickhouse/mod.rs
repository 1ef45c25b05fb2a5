//! ClickHouse database driver implementation.
//!
//! This module implements the `DatabaseConnection` and `SchemaIntrospection` traits
//! for ClickHouse, a column-oriented OLAP database management system.
//!
//! Features:
//! - HTTP-based connection with alternate-host failover
//! - `tcp://` connection string assembly
//! - Table, column and primary-key introspection over `system.*` tables
//! - Engine descriptor parsing
//! - Type translation to Rust types

mod config;
mod connection;
mod engine;
mod schema;
mod types;

pub use config::{DriverConfig, OpenStrategy, build_connection_string};
pub use connection::ClickHouseDriver;
pub use engine::{EngineDescriptor, EngineParseError, parse_engine};
pub use schema::{
    Catalog, ColumnRow, EngineRow, TableNameRow, columns, primary_key, table_names,
    table_names_query,
};
pub use types::{FixedString, HostType, TypeTranslator};
