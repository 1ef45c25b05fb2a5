//! Database driver implementations.
//!
//! Each driver implements the `DatabaseConnection` and `SchemaIntrospection` traits.

pub mod clickhouse;
