//! ClickHouse schema introspection for code generators.
//!
//! The crate exposes a driver contract ([`traits`]) and its ClickHouse
//! implementation ([`drivers::clickhouse`]): list tables, describe columns, recover
//! primary keys from engine descriptors and translate ClickHouse types into the Rust
//! types the generator should emit.
//!
//! # Example
//!
//! ```ignore
//! use schemagen_clickhouse::{
//!     ClickHouseDriver, DatabaseConnection, DriverConfig, SchemaIntrospection, TypeTranslator,
//! };
//!
//! let config = DriverConfig::new("localhost", 8123, "analytics");
//! let mut driver = ClickHouseDriver::new(config)
//!     .with_translator(TypeTranslator::new().uint8_as_bool(true));
//!
//! driver.open().await?;
//! let tables = driver.tables("analytics", &[], &[]).await?;
//! driver.close().await;
//! ```

pub mod drivers;
pub mod error;
pub mod traits;

pub use drivers::clickhouse::{
    ClickHouseDriver, DriverConfig, EngineDescriptor, EngineParseError, FixedString, HostType,
    TypeTranslator, build_connection_string,
};
pub use error::{DriverError, Result};
pub use traits::{
    Column, DatabaseConnection, ForeignKey, PrimaryKey, SchemaIntrospection, Table,
};
