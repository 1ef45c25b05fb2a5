//! Connection lifecycle trait.
//!
//! This module defines the `DatabaseConnection` trait every driver implements, along
//! with the SQL dialect capabilities the generator queries before emitting code.

use async_trait::async_trait;

use crate::error::Result;

/// Core trait for all driver connections.
///
/// A driver is constructed from its configuration without touching the network;
/// `open` acquires the connection handle and `close` releases it.
///
/// # Example
///
/// ```ignore
/// use schemagen_clickhouse::{ClickHouseDriver, DriverConfig, DatabaseConnection};
///
/// let mut driver = ClickHouseDriver::new(DriverConfig::new("localhost", 8123, "default"));
/// driver.open().await?;
/// // introspect...
/// driver.close().await;
/// ```
#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    /// Acquire the connection handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or no configured host is
    /// reachable.
    async fn open(&mut self) -> Result<()>;

    /// Release the connection handle. Closing an unopened driver is a no-op.
    async fn close(&mut self);

    /// Whether `open` has succeeded and `close` has not been called since.
    fn is_open(&self) -> bool;

    /// Whether inserted rows can be read back through a last-insert-id mechanism.
    fn use_last_insert_id(&self) -> bool;

    /// Whether the dialect limits rows with `SELECT TOP n` rather than `LIMIT n`.
    fn use_top_clause(&self) -> bool;

    /// Whether query placeholders are numbered (`$1`) rather than positional (`?`).
    fn index_placeholders(&self) -> bool;
}

/// A boxed connection trait object.
pub type BoxedConnection = Box<dyn DatabaseConnection>;
