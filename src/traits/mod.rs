//! Driver contract consumed by the code generator.
//!
//! - **Connection** (`connection`): open/close lifecycle and dialect capabilities
//! - **Schema** (`schema`): introspection trait and the column/key/table types
//!
//! The generator holds a `Box<dyn SchemaIntrospection>` and never branches on the
//! concrete backend.

pub mod connection;
pub mod schema;

pub use connection::{BoxedConnection, DatabaseConnection};

pub use schema::{
    BoxedSchemaIntrospection, Column, ForeignKey, PrimaryKey, SchemaIntrospection, Table,
    base_type,
};
