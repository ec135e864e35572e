//! # rowunit store
//!
//! Connection contract and in-memory reference store for rowunit.
//!
//! This crate defines the physical-connection boundary that the unit-of-work
//! engine coordinates. Connections are **externally owned**: the engine only
//! sequences `begin`/`commit`/`rollback` and issues row-level writes; it
//! never closes or reconfigures a connection.
//!
//! ## Available connections
//!
//! - [`MemoryConnection`] - an in-memory store with declared tables,
//!   NOT NULL constraints, auto-increment primary keys, and fault injection
//!   for tests
//!
//! ## Example
//!
//! ```rust
//! use rowunit_store::{Connection, MemoryConnection, TableSchema};
//! use rowunit_value::Row;
//!
//! let conn = MemoryConnection::new();
//! conn.create_table(TableSchema::new("people", "id").column("name").required("name"));
//!
//! let mut row = Row::new();
//! row.set("name", "Anna");
//! assert_eq!(conn.insert_row("people", &row).unwrap(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod error;
mod memory;

pub use connection::{Connection, ConnectionId, Filter};
pub use error::{StorageError, StorageResult};
pub use memory::{FailPoint, MemoryConnection, TableSchema};
