//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A constraint was violated by a write.
    #[error("constraint violation: {message}")]
    Constraint {
        /// Description of the violated constraint.
        message: String,
    },

    /// The statement referenced a table the store does not have.
    #[error("no such table: {table}")]
    NoSuchTable {
        /// The missing table name.
        table: String,
    },

    /// The statement referenced a column the table does not declare.
    #[error("no such column: {table}.{column}")]
    NoSuchColumn {
        /// The table name.
        table: String,
        /// The missing column name.
        column: String,
    },

    /// `begin` was called while a transaction is already open.
    #[error("transaction already open on this connection")]
    AlreadyInTransaction,

    /// `commit` or `rollback` was called without an open transaction.
    #[error("no open transaction on this connection")]
    NotInTransaction,

    /// No insert has been performed, so there is no generated identity.
    #[error("no generated identity available")]
    NoGeneratedIdentity,

    /// A failure injected by a test fault point.
    #[error("injected failure at {point}")]
    Injected {
        /// The fault point that fired.
        point: String,
    },
}

impl StorageError {
    /// Creates a constraint violation error.
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            message: message.into(),
        }
    }

    /// Creates a no-such-table error.
    pub fn no_such_table(table: impl Into<String>) -> Self {
        Self::NoSuchTable {
            table: table.into(),
        }
    }

    /// Creates a no-such-column error.
    pub fn no_such_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::NoSuchColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}
