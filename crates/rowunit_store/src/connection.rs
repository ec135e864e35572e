//! Physical connection contract.

use crate::error::StorageResult;
use rowunit_value::{loosely_equal, Row, Value};
use std::fmt;
use uuid::Uuid;

/// Unique identity of a physical connection.
///
/// Two mappers may share one physical connection; the unit of work
/// deduplicates the connections of a batch by this identity, not by mapper
/// name.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Creates a fresh connection identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionId({})", self.0)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row filter: equality against one value, or membership in a value set.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq(String, Value),
    /// `column IN (values...)`
    In(String, Vec<Value>),
}

impl Filter {
    /// Creates an equality filter.
    pub fn eq(col: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(col.into(), value.into())
    }

    /// Creates a membership filter.
    pub fn within(col: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Filter::In(col.into(), values.into_iter().collect())
    }

    /// Returns the column the filter matches against.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(col, _) | Filter::In(col, _) => col,
        }
    }

    /// Returns true if the row satisfies the filter.
    ///
    /// Matching uses the loose-numeric rule, mirroring how a SQL store
    /// coerces `WHERE id = '1'` against an integer column.
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        let Some(actual) = row.get(self.column()) else {
            return false;
        };
        match self {
            Filter::Eq(_, value) => loosely_equal(actual, value),
            Filter::In(_, values) => values.iter().any(|v| loosely_equal(actual, v)),
        }
    }
}

/// A physical store connection.
///
/// One `begin` per connection per batch; nested begins are an error, not a
/// no-op. Write operations return the affected-row count, and
/// [`last_insert_id`](Connection::last_insert_id) exposes the most recently
/// generated identity for auto-assigned primary keys.
pub trait Connection: Send + Sync {
    /// Returns the connection's identity, used for deduplication.
    fn id(&self) -> ConnectionId;

    /// Begins a transaction.
    fn begin(&self) -> StorageResult<()>;

    /// Commits the open transaction.
    fn commit(&self) -> StorageResult<()>;

    /// Rolls back the open transaction.
    fn rollback(&self) -> StorageResult<()>;

    /// Inserts a row payload, returning the affected-row count.
    fn insert_row(&self, table: &str, row: &Row) -> StorageResult<u64>;

    /// Updates rows matching `key` with the `set` payload.
    fn update_rows(&self, table: &str, set: &Row, key: &Filter) -> StorageResult<u64>;

    /// Deletes rows matching `key`.
    fn delete_rows(&self, table: &str, key: &Filter) -> StorageResult<u64>;

    /// Returns the identity generated by the most recent insert.
    fn last_insert_id(&self) -> StorageResult<Value>;

    /// Reads rows, optionally filtered.
    fn select_rows(&self, table: &str, filter: Option<&Filter>) -> StorageResult<Vec<Row>>;
}
