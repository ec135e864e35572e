//! In-memory connection for testing.

use crate::connection::{Connection, ConnectionId, Filter};
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use rowunit_value::{Row, Value};
use std::collections::HashMap;

/// Declared shape of a table in a [`MemoryConnection`].
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Primary key column.
    pub primary_col: String,
    /// Whether the store assigns the primary key on insert.
    pub auto_primary: bool,
    /// Non-primary columns, in declaration order.
    pub columns: Vec<String>,
    /// Columns that must be present and non-null on insert.
    pub required: Vec<String>,
}

impl TableSchema {
    /// Creates a schema with an auto-increment primary key.
    pub fn new(name: impl Into<String>, primary_col: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_col: primary_col.into(),
            auto_primary: true,
            columns: Vec::new(),
            required: Vec::new(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, col: impl Into<String>) -> Self {
        self.columns.push(col.into());
        self
    }

    /// Marks a column NOT NULL.
    #[must_use]
    pub fn required(mut self, col: impl Into<String>) -> Self {
        self.required.push(col.into());
        self
    }

    /// Disables store-assigned primary keys for this table.
    #[must_use]
    pub fn natural_primary(mut self) -> Self {
        self.auto_primary = false;
        self
    }

    fn has_column(&self, col: &str) -> bool {
        col == self.primary_col || self.columns.iter().any(|c| c == col)
    }
}

/// Fault points for injected failures.
///
/// Each armed fault fires once, on the next matching call, then disarms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// Fail the next `begin`.
    Begin,
    /// Fail the next `commit`.
    Commit,
    /// Fail the next write (insert, update, or delete).
    Execute,
}

impl FailPoint {
    fn name(self) -> &'static str {
        match self {
            FailPoint::Begin => "begin",
            FailPoint::Commit => "commit",
            FailPoint::Execute => "execute",
        }
    }
}

#[derive(Debug, Clone)]
struct TableState {
    schema: TableSchema,
    rows: Vec<Row>,
    next_id: i64,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, TableState>,
    snapshot: Option<HashMap<String, TableState>>,
    last_insert_id: Option<Value>,
    armed: Vec<FailPoint>,
}

/// An in-memory store connection.
///
/// Suitable for unit and integration tests: tables are declared up front
/// with [`TableSchema`], inserts enforce NOT NULL constraints and assign
/// auto-increment identities, and transactions work by snapshotting table
/// state on `begin` and restoring it on `rollback`.
///
/// # Thread safety
///
/// The connection is internally synchronized and can be shared via `Arc`.
#[derive(Debug, Default)]
pub struct MemoryConnection {
    id: ConnectionId,
    inner: Mutex<Inner>,
}

impl MemoryConnection {
    /// Creates a connection with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a table.
    pub fn create_table(&self, schema: TableSchema) {
        let mut inner = self.inner.lock();
        let name = schema.name.clone();
        inner.tables.insert(
            name,
            TableState {
                schema,
                rows: Vec::new(),
                next_id: 1,
            },
        );
    }

    /// Arms a one-shot fault at the given point.
    pub fn fail_next(&self, point: FailPoint) {
        self.inner.lock().armed.push(point);
    }

    /// Returns all rows of a table, for assertions.
    pub fn table_rows(&self, table: &str) -> StorageResult<Vec<Row>> {
        let inner = self.inner.lock();
        let state = inner
            .tables
            .get(table)
            .ok_or_else(|| StorageError::no_such_table(table))?;
        Ok(state.rows.clone())
    }

    /// Returns true if a transaction is open.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.inner.lock().snapshot.is_some()
    }

    fn take_fault(inner: &mut Inner, point: FailPoint) -> StorageResult<()> {
        if let Some(idx) = inner.armed.iter().position(|p| *p == point) {
            inner.armed.remove(idx);
            return Err(StorageError::Injected {
                point: point.name().to_owned(),
            });
        }
        Ok(())
    }

    fn check_columns(state: &TableState, row: &Row) -> StorageResult<()> {
        for col in row.columns() {
            if !state.schema.has_column(col) {
                return Err(StorageError::no_such_column(&state.schema.name, col));
            }
        }
        Ok(())
    }
}

impl Connection for MemoryConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn begin(&self) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        Self::take_fault(&mut inner, FailPoint::Begin)?;
        if inner.snapshot.is_some() {
            return Err(StorageError::AlreadyInTransaction);
        }
        inner.snapshot = Some(inner.tables.clone());
        Ok(())
    }

    fn commit(&self) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        Self::take_fault(&mut inner, FailPoint::Commit)?;
        if inner.snapshot.take().is_none() {
            return Err(StorageError::NotInTransaction);
        }
        Ok(())
    }

    fn rollback(&self) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        match inner.snapshot.take() {
            Some(snapshot) => {
                inner.tables = snapshot;
                Ok(())
            }
            None => Err(StorageError::NotInTransaction),
        }
    }

    fn insert_row(&self, table: &str, row: &Row) -> StorageResult<u64> {
        let mut inner = self.inner.lock();
        Self::take_fault(&mut inner, FailPoint::Execute)?;
        let state = inner
            .tables
            .get_mut(table)
            .ok_or_else(|| StorageError::no_such_table(table))?;
        Self::check_columns(state, row)?;

        for col in &state.schema.required {
            match row.get(col) {
                None | Some(Value::Null) => {
                    return Err(StorageError::constraint(format!(
                        "NOT NULL constraint failed: {table}.{col}"
                    )));
                }
                Some(_) => {}
            }
        }

        let mut stored = Row::new();
        let primary_col = state.schema.primary_col.clone();
        let identity = match row.get(&primary_col) {
            Some(v) if !v.is_null() => v.clone(),
            _ if state.schema.auto_primary => {
                let id = state.next_id;
                state.next_id += 1;
                Value::Integer(id)
            }
            _ => {
                return Err(StorageError::constraint(format!(
                    "NOT NULL constraint failed: {table}.{primary_col}"
                )));
            }
        };
        stored.set(primary_col, identity.clone());
        for col in &state.schema.columns {
            stored.set(col.clone(), row.get(col).cloned().unwrap_or(Value::Null));
        }

        state.rows.push(stored);
        inner.last_insert_id = Some(identity);
        Ok(1)
    }

    fn update_rows(&self, table: &str, set: &Row, key: &Filter) -> StorageResult<u64> {
        let mut inner = self.inner.lock();
        Self::take_fault(&mut inner, FailPoint::Execute)?;
        let state = inner
            .tables
            .get_mut(table)
            .ok_or_else(|| StorageError::no_such_table(table))?;
        Self::check_columns(state, set)?;
        if !state.schema.has_column(key.column()) {
            return Err(StorageError::no_such_column(table, key.column()));
        }

        let mut affected = 0;
        for row in state.rows.iter_mut().filter(|r| key.matches(r)) {
            for (col, value) in set.iter() {
                row.set(col, value.clone());
            }
            affected += 1;
        }
        Ok(affected)
    }

    fn delete_rows(&self, table: &str, key: &Filter) -> StorageResult<u64> {
        let mut inner = self.inner.lock();
        Self::take_fault(&mut inner, FailPoint::Execute)?;
        let state = inner
            .tables
            .get_mut(table)
            .ok_or_else(|| StorageError::no_such_table(table))?;
        if !state.schema.has_column(key.column()) {
            return Err(StorageError::no_such_column(table, key.column()));
        }

        let before = state.rows.len();
        state.rows.retain(|r| !key.matches(r));
        Ok((before - state.rows.len()) as u64)
    }

    fn last_insert_id(&self) -> StorageResult<Value> {
        self.inner
            .lock()
            .last_insert_id
            .clone()
            .ok_or(StorageError::NoGeneratedIdentity)
    }

    fn select_rows(&self, table: &str, filter: Option<&Filter>) -> StorageResult<Vec<Row>> {
        let inner = self.inner.lock();
        let state = inner
            .tables
            .get(table)
            .ok_or_else(|| StorageError::no_such_table(table))?;
        Ok(state
            .rows
            .iter()
            .filter(|r| filter.is_none_or(|f| f.matches(r)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people_conn() -> MemoryConnection {
        let conn = MemoryConnection::new();
        conn.create_table(
            TableSchema::new("people", "id")
                .column("name")
                .column("floor")
                .required("name"),
        );
        conn
    }

    fn named(name: &str) -> Row {
        let mut row = Row::new();
        row.set("name", name);
        row
    }

    #[test]
    fn insert_assigns_identity() {
        let conn = people_conn();
        assert_eq!(conn.insert_row("people", &named("Anna")).unwrap(), 1);
        assert_eq!(conn.last_insert_id().unwrap(), Value::Integer(1));
        assert_eq!(conn.insert_row("people", &named("Betty")).unwrap(), 1);
        assert_eq!(conn.last_insert_id().unwrap(), Value::Integer(2));
    }

    #[test]
    fn insert_fills_missing_columns_with_null() {
        let conn = people_conn();
        conn.insert_row("people", &named("Anna")).unwrap();
        let rows = conn.table_rows("people").unwrap();
        assert_eq!(rows[0].get("floor"), Some(&Value::Null));
    }

    #[test]
    fn insert_missing_required_column_is_constraint_error() {
        let conn = people_conn();
        let err = conn.insert_row("people", &Row::new()).unwrap_err();
        assert!(matches!(err, StorageError::Constraint { .. }));
    }

    #[test]
    fn insert_unknown_column_rejected() {
        let conn = people_conn();
        let mut row = named("Anna");
        row.set("shoe_size", 42);
        let err = conn.insert_row("people", &row).unwrap_err();
        assert!(matches!(err, StorageError::NoSuchColumn { .. }));
    }

    #[test]
    fn update_affects_matching_rows() {
        let conn = people_conn();
        conn.insert_row("people", &named("Anna")).unwrap();
        conn.insert_row("people", &named("Betty")).unwrap();

        let affected = conn
            .update_rows("people", &named("Annabelle"), &Filter::eq("id", 1))
            .unwrap();
        assert_eq!(affected, 1);

        let rows = conn.select_rows("people", Some(&Filter::eq("id", 1))).unwrap();
        assert_eq!(rows[0].get("name"), Some(&Value::Text("Annabelle".into())));
    }

    #[test]
    fn delete_returns_affected_count() {
        let conn = people_conn();
        conn.insert_row("people", &named("Anna")).unwrap();
        conn.insert_row("people", &named("Betty")).unwrap();

        assert_eq!(conn.delete_rows("people", &Filter::eq("id", 2)).unwrap(), 1);
        assert_eq!(conn.delete_rows("people", &Filter::eq("id", 2)).unwrap(), 0);
        assert_eq!(conn.table_rows("people").unwrap().len(), 1);
    }

    #[test]
    fn rollback_restores_snapshot() {
        let conn = people_conn();
        conn.insert_row("people", &named("Anna")).unwrap();

        conn.begin().unwrap();
        conn.insert_row("people", &named("Betty")).unwrap();
        conn.delete_rows("people", &Filter::eq("id", 1)).unwrap();
        conn.rollback().unwrap();

        let rows = conn.table_rows("people").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&Value::Text("Anna".into())));
    }

    #[test]
    fn commit_keeps_changes() {
        let conn = people_conn();
        conn.begin().unwrap();
        conn.insert_row("people", &named("Anna")).unwrap();
        conn.commit().unwrap();
        assert_eq!(conn.table_rows("people").unwrap().len(), 1);
        assert!(!conn.in_transaction());
    }

    #[test]
    fn nested_begin_is_an_error() {
        let conn = people_conn();
        conn.begin().unwrap();
        assert!(matches!(
            conn.begin().unwrap_err(),
            StorageError::AlreadyInTransaction
        ));
    }

    #[test]
    fn commit_without_begin_is_an_error() {
        let conn = people_conn();
        assert!(matches!(
            conn.commit().unwrap_err(),
            StorageError::NotInTransaction
        ));
        assert!(matches!(
            conn.rollback().unwrap_err(),
            StorageError::NotInTransaction
        ));
    }

    #[test]
    fn natural_primary_requires_identity() {
        let conn = MemoryConnection::new();
        conn.create_table(TableSchema::new("tags", "tag").natural_primary());
        let err = conn.insert_row("tags", &Row::new()).unwrap_err();
        assert!(matches!(err, StorageError::Constraint { .. }));

        let mut row = Row::new();
        row.set("tag", "blue");
        assert_eq!(conn.insert_row("tags", &row).unwrap(), 1);
        assert_eq!(conn.last_insert_id().unwrap(), Value::Text("blue".into()));
    }

    #[test]
    fn fault_fires_once_then_disarms() {
        let conn = people_conn();
        conn.fail_next(FailPoint::Execute);
        assert!(matches!(
            conn.insert_row("people", &named("Anna")).unwrap_err(),
            StorageError::Injected { .. }
        ));
        assert_eq!(conn.insert_row("people", &named("Anna")).unwrap(), 1);
    }

    #[test]
    fn begin_fault_leaves_no_transaction() {
        let conn = people_conn();
        conn.fail_next(FailPoint::Begin);
        assert!(conn.begin().is_err());
        assert!(!conn.in_transaction());
        conn.begin().unwrap();
    }
}
