//! Transaction coordinator and connection collection.

use crate::error::{CoreError, CoreResult};
use crate::mapper::MapperLocator;
use crate::registry::WorkRegistry;
use crate::transaction::state::TxnState;
use rowunit_store::{Connection, ConnectionId};
use std::sync::Arc;
use tracing::{debug, warn};

fn push_distinct(connections: &mut Vec<Arc<dyn Connection>>, conn: Arc<dyn Connection>) {
    let id = conn.id();
    if !connections.iter().any(|c| c.id() == id) {
        connections.push(conn);
    }
}

/// Collects the distinct write connections implied by a batch.
///
/// Every distinct mapper name referenced by a pending operation is resolved
/// through the locator and asked for its write connection; the result is
/// deduplicated by [`ConnectionId`], since several mappers may share one
/// physical connection. Recomputed at the start of every batch, because
/// mapper wiring may change between batches.
pub fn collect_connections(
    registry: &WorkRegistry,
    mappers: &MapperLocator,
) -> CoreResult<Vec<Arc<dyn Connection>>> {
    let mut connections = Vec::new();
    for name in registry.mapper_names() {
        let mapper = mappers.get(name)?;
        push_distinct(&mut connections, mapper.write_connection());
    }
    Ok(connections)
}

/// Collects the distinct write connections of every mapper in a locator.
///
/// Used by [`TransactionScope`](crate::TransactionScope), which cannot know
/// ahead of time which mappers its closure will touch.
pub fn collect_all_connections(mappers: &MapperLocator) -> CoreResult<Vec<Arc<dyn Connection>>> {
    let mut connections = Vec::new();
    for name in mappers.names() {
        let mapper = mappers.get(&name)?;
        push_distinct(&mut connections, mapper.write_connection());
    }
    Ok(connections)
}

/// Sequences begin/commit/rollback across every connection of one batch.
///
/// Not a distributed atomic commit: when one connection commits and a later
/// one fails to commit, the system is left partially committed. In that
/// case [`rollback`](TxnCoordinator::rollback) only rolls back the
/// connections that have not committed.
pub struct TxnCoordinator {
    connections: Vec<Arc<dyn Connection>>,
    state: TxnState,
    committed: usize,
}

impl TxnCoordinator {
    /// Creates a coordinator over a collected connection set.
    #[must_use]
    pub fn new(connections: Vec<Arc<dyn Connection>>) -> Self {
        Self {
            connections,
            state: TxnState::Idle,
            committed: 0,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TxnState {
        self.state
    }

    /// Returns the number of collected connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Returns the identities of the collected connections.
    #[must_use]
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.connections.iter().map(|c| c.id()).collect()
    }

    /// Begins a transaction on every connection.
    ///
    /// If any single begin fails, the connections already begun are rolled
    /// back and the failure propagates before any operation executes.
    pub fn begin(&mut self) -> CoreResult<()> {
        self.ensure(TxnState::Idle, "begin")?;
        for (idx, conn) in self.connections.iter().enumerate() {
            if let Err(err) = conn.begin() {
                warn!(connection = %conn.id(), error = %err, "begin failed; unwinding");
                for begun in &self.connections[..idx] {
                    if let Err(rb) = begun.rollback() {
                        warn!(connection = %begun.id(), error = %rb, "rollback during unwind failed");
                    }
                }
                self.state = TxnState::RolledBack;
                return Err(err.into());
            }
        }
        debug!(connections = self.connections.len(), "transactions began");
        self.state = TxnState::Began;
        Ok(())
    }

    /// Commits every connection, in collection order.
    ///
    /// On a commit failure the coordinator stays in `Began` and records how
    /// many connections already committed, so a following `rollback` only
    /// touches the rest.
    pub fn commit(&mut self) -> CoreResult<()> {
        self.ensure(TxnState::Began, "commit")?;
        for conn in &self.connections {
            conn.commit()?;
            self.committed += 1;
        }
        debug!(connections = self.connections.len(), "transactions committed");
        self.state = TxnState::Committed;
        Ok(())
    }

    /// Rolls back every connection that has not committed.
    pub fn rollback(&mut self) -> CoreResult<()> {
        self.ensure(TxnState::Began, "rollback")?;
        let mut first_error = None;
        for conn in &self.connections[self.committed..] {
            if let Err(err) = conn.rollback() {
                warn!(connection = %conn.id(), error = %err, "rollback failed");
                first_error.get_or_insert(err);
            }
        }
        debug!(
            connections = self.connections.len() - self.committed,
            "transactions rolled back"
        );
        self.state = TxnState::RolledBack;
        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    fn ensure(&self, expected: TxnState, op: &str) -> CoreResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CoreError::invalid_operation(format!(
                "cannot {op} in state {}",
                self.state
            )))
        }
    }
}

impl std::fmt::Debug for TxnCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxnCoordinator")
            .field("state", &self.state)
            .field("connections", &self.connections.len())
            .field("committed", &self.committed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{ColumnMap, TableMapper};
    use crate::registry::{PendingOp, WorkRegistry};
    use crate::{EntityArena, Record};
    use rowunit_store::{FailPoint, MemoryConnection, TableSchema};

    fn memory_conn() -> Arc<MemoryConnection> {
        let conn = Arc::new(MemoryConnection::new());
        conn.create_table(TableSchema::new("people", "id").column("name"));
        conn
    }

    fn mapper_on(conn: &Arc<MemoryConnection>) -> Arc<dyn crate::Mapper> {
        Arc::new(TableMapper::new(
            "people",
            "id",
            ColumnMap::new([("id", "id"), ("name", "name")]),
            Arc::clone(conn) as Arc<dyn Connection>,
        ))
    }

    fn as_dyn(conn: &Arc<MemoryConnection>) -> Arc<dyn Connection> {
        Arc::clone(conn) as Arc<dyn Connection>
    }

    #[test]
    fn collect_dedupes_by_connection_identity() {
        let shared = memory_conn();
        let locator = MapperLocator::new();
        let conn_a = Arc::clone(&shared);
        let conn_b = Arc::clone(&shared);
        locator.set("a", move || mapper_on(&conn_a));
        locator.set("b", move || mapper_on(&conn_b));

        let mut arena = EntityArena::new();
        let k1 = arena.insert(Box::new(Record::new()));
        let k2 = arena.insert(Box::new(Record::new()));
        let mut registry = WorkRegistry::new();
        registry.attach(k1, PendingOp::insert("a"));
        registry.attach(k2, PendingOp::insert("b"));

        let connections = collect_connections(&registry, &locator).unwrap();
        assert_eq!(connections.len(), 1);
    }

    #[test]
    fn collect_keeps_distinct_connections() {
        let locator = MapperLocator::new();
        let c1 = memory_conn();
        let c2 = memory_conn();
        locator.set("a", move || mapper_on(&c1));
        locator.set("b", move || mapper_on(&c2));

        let mut arena = EntityArena::new();
        let k1 = arena.insert(Box::new(Record::new()));
        let k2 = arena.insert(Box::new(Record::new()));
        let mut registry = WorkRegistry::new();
        registry.attach(k1, PendingOp::insert("a"));
        registry.attach(k2, PendingOp::delete("b"));

        let connections = collect_connections(&registry, &locator).unwrap();
        assert_eq!(connections.len(), 2);
    }

    #[test]
    fn collect_surfaces_unknown_mapper() {
        let locator = MapperLocator::new();
        let mut arena = EntityArena::new();
        let k = arena.insert(Box::new(Record::new()));
        let mut registry = WorkRegistry::new();
        registry.attach(k, PendingOp::insert("ghost"));

        let err = collect_connections(&registry, &locator).err().unwrap();
        assert!(matches!(err, CoreError::NoSuchMapper { .. }));
    }

    #[test]
    fn begin_commit_lifecycle() {
        let conn = memory_conn();
        let mut coord = TxnCoordinator::new(vec![as_dyn(&conn)]);
        assert_eq!(coord.state(), TxnState::Idle);

        coord.begin().unwrap();
        assert_eq!(coord.state(), TxnState::Began);
        assert!(conn.in_transaction());

        coord.commit().unwrap();
        assert_eq!(coord.state(), TxnState::Committed);
        assert!(!conn.in_transaction());
    }

    #[test]
    fn begin_failure_unwinds_already_begun() {
        let first = memory_conn();
        let second = memory_conn();
        second.fail_next(FailPoint::Begin);

        let mut coord = TxnCoordinator::new(vec![as_dyn(&first), as_dyn(&second)]);
        assert!(coord.begin().is_err());
        assert_eq!(coord.state(), TxnState::RolledBack);
        assert!(!first.in_transaction());
        assert!(!second.in_transaction());
    }

    #[test]
    fn rollback_restores_all() {
        let first = memory_conn();
        let second = memory_conn();
        let mut coord = TxnCoordinator::new(vec![as_dyn(&first), as_dyn(&second)]);
        coord.begin().unwrap();
        coord.rollback().unwrap();
        assert_eq!(coord.state(), TxnState::RolledBack);
        assert!(!first.in_transaction());
        assert!(!second.in_transaction());
    }

    #[test]
    fn commit_failure_leaves_rest_rollable() {
        let first = memory_conn();
        let second = memory_conn();
        first.fail_next(FailPoint::Commit);

        let mut coord = TxnCoordinator::new(vec![as_dyn(&first), as_dyn(&second)]);
        coord.begin().unwrap();
        assert!(coord.commit().is_err());
        assert_eq!(coord.state(), TxnState::Began);

        coord.rollback().unwrap();
        assert!(!first.in_transaction());
        assert!(!second.in_transaction());
    }

    #[test]
    fn cannot_commit_twice() {
        let conn = memory_conn();
        let mut coord = TxnCoordinator::new(vec![as_dyn(&conn)]);
        coord.begin().unwrap();
        coord.commit().unwrap();
        assert!(matches!(
            coord.commit().unwrap_err(),
            CoreError::InvalidOperation { .. }
        ));
    }

    #[test]
    fn cannot_begin_twice() {
        let conn = memory_conn();
        let mut coord = TxnCoordinator::new(vec![as_dyn(&conn)]);
        coord.begin().unwrap();
        assert!(matches!(
            coord.begin().unwrap_err(),
            CoreError::InvalidOperation { .. }
        ));
    }
}
