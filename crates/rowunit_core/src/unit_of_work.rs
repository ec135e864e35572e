//! Unit-of-work orchestrator.

use crate::config::WorkConfig;
use crate::entity::{Entity, EntityArena, EntityKey};
use crate::error::{CoreError, CoreResult};
use crate::mapper::MapperLocator;
use crate::registry::{OpKind, PendingOp, WorkRegistry};
use crate::transaction::{collect_connections, TxnCoordinator};
use rowunit_value::{Row, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A successfully inserted entity and its storage-assigned identity.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertedEntity {
    /// The entity's handle.
    pub key: EntityKey,
    /// The generated identity, when the store auto-assigns one.
    pub generated_id: Option<Value>,
}

/// The entity and error that aborted a batch.
#[derive(Debug)]
pub struct Failure {
    /// The offending entity, if the failure occurred while replaying its
    /// operation. `None` for failures before replay (collection or begin)
    /// and after it (commit).
    pub key: Option<EntityKey>,
    /// The error that triggered the rollback.
    pub error: CoreError,
}

/// Batches pending operations and executes them under one multi-connection
/// transaction.
///
/// Entities are registered into an owned arena and referred to by
/// [`EntityKey`]. Attaching an operation for a key that already has one
/// replaces it; replay happens in first-seen order. `exec` either commits
/// every touched connection or rolls all of them back on the first error.
///
/// `exec` takes `&mut self`, so a second `exec` while one is running is
/// unrepresentable.
///
/// # Example
///
/// ```ignore
/// let mut work = UnitOfWork::new(mappers);
/// let key = work.register(Box::new(entity));
/// work.insert("person", key)?;
/// assert!(work.exec());
/// ```
pub struct UnitOfWork {
    mappers: Arc<MapperLocator>,
    config: WorkConfig,
    arena: EntityArena,
    registry: WorkRegistry,
    inserted: Vec<InsertedEntity>,
    updated: Vec<EntityKey>,
    deleted: Vec<EntityKey>,
    failure: Option<Failure>,
}

impl UnitOfWork {
    /// Creates a unit of work over a mapper locator.
    #[must_use]
    pub fn new(mappers: Arc<MapperLocator>) -> Self {
        Self::with_config(mappers, WorkConfig::default())
    }

    /// Creates a unit of work with an explicit configuration.
    #[must_use]
    pub fn with_config(mappers: Arc<MapperLocator>, config: WorkConfig) -> Self {
        Self {
            mappers,
            config,
            arena: EntityArena::new(),
            registry: WorkRegistry::new(),
            inserted: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
            failure: None,
        }
    }

    /// Takes ownership of an entity and returns its handle.
    pub fn register(&mut self, entity: Box<dyn Entity>) -> EntityKey {
        self.arena.insert(entity)
    }

    /// Returns a registered entity.
    #[must_use]
    pub fn entity(&self, key: EntityKey) -> Option<&dyn Entity> {
        self.arena.get(key)
    }

    /// Returns a registered entity, mutably.
    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut (dyn Entity + 'static)> {
        self.arena.get_mut(key)
    }

    /// Attaches an entity for insertion, replacing any pending operation.
    pub fn insert(&mut self, mapper: &str, key: EntityKey) -> CoreResult<()> {
        self.attach(key, PendingOp::insert(mapper))
    }

    /// Attaches an entity for update, replacing any pending operation.
    ///
    /// `baseline` is an optional field-value snapshot captured before the
    /// caller mutated the entity; with it, only changed columns are
    /// written.
    pub fn update(&mut self, mapper: &str, key: EntityKey, baseline: Option<Row>) -> CoreResult<()> {
        self.attach(key, PendingOp::update(mapper, baseline))
    }

    /// Attaches an entity for deletion, replacing any pending operation.
    pub fn delete(&mut self, mapper: &str, key: EntityKey) -> CoreResult<()> {
        self.attach(key, PendingOp::delete(mapper))
    }

    /// Detaches any pending operation for an entity; no-op if absent.
    ///
    /// The entity itself stays registered and its handle stays valid.
    pub fn detach(&mut self, key: EntityKey) {
        self.registry.detach(key);
    }

    /// Returns true if the entity has a pending operation.
    #[must_use]
    pub fn is_pending(&self, key: EntityKey) -> bool {
        self.registry.contains(key)
    }

    /// Returns the number of pending operations.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.registry.len()
    }

    fn attach(&mut self, key: EntityKey, op: PendingOp) -> CoreResult<()> {
        // fail fast, before any connection is involved
        if !self.mappers.contains(&op.mapper) {
            return Err(CoreError::no_such_mapper(&op.mapper));
        }
        if !self.arena.contains(key) {
            return Err(CoreError::unknown_entity(key));
        }
        self.registry.attach(key, op);
        Ok(())
    }

    /// Executes the batch.
    ///
    /// Resets the outcome sets, collects the distinct write connections of
    /// the batch, begins a transaction on each, and replays the pending
    /// operations in first-seen order. Commits and returns `true` when
    /// every operation succeeds; on the first error, rolls back every
    /// connection, records the failure, and returns `false` without
    /// attempting the remaining operations. The error is retrievable via
    /// [`error`](Self::error); it is never re-thrown.
    ///
    /// With [`WorkConfig::clear_after_exec`] (the default) a successful
    /// batch clears the registry so the instance can be reused; a failed
    /// batch always retains it.
    pub fn exec(&mut self) -> bool {
        self.inserted.clear();
        self.updated.clear();
        self.deleted.clear();
        self.failure = None;

        let connections = match collect_connections(&self.registry, &self.mappers) {
            Ok(connections) => connections,
            Err(error) => {
                self.failure = Some(Failure { key: None, error });
                return false;
            }
        };
        debug!(
            pending = self.registry.len(),
            connections = connections.len(),
            "executing batch"
        );

        let mut coordinator = TxnCoordinator::new(connections);
        if let Err(error) = coordinator.begin() {
            self.failure = Some(Failure { key: None, error });
            return false;
        }

        for key in self.registry.keys() {
            // attach() guarantees presence; keys() was taken after it
            let Some(op) = self.registry.get(key).cloned() else {
                continue;
            };
            trace!(entity = %key, kind = %op.kind, mapper = %op.mapper, "dispatching");
            if let Err(error) = self.dispatch(key, &op) {
                warn!(entity = %key, error = %error, "operation failed; rolling back");
                if let Err(rb) = coordinator.rollback() {
                    warn!(error = %rb, "rollback reported an error");
                }
                self.failure = Some(Failure {
                    key: Some(key),
                    error,
                });
                return false;
            }
        }

        if let Err(error) = coordinator.commit() {
            if let Err(rb) = coordinator.rollback() {
                warn!(error = %rb, "rollback reported an error");
            }
            self.failure = Some(Failure { key: None, error });
            return false;
        }

        if self.config.clear_after_exec {
            self.registry.clear();
        }
        true
    }

    fn dispatch(&mut self, key: EntityKey, op: &PendingOp) -> CoreResult<()> {
        let mapper = self.mappers.get(&op.mapper)?;
        let entity = self.arena.require_mut(key)?;
        match op.kind {
            OpKind::Insert => {
                let affected = mapper.insert(entity)?;
                let generated_id = if mapper.is_auto_primary() && affected > 0 {
                    mapper.identity_value(entity)
                } else {
                    None
                };
                self.inserted.push(InsertedEntity { key, generated_id });
            }
            OpKind::Update => {
                mapper.update(entity, op.baseline.as_ref())?;
                self.updated.push(key);
            }
            OpKind::Delete => {
                mapper.delete(entity)?;
                self.deleted.push(key);
            }
        }
        Ok(())
    }

    /// Entities inserted by the last `exec`, with any generated identity.
    #[must_use]
    pub fn inserted(&self) -> &[InsertedEntity] {
        &self.inserted
    }

    /// Entities updated by the last `exec`.
    #[must_use]
    pub fn updated(&self) -> &[EntityKey] {
        &self.updated
    }

    /// Entities deleted by the last `exec`.
    #[must_use]
    pub fn deleted(&self) -> &[EntityKey] {
        &self.deleted
    }

    /// The entity whose operation aborted the last `exec`, if any.
    #[must_use]
    pub fn failed(&self) -> Option<EntityKey> {
        self.failure.as_ref().and_then(|f| f.key)
    }

    /// The error that aborted the last `exec`, if any.
    #[must_use]
    pub fn error(&self) -> Option<&CoreError> {
        self.failure.as_ref().map(|f| &f.error)
    }
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("pending", &self.registry.len())
            .field("entities", &self.arena.len())
            .field("failed", &self.failed())
            .finish_non_exhaustive()
    }
}
