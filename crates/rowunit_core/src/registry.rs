//! Work registry: one pending operation per entity.

use crate::entity::EntityKey;
use rowunit_value::Row;
use std::collections::HashMap;
use std::fmt;

/// The kind of a pending operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Insert the entity's mapped fields as a new row.
    Insert,
    /// Update the entity's row, optionally diffed against a baseline.
    Update,
    /// Delete the entity's row.
    Delete,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Insert => write!(f, "insert"),
            OpKind::Update => write!(f, "update"),
            OpKind::Delete => write!(f, "delete"),
        }
    }
}

/// A queued operation awaiting execution in a batch.
#[derive(Debug, Clone)]
pub struct PendingOp {
    /// What to do with the entity.
    pub kind: OpKind,
    /// The mapper name in the locator.
    pub mapper: String,
    /// Baseline field snapshot for update diffing.
    pub baseline: Option<Row>,
}

impl PendingOp {
    /// Creates an insert operation.
    pub fn insert(mapper: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Insert,
            mapper: mapper.into(),
            baseline: None,
        }
    }

    /// Creates an update operation.
    pub fn update(mapper: impl Into<String>, baseline: Option<Row>) -> Self {
        Self {
            kind: OpKind::Update,
            mapper: mapper.into(),
            baseline,
        }
    }

    /// Creates a delete operation.
    pub fn delete(mapper: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Delete,
            mapper: mapper.into(),
            baseline: None,
        }
    }
}

/// Tracks the single pending operation per entity, in first-seen order.
///
/// Attaching an operation for an entity that already has one replaces it
/// atomically, keeping the entity's original position in the replay order.
#[derive(Debug, Default)]
pub struct WorkRegistry {
    order: Vec<EntityKey>,
    ops: HashMap<EntityKey, PendingOp>,
}

impl WorkRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an operation for an entity, replacing any existing one.
    pub fn attach(&mut self, key: EntityKey, op: PendingOp) {
        if self.ops.insert(key, op).is_none() {
            self.order.push(key);
        }
    }

    /// Detaches the pending operation for an entity; no-op if absent.
    pub fn detach(&mut self, key: EntityKey) -> Option<PendingOp> {
        let op = self.ops.remove(&key)?;
        self.order.retain(|k| *k != key);
        Some(op)
    }

    /// Returns the pending operation for an entity.
    #[must_use]
    pub fn get(&self, key: EntityKey) -> Option<&PendingOp> {
        self.ops.get(&key)
    }

    /// Returns true if the entity has a pending operation.
    #[must_use]
    pub fn contains(&self, key: EntityKey) -> bool {
        self.ops.contains_key(&key)
    }

    /// Iterates pending operations in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &PendingOp)> {
        self.order.iter().map(|key| (*key, &self.ops[key]))
    }

    /// Returns entity keys in first-seen order.
    #[must_use]
    pub fn keys(&self) -> Vec<EntityKey> {
        self.order.clone()
    }

    /// Returns the distinct mapper names referenced, in first-seen order.
    #[must_use]
    pub fn mapper_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for key in &self.order {
            let name = self.ops[key].mapper.as_str();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Returns the number of pending operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no operations are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Removes all pending operations.
    pub fn clear(&mut self) {
        self.order.clear();
        self.ops.clear();
    }
}
