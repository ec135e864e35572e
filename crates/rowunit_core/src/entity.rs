//! Entity contract, arena, and handles.

use crate::error::{CoreError, CoreResult};
use rowunit_value::{Row, Value};
use std::collections::HashMap;
use std::fmt;

/// Field access required of any entity type used with a mapper.
///
/// The engine never reflects over entities; it reads and writes designated
/// fields through this pair of accessors. The only field the engine itself
/// mutates is the identity field, after an insert with a store-assigned key.
pub trait Entity: Send {
    /// Returns the value of a field, or `None` if the entity has no such
    /// field.
    fn get(&self, field: &str) -> Option<Value>;

    /// Sets the value of a field.
    fn set(&mut self, field: &str, value: Value) -> CoreResult<()>;
}

/// A generic entity backed by an ordered field map.
///
/// Useful when no dedicated struct exists for a mapped table: every field
/// read comes from the map, and `set` inserts fields freely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Row,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record from a field-value row.
    #[must_use]
    pub fn from_row(fields: Row) -> Self {
        Self { fields }
    }

    /// Sets a field, chaining.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.set(field, value);
        self
    }

    /// Returns the underlying field row.
    #[must_use]
    pub fn fields(&self) -> &Row {
        &self.fields
    }
}

impl Entity for Record {
    fn get(&self, field: &str) -> Option<Value> {
        self.fields.get(field).cloned()
    }

    fn set(&mut self, field: &str, value: Value) -> CoreResult<()> {
        self.fields.set(field, value);
        Ok(())
    }
}

/// Instantiates entities from fetched field rows.
///
/// Select results carry *field* names (columns are aliased through the
/// column-field map), so factories see the entity's vocabulary, not the
/// table's.
pub trait EntityFactory: Send + Sync {
    /// Creates an entity from a field-value row.
    fn new_entity(&self, fields: Row) -> Box<dyn Entity>;
}

/// An [`EntityFactory`] producing [`Record`] entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFactory;

impl EntityFactory for RecordFactory {
    fn new_entity(&self, fields: Row) -> Box<dyn Entity> {
        Box::new(Record::from_row(fields))
    }
}

/// A stable handle to an entity registered with a unit of work.
///
/// Handles compare by identity, never by entity content: two structurally
/// identical entities registered separately get distinct keys. A key stays
/// valid for the lifetime of the arena that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey(u64);

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity:{}", self.0)
    }
}

/// Owns registered entities and issues [`EntityKey`] handles.
#[derive(Default)]
pub struct EntityArena {
    entries: HashMap<EntityKey, Box<dyn Entity>>,
    next: u64,
}

impl EntityArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of an entity and returns its handle.
    pub fn insert(&mut self, entity: Box<dyn Entity>) -> EntityKey {
        let key = EntityKey(self.next);
        self.next += 1;
        self.entries.insert(key, entity);
        key
    }

    /// Returns the entity for a handle.
    #[must_use]
    pub fn get(&self, key: EntityKey) -> Option<&dyn Entity> {
        self.entries.get(&key).map(|e| e.as_ref())
    }

    /// Returns the entity for a handle, mutably.
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut (dyn Entity + 'static)> {
        self.entries.get_mut(&key).map(|e| e.as_mut())
    }

    /// Returns the entity for a handle, or an unknown-entity error.
    pub fn require_mut(&mut self, key: EntityKey) -> CoreResult<&mut (dyn Entity + 'static)> {
        self.entries
            .get_mut(&key)
            .map(|e| e.as_mut())
            .ok_or_else(|| CoreError::unknown_entity(key))
    }

    /// Returns true if the handle refers to a registered entity.
    #[must_use]
    pub fn contains(&self, key: EntityKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Returns the number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entities are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for EntityArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityArena")
            .field("len", &self.entries.len())
            .field("next", &self.next)
            .finish()
    }
}
