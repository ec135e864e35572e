//! Mapper contract: the per-entity-type driver between fields and columns.

mod locator;
mod table;

pub use locator::MapperLocator;
pub use table::TableMapper;

use crate::changeset;
use crate::entity::Entity;
use crate::error::{CoreError, CoreResult};
use crate::query::{Select, Values};
use rowunit_store::{Connection, Filter};
use rowunit_value::{Row, Value};
use std::sync::Arc;

/// An ordered map between table columns and entity fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    pairs: Vec<(String, String)>,
}

impl ColumnMap {
    /// Creates a map from `(column, field)` pairs, preserving order.
    pub fn new<C, F>(pairs: impl IntoIterator<Item = (C, F)>) -> Self
    where
        C: Into<String>,
        F: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(c, f)| (c.into(), f.into()))
                .collect(),
        }
    }

    /// Iterates over `(column, field)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(c, f)| (c.as_str(), f.as_str()))
    }

    /// Returns the field mapped to a column.
    #[must_use]
    pub fn field_of(&self, col: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(c, _)| c == col)
            .map(|(_, f)| f.as_str())
    }

    /// Returns the column mapped to a field.
    #[must_use]
    pub fn col_of(&self, field: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(_, f)| f == field)
            .map(|(c, _)| c.as_str())
    }

    /// Returns owned `(column, field)` aliases for a select.
    #[must_use]
    pub fn aliases(&self) -> Vec<(String, String)> {
        self.pairs.clone()
    }

    /// Returns the number of mapped columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if no columns are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// The per-entity-type driver: table identity, the column-field map, and
/// the insert/update/delete operations dispatched by a unit of work.
///
/// Implementors supply the table metadata and connections; the write
/// operations are provided in terms of those accessors and the change-set
/// calculator. Side effects are confined to the entity's identity field
/// (written back after an auto-assigned insert) and the backing store.
pub trait Mapper: Send + Sync {
    /// Returns the mapped table name.
    fn table(&self) -> &str;

    /// Returns the primary key column name.
    fn primary_col(&self) -> &str;

    /// Returns the column-field map.
    fn cols_fields(&self) -> &ColumnMap;

    /// Returns the write connection.
    fn write_connection(&self) -> Arc<dyn Connection>;

    /// Returns the read connection. Defaults to the write connection.
    fn read_connection(&self) -> Arc<dyn Connection> {
        self.write_connection()
    }

    /// Whether the store assigns the primary key on insert.
    fn is_auto_primary(&self) -> bool {
        true
    }

    /// Returns the entity field holding the identity value.
    fn identity_field(&self) -> &str {
        self.cols_fields()
            .field_of(self.primary_col())
            .unwrap_or_else(|| self.primary_col())
    }

    /// Returns the entity's identity value, if set and non-null.
    fn identity_value(&self, entity: &dyn Entity) -> Option<Value> {
        entity
            .get(self.identity_field())
            .filter(|v| !v.is_null())
    }

    /// Builds a filtered read over the mapped table.
    ///
    /// `values` is a scalar (matched by equality) or a sequence (matched by
    /// membership). Results are keyed by field name.
    fn select_by(&self, col: &str, values: Values) -> Select {
        Select::new(self.table(), self.cols_fields().aliases()).filter(values.into_filter(col))
    }

    /// Fetches all field rows matching a column value.
    fn fetch_rows_by(&self, col: &str, values: Values) -> CoreResult<Vec<Row>> {
        self.select_by(col, values)
            .fetch(self.read_connection().as_ref())
    }

    /// Fetches the first field row matching a column value.
    fn fetch_row_by(&self, col: &str, values: Values) -> CoreResult<Option<Row>> {
        self.select_by(col, values)
            .fetch_one(self.read_connection().as_ref())
    }

    /// Inserts the entity's mapped fields, returning the affected count.
    ///
    /// With an auto-assigned primary key the identity column is excluded
    /// from the payload; after a successful write the generated identity is
    /// fetched and written back into the entity's identity field. An
    /// affected count of 0 is not an error.
    fn insert(&self, entity: &mut dyn Entity) -> CoreResult<u64> {
        let mut row = Row::new();
        for (col, field) in self.cols_fields().iter() {
            match entity.get(field) {
                Some(value) => row.set(col.to_owned(), value),
                // an unset identity field is fine when the store assigns it
                None if self.is_auto_primary() && col == self.primary_col() => {}
                None => return Err(CoreError::missing_field(field)),
            }
        }
        if self.is_auto_primary() {
            row.remove(self.primary_col());
        }

        let conn = self.write_connection();
        let affected = conn.insert_row(self.table(), &row)?;
        if affected > 0 && self.is_auto_primary() {
            let id = conn.last_insert_id()?;
            entity.set(self.identity_field(), id)?;
        }
        Ok(affected)
    }

    /// Updates the entity's row, returning the affected count.
    ///
    /// With a baseline only changed columns are written; a zero-diff update
    /// is skipped outright and returns 0, so no statement with an empty SET
    /// list is ever issued.
    fn update(&self, entity: &dyn Entity, baseline: Option<&Row>) -> CoreResult<u64> {
        let plan = changeset::update_plan(
            entity,
            baseline,
            self.cols_fields(),
            self.primary_col(),
            self.identity_field(),
        )?;
        if plan.set.is_empty() {
            return Ok(0);
        }
        let affected = self
            .write_connection()
            .update_rows(self.table(), &plan.set, &plan.key)?;
        Ok(affected)
    }

    /// Deletes the row matching the entity's identity value.
    fn delete(&self, entity: &dyn Entity) -> CoreResult<u64> {
        let identity = self
            .identity_value(entity)
            .ok_or_else(|| CoreError::missing_identity(self.identity_field()))?;
        let key = Filter::Eq(self.primary_col().to_owned(), identity);
        let affected = self
            .write_connection()
            .delete_rows(self.table(), &key)?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_map_lookups() {
        let map = ColumnMap::new([("id", "identity"), ("name", "first_name")]);
        assert_eq!(map.field_of("name"), Some("first_name"));
        assert_eq!(map.col_of("first_name"), Some("name"));
        assert_eq!(map.field_of("missing"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn column_map_preserves_order() {
        let map = ColumnMap::new([("z", "z1"), ("a", "a1")]);
        let cols: Vec<_> = map.iter().map(|(c, _)| c).collect();
        assert_eq!(cols, vec!["z", "a"]);
    }
}
