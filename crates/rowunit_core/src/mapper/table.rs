//! Ready-made table mapper.

use crate::entity::{Entity, EntityFactory};
use crate::error::CoreResult;
use crate::mapper::{ColumnMap, Mapper};
use crate::query::Values;
use rowunit_store::Connection;
use std::fmt;
use std::sync::Arc;

/// A [`Mapper`] driven by table metadata.
///
/// Covers the common case where no per-type driver is needed: the table
/// name, primary column, and column-field map fully describe the mapping.
/// An optional [`EntityFactory`] enables the entity-returning fetch
/// helpers.
pub struct TableMapper {
    table: String,
    primary_col: String,
    auto_primary: bool,
    cols_fields: ColumnMap,
    write: Arc<dyn Connection>,
    read: Option<Arc<dyn Connection>>,
    factory: Option<Arc<dyn EntityFactory>>,
}

impl TableMapper {
    /// Creates a mapper with an auto-assigned primary key.
    pub fn new(
        table: impl Into<String>,
        primary_col: impl Into<String>,
        cols_fields: ColumnMap,
        write: Arc<dyn Connection>,
    ) -> Self {
        Self {
            table: table.into(),
            primary_col: primary_col.into(),
            auto_primary: true,
            cols_fields,
            write,
            read: None,
            factory: None,
        }
    }

    /// Uses a separate read connection.
    #[must_use]
    pub fn with_read_connection(mut self, read: Arc<dyn Connection>) -> Self {
        self.read = Some(read);
        self
    }

    /// Marks the primary key as caller-supplied rather than store-assigned.
    #[must_use]
    pub fn natural_primary(mut self) -> Self {
        self.auto_primary = false;
        self
    }

    /// Wires an entity factory for the fetch helpers.
    #[must_use]
    pub fn with_factory(mut self, factory: Arc<dyn EntityFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Fetches the first matching row as an entity.
    ///
    /// Returns `Ok(None)` when nothing matches or no factory is wired.
    pub fn fetch_entity_by(
        &self,
        col: &str,
        values: Values,
    ) -> CoreResult<Option<Box<dyn Entity>>> {
        let Some(factory) = &self.factory else {
            return Ok(None);
        };
        let row = self.fetch_row_by(col, values)?;
        Ok(row.map(|r| factory.new_entity(r)))
    }

    /// Fetches all matching rows as entities.
    pub fn fetch_collection_by(
        &self,
        col: &str,
        values: Values,
    ) -> CoreResult<Vec<Box<dyn Entity>>> {
        let Some(factory) = &self.factory else {
            return Ok(Vec::new());
        };
        let rows = self.fetch_rows_by(col, values)?;
        Ok(rows.into_iter().map(|r| factory.new_entity(r)).collect())
    }
}

impl Mapper for TableMapper {
    fn table(&self) -> &str {
        &self.table
    }

    fn primary_col(&self) -> &str {
        &self.primary_col
    }

    fn cols_fields(&self) -> &ColumnMap {
        &self.cols_fields
    }

    fn write_connection(&self) -> Arc<dyn Connection> {
        Arc::clone(&self.write)
    }

    fn read_connection(&self) -> Arc<dyn Connection> {
        match &self.read {
            Some(read) => Arc::clone(read),
            None => Arc::clone(&self.write),
        }
    }

    fn is_auto_primary(&self) -> bool {
        self.auto_primary
    }
}

impl fmt::Debug for TableMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableMapper")
            .field("table", &self.table)
            .field("primary_col", &self.primary_col)
            .field("auto_primary", &self.auto_primary)
            .finish_non_exhaustive()
    }
}
