//! Seeded store fixtures with wired-up mappers.
//!
//! Provides a small "people" dataset and ready-made mapper wiring so tests
//! can focus on batch semantics instead of setup.

use rowunit_core::{ColumnMap, MapperLocator, RecordFactory, TableMapper, UnitOfWork, WorkConfig};
use rowunit_store::{Connection, MemoryConnection, TableSchema};
use rowunit_value::Row;
use std::sync::Arc;

/// The `(column, field)` aliases of the people table.
pub const PEOPLE_ALIASES: [(&str, &str); 4] = [
    ("id", "identity"),
    ("name", "first_name"),
    ("building", "building_number"),
    ("floor", "floor"),
];

/// The seeded first names, in insertion order.
pub const SEEDED_NAMES: [&str; 3] = ["Anna", "Betty", "Clara"];

/// A seeded in-memory store with a `person` mapper wired into a locator.
pub struct PeopleFixture {
    /// The physical connection behind the `person` mapper.
    pub conn: Arc<MemoryConnection>,
    /// The locator holding the `person` mapper.
    pub mappers: Arc<MapperLocator>,
}

impl PeopleFixture {
    /// Creates the fixture with an empty people table.
    pub fn empty() -> Self {
        let conn = Arc::new(MemoryConnection::new());
        conn.create_table(
            TableSchema::new("people", "id")
                .column("name")
                .column("building")
                .column("floor")
                .required("name"),
        );
        let mappers = Arc::new(MapperLocator::new());
        let mapper_conn = Arc::clone(&conn);
        mappers.set("person", move || {
            Arc::new(
                TableMapper::new(
                    "people",
                    "id",
                    ColumnMap::new(PEOPLE_ALIASES),
                    Arc::clone(&mapper_conn) as Arc<dyn Connection>,
                )
                .with_factory(Arc::new(RecordFactory)),
            )
        });
        Self { conn, mappers }
    }

    /// Creates the fixture seeded with Anna, Betty, and Clara on floors
    /// 1 through 3 of building 1.
    pub fn seeded() -> Self {
        let fixture = Self::empty();
        for (floor, name) in SEEDED_NAMES.iter().enumerate() {
            let mut row = Row::new();
            row.set("name", *name);
            row.set("building", 1);
            row.set("floor", floor as i64 + 1);
            fixture
                .conn
                .insert_row("people", &row)
                .expect("seed insert failed");
        }
        fixture
    }

    /// Creates a unit of work over the fixture's mappers.
    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(Arc::clone(&self.mappers))
    }

    /// Creates a unit of work with an explicit configuration.
    pub fn unit_of_work_with(&self, config: WorkConfig) -> UnitOfWork {
        UnitOfWork::with_config(Arc::clone(&self.mappers), config)
    }

    /// Adds a `tag` mapper over a `tags` table on a separate physical
    /// connection, for multi-connection batches.
    pub fn with_tags_elsewhere(self) -> TwoStoreFixture {
        let tags_conn = Arc::new(MemoryConnection::new());
        tags_conn.create_table(
            TableSchema::new("tags", "id")
                .column("label")
                .required("label"),
        );
        let mapper_conn = Arc::clone(&tags_conn);
        self.mappers.set("tag", move || {
            Arc::new(
                TableMapper::new(
                    "tags",
                    "id",
                    ColumnMap::new([("id", "identity"), ("label", "label")]),
                    Arc::clone(&mapper_conn) as Arc<dyn Connection>,
                )
                .with_factory(Arc::new(RecordFactory)),
            )
        });
        TwoStoreFixture {
            tags_conn,
            people: self,
        }
    }
}

/// A [`PeopleFixture`] plus a `tag` mapper on a second connection.
pub struct TwoStoreFixture {
    /// The physical connection behind the `tag` mapper.
    pub tags_conn: Arc<MemoryConnection>,
    /// The people side, whose locator also holds the `tag` mapper.
    pub people: PeopleFixture,
}
