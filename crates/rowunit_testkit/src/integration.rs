//! Cross-crate integration test helpers.

use rowunit_core::{Entity, Record, UnitOfWork};
use rowunit_value::Row;

/// Builds a person entity with the fixture's field vocabulary, identity
/// unset.
pub fn person(name: &str, building: i64, floor: i64) -> Box<dyn Entity> {
    Box::new(
        Record::new()
            .with("first_name", name)
            .with("building_number", building)
            .with("floor", floor),
    )
}

/// Captures a baseline snapshot of the named fields of an entity.
///
/// Fields the entity does not have are simply absent from the snapshot, so
/// a later diff treats them as changed.
pub fn snapshot(entity: &dyn Entity, fields: &[&str]) -> Row {
    let mut row = Row::new();
    for field in fields {
        if let Some(value) = entity.get(field) {
            row.set(*field, value);
        }
    }
    row
}

/// Executes a batch and panics with the recorded error if it fails.
pub fn exec_ok(work: &mut UnitOfWork) {
    if !work.exec() {
        panic!("batch failed: {:?}", work.error());
    }
}

/// Executes a batch expected to fail, returning nothing; panics if it
/// unexpectedly commits.
pub fn exec_err(work: &mut UnitOfWork) {
    assert!(!work.exec(), "batch unexpectedly committed");
    assert!(work.error().is_some(), "failed batch recorded no error");
}
