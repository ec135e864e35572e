//! Closure-scoped transactions over the seeded fixtures.

use rowunit_core::{CoreError, CoreResult, Mapper, Record, TransactionScope, Values};
use rowunit_testkit::prelude::*;
use rowunit_value::Value;
use std::sync::Arc;

#[test]
fn scope_commits_work_across_mappers() {
    let two = PeopleFixture::seeded().with_tags_elsewhere();
    let scope = TransactionScope::new(Arc::clone(&two.people.mappers));

    scope
        .exec(|mappers| {
            let person = mappers.get("person")?;
            let tag = mappers.get("tag")?;
            let mut laura = Record::new()
                .with("first_name", "Laura")
                .with("building_number", 1)
                .with("floor", 4);
            person.insert(&mut laura)?;
            let mut label = Record::new().with("label", "newcomer");
            tag.insert(&mut label)?;
            Ok(())
        })
        .unwrap();

    assert_eq!(two.people.conn.table_rows("people").unwrap().len(), 4);
    assert_eq!(two.tags_conn.table_rows("tags").unwrap().len(), 1);
    assert!(!two.people.conn.in_transaction());
    assert!(!two.tags_conn.in_transaction());
}

#[test]
fn scope_error_rolls_back_both_stores() {
    let two = PeopleFixture::seeded().with_tags_elsewhere();
    let scope = TransactionScope::new(Arc::clone(&two.people.mappers));

    let result: CoreResult<()> = scope.exec(|mappers| {
        let person = mappers.get("person")?;
        let mut laura = Record::new()
            .with("first_name", "Laura")
            .with("building_number", 1)
            .with("floor", 4);
        person.insert(&mut laura)?;
        Err(CoreError::invalid_operation("abandon the batch"))
    });

    assert!(result.is_err());
    assert_eq!(two.people.conn.table_rows("people").unwrap().len(), 3);
    assert!(!two.people.conn.in_transaction());
    assert!(!two.tags_conn.in_transaction());
}

#[test]
fn scope_reads_see_uncommitted_writes_inside_the_closure() {
    let fixture = PeopleFixture::empty();
    let scope = TransactionScope::new(Arc::clone(&fixture.mappers));

    let found = scope
        .exec(|mappers| {
            let mapper = mappers.get("person")?;
            let mut anna = Record::new()
                .with("first_name", "Anna")
                .with("building_number", 1)
                .with("floor", 1);
            mapper.insert(&mut anna)?;
            mapper.fetch_row_by("name", Values::one("Anna"))
        })
        .unwrap()
        .unwrap();

    assert_eq!(found.get("first_name"), Some(&Value::Text("Anna".into())));
    assert_eq!(found.get("identity"), Some(&Value::Integer(1)));
}
