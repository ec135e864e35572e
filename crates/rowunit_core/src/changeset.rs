//! Change-set calculation for insert and update payloads.
//!
//! An update against a baseline snapshot carries only the columns whose
//! values actually changed. Comparison follows the loose-numeric rule: when
//! both the new and the old value are numeric they compare by numeric
//! equality, so `Integer(88)` against `Text("88")` is *unchanged*; anything
//! else compares strictly.

use crate::entity::Entity;
use crate::error::{CoreError, CoreResult};
use crate::mapper::ColumnMap;
use rowunit_store::Filter;
use rowunit_value::{loosely_equal, Row};

/// The computed payload for an update statement.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    /// Columns to write, identity column excluded. May be empty when the
    /// baseline diff found no changes.
    pub set: Row,
    /// The identity binding for the WHERE clause; always present.
    pub key: Filter,
}

/// Builds the full column payload for an entity: every mapped column with
/// the entity's current field value.
pub fn row_data(entity: &dyn Entity, cols_fields: &ColumnMap) -> CoreResult<Row> {
    let mut row = Row::new();
    for (col, field) in cols_fields.iter() {
        let value = entity
            .get(field)
            .ok_or_else(|| CoreError::missing_field(field))?;
        row.set(col.to_owned(), value);
    }
    Ok(row)
}

/// Builds the changed-column payload for an entity against a baseline
/// snapshot of field values.
///
/// A field absent from the baseline counts as changed. Equal columns are
/// omitted; unequal columns carry the new value.
pub fn row_changes(
    entity: &dyn Entity,
    baseline: &Row,
    cols_fields: &ColumnMap,
) -> CoreResult<Row> {
    let mut row = Row::new();
    for (col, field) in cols_fields.iter() {
        let new = entity
            .get(field)
            .ok_or_else(|| CoreError::missing_field(field))?;
        let changed = match baseline.get(field) {
            Some(old) => !loosely_equal(&new, old),
            None => true,
        };
        if changed {
            row.set(col.to_owned(), new);
        }
    }
    Ok(row)
}

/// Builds the update plan for an entity.
///
/// With a baseline the SET list is the diff; without one it is every mapped
/// column. Either way the identity column is removed from the SET list and
/// force-included as the WHERE binding, pinned to the entity's current
/// identity value.
pub fn update_plan(
    entity: &dyn Entity,
    baseline: Option<&Row>,
    cols_fields: &ColumnMap,
    primary_col: &str,
    identity_field: &str,
) -> CoreResult<UpdatePlan> {
    let identity = entity
        .get(identity_field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| CoreError::missing_identity(identity_field))?;

    let mut set = match baseline {
        Some(baseline) => row_changes(entity, baseline, cols_fields)?,
        None => row_data(entity, cols_fields)?,
    };
    set.remove(primary_col);

    Ok(UpdatePlan {
        set,
        key: Filter::Eq(primary_col.to_owned(), identity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Record;
    use rowunit_value::Value;

    fn people_map() -> ColumnMap {
        ColumnMap::new([("id", "identity"), ("name", "first_name"), ("floor", "floor")])
    }

    fn anna() -> Record {
        Record::new()
            .with("identity", 1)
            .with("first_name", "Anna")
            .with("floor", 10)
    }

    fn baseline_of(record: &Record) -> Row {
        record.fields().clone()
    }

    #[test]
    fn row_data_maps_every_column() {
        let row = row_data(&anna(), &people_map()).unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row.get("id"), Some(&Value::Integer(1)));
        assert_eq!(row.get("name"), Some(&Value::Text("Anna".into())));
    }

    #[test]
    fn row_data_reports_missing_field() {
        let entity = Record::new().with("identity", 1);
        let err = row_data(&entity, &people_map()).unwrap_err();
        assert!(matches!(err, CoreError::MissingField { .. }));
    }

    #[test]
    fn diff_contains_only_changed_columns() {
        let before = anna();
        let baseline = baseline_of(&before);

        let mut after = before;
        after
            .set("first_name", Value::Text("Annabelle".into()))
            .unwrap();

        let plan = update_plan(&after, Some(&baseline), &people_map(), "id", "identity").unwrap();
        assert_eq!(plan.set.len(), 1);
        assert_eq!(plan.set.get("name"), Some(&Value::Text("Annabelle".into())));
        assert_eq!(plan.key, Filter::Eq("id".into(), Value::Integer(1)));
    }

    #[test]
    fn numeric_representation_change_is_not_a_diff() {
        let baseline = baseline_of(&anna());
        // same floor, now as a numeric string
        let after = anna().with("floor", "10");

        let changes = row_changes(&after, &baseline, &people_map()).unwrap();
        assert!(!changes.contains("floor"));
    }

    #[test]
    fn numeric_value_change_is_a_diff() {
        let baseline = baseline_of(&anna());
        let after = anna().with("floor", "69");

        let changes = row_changes(&after, &baseline, &people_map()).unwrap();
        assert_eq!(changes.get("floor"), Some(&Value::Text("69".into())));
    }

    #[test]
    fn case_change_is_a_diff() {
        let baseline = baseline_of(&anna());
        let after = anna().with("first_name", "anna");

        let changes = row_changes(&after, &baseline, &people_map()).unwrap();
        assert!(changes.contains("name"));
    }

    #[test]
    fn field_absent_from_baseline_counts_as_changed() {
        let mut baseline = baseline_of(&anna());
        baseline.remove("floor");

        let changes = row_changes(&anna(), &baseline, &people_map()).unwrap();
        assert!(changes.contains("floor"));
    }

    #[test]
    fn zero_diff_yields_empty_set_with_identity_binding() {
        let entity = anna();
        let baseline = baseline_of(&entity);

        let plan = update_plan(&entity, Some(&baseline), &people_map(), "id", "identity").unwrap();
        assert!(plan.set.is_empty());
        assert_eq!(plan.key, Filter::Eq("id".into(), Value::Integer(1)));
    }

    #[test]
    fn no_baseline_writes_every_column_except_identity() {
        let plan = update_plan(&anna(), None, &people_map(), "id", "identity").unwrap();
        assert_eq!(plan.set.len(), 2);
        assert!(!plan.set.contains("id"));
    }

    #[test]
    fn unset_identity_is_an_error() {
        let entity = Record::new().with("first_name", "Anna").with("floor", 10);
        let err = update_plan(&entity, None, &people_map(), "id", "identity").unwrap_err();
        assert!(matches!(err, CoreError::MissingField { .. } | CoreError::MissingIdentity { .. }));
    }

    #[test]
    fn null_identity_is_an_error() {
        let entity = anna().with("identity", Value::Null);
        let err = update_plan(&entity, None, &people_map(), "id", "identity").unwrap_err();
        assert!(matches!(err, CoreError::MissingIdentity { .. }));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn scalar() -> impl Strategy<Value = Value> {
            prop_oneof![
                any::<i64>().prop_map(Value::Integer),
                "[ -~]{0,16}".prop_map(Value::Text),
                any::<bool>().prop_map(Value::Bool),
            ]
        }

        proptest! {
            #[test]
            fn unchanged_entity_has_empty_diff(name in scalar(), floor in scalar()) {
                let entity = anna().with("first_name", name).with("floor", floor);
                let baseline = baseline_of(&entity);

                let plan = update_plan(&entity, Some(&baseline), &people_map(), "id", "identity")
                    .unwrap();
                prop_assert!(plan.set.is_empty());
            }

            #[test]
            fn diff_never_carries_the_identity_column(floor in scalar()) {
                let baseline = baseline_of(&anna());
                let entity = anna().with("floor", floor);

                let plan = update_plan(&entity, Some(&baseline), &people_map(), "id", "identity")
                    .unwrap();
                prop_assert!(!plan.set.contains("id"));
                prop_assert_eq!(&plan.key, &Filter::Eq("id".into(), Value::Integer(1)));
            }
        }
    }
}
