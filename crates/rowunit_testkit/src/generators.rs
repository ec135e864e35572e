//! Property-based test generators using proptest.
//!
//! Provides strategies for generating scalar values, field rows, and the
//! numeric-text edge cases that exercise loose comparison.

use proptest::prelude::*;
use rowunit_value::{Row, Value};

/// Strategy for generating valid field names.
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating scalar values of every variant.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e12f64..1.0e12).prop_map(Value::Float),
        "[ -~]{0,24}".prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
    ]
}

/// Strategy for generating a numeric value and a text spelling of the same
/// number, which must compare loosely equal.
pub fn numeric_pair_strategy() -> impl Strategy<Value = (Value, Value)> {
    prop_oneof![
        any::<i64>().prop_map(|n| (Value::Integer(n), Value::Text(n.to_string()))),
        (-1.0e9f64..1.0e9).prop_map(|f| (Value::Float(f), Value::Text(f.to_string()))),
    ]
}

/// Strategy for generating field rows with distinct field names.
pub fn row_strategy() -> impl Strategy<Value = Row> {
    prop::collection::btree_map(field_name_strategy(), value_strategy(), 0..8)
        .prop_map(|fields| fields.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowunit_value::loosely_equal;

    proptest! {
        #[test]
        fn numeric_pairs_compare_loosely_equal((numeric, text) in numeric_pair_strategy()) {
            prop_assert!(loosely_equal(&numeric, &text));
            prop_assert!(loosely_equal(&text, &numeric));
        }

        #[test]
        fn values_equal_themselves_loosely(value in value_strategy()) {
            prop_assert!(loosely_equal(&value, &value));
        }

        #[test]
        fn generated_rows_have_distinct_fields(row in row_strategy()) {
            let mut names: Vec<_> = row.columns().collect();
            names.sort_unstable();
            let before = names.len();
            names.dedup();
            prop_assert_eq!(before, names.len());
        }
    }
}
