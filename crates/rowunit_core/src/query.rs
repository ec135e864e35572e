//! Filtered read query description.

use crate::error::CoreResult;
use rowunit_store::{Connection, Filter};
use rowunit_value::{Row, Value};

/// A scalar value or a sequence of values for a `select_by` match.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    /// A single value; matched by equality.
    One(Value),
    /// A sequence of values; matched by membership.
    Many(Vec<Value>),
}

impl Values {
    /// Creates a single-value match.
    pub fn one(value: impl Into<Value>) -> Self {
        Values::One(value.into())
    }

    /// Creates a membership match.
    pub fn many(values: impl IntoIterator<Item = Value>) -> Self {
        Values::Many(values.into_iter().collect())
    }

    pub(crate) fn into_filter(self, col: &str) -> Filter {
        match self {
            Values::One(value) => Filter::Eq(col.to_owned(), value),
            Values::Many(values) => Filter::In(col.to_owned(), values),
        }
    }
}

impl From<Value> for Values {
    fn from(value: Value) -> Self {
        Values::One(value)
    }
}

impl From<Vec<Value>> for Values {
    fn from(values: Vec<Value>) -> Self {
        Values::Many(values)
    }
}

/// A filtered read over a mapped table.
///
/// The select carries the table, the column-to-field aliases, and an
/// optional filter. Fetched rows are keyed by *field* name, the same
/// re-keying a SQL gateway gets from selecting `column AS field`.
#[derive(Debug, Clone)]
pub struct Select {
    table: String,
    aliases: Vec<(String, String)>,
    filter: Option<Filter>,
}

impl Select {
    /// Creates a select over a table with `(column, field)` aliases.
    pub fn new(table: impl Into<String>, aliases: Vec<(String, String)>) -> Self {
        Self {
            table: table.into(),
            aliases,
            filter: None,
        }
    }

    /// Adds a filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fetches matching rows, re-keyed to field names.
    pub fn fetch(&self, conn: &dyn Connection) -> CoreResult<Vec<Row>> {
        let rows = conn.select_rows(&self.table, self.filter.as_ref())?;
        Ok(rows.iter().map(|row| self.as_fields(row)).collect())
    }

    /// Fetches the first matching row, re-keyed to field names.
    pub fn fetch_one(&self, conn: &dyn Connection) -> CoreResult<Option<Row>> {
        Ok(self.fetch(conn)?.into_iter().next())
    }

    fn as_fields(&self, row: &Row) -> Row {
        let mut fields = Row::new();
        for (col, field) in &self.aliases {
            fields.set(
                field.clone(),
                row.get(col).cloned().unwrap_or(Value::Null),
            );
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowunit_store::{MemoryConnection, TableSchema};

    fn seeded() -> MemoryConnection {
        let conn = MemoryConnection::new();
        conn.create_table(TableSchema::new("people", "id").column("name").required("name"));
        for name in ["Anna", "Betty", "Clara"] {
            let mut row = Row::new();
            row.set("name", name);
            conn.insert_row("people", &row).unwrap();
        }
        conn
    }

    fn aliases() -> Vec<(String, String)> {
        vec![
            ("id".to_owned(), "identity".to_owned()),
            ("name".to_owned(), "first_name".to_owned()),
        ]
    }

    #[test]
    fn fetch_rekeys_columns_to_fields() {
        let conn = seeded();
        let select = Select::new("people", aliases()).filter(Filter::eq("name", "Betty"));
        let rows = select.fetch(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("identity"), Some(&Value::Integer(2)));
        assert_eq!(rows[0].get("first_name"), Some(&Value::Text("Betty".into())));
        assert_eq!(rows[0].get("name"), None);
    }

    #[test]
    fn membership_filter_fetches_each_match() {
        let conn = seeded();
        let filter = Values::many(vec!["Anna".into(), "Clara".into()]).into_filter("name");
        let select = Select::new("people", aliases()).filter(filter);
        assert_eq!(select.fetch(&conn).unwrap().len(), 2);
    }

    #[test]
    fn fetch_one_returns_none_when_empty() {
        let conn = seeded();
        let select = Select::new("people", aliases()).filter(Filter::eq("name", "Doris"));
        assert!(select.fetch_one(&conn).unwrap().is_none());
    }
}
