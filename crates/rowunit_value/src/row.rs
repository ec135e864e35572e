//! Ordered column-to-value payload.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// An ordered mapping from column names to values.
///
/// Rows preserve insertion order, which becomes the column order of the
/// statement built from the payload. Setting an existing column replaces its
/// value in place without disturbing the order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cols: Vec<(String, Value)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cols.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }

    /// Sets a column value, replacing in place if the column exists.
    pub fn set(&mut self, col: impl Into<String>, value: impl Into<Value>) {
        let col = col.into();
        let value = value.into();
        if let Some(slot) = self.cols.iter_mut().find(|(c, _)| *c == col) {
            slot.1 = value;
        } else {
            self.cols.push((col, value));
        }
    }

    /// Returns the value for a column, if present.
    #[must_use]
    pub fn get(&self, col: &str) -> Option<&Value> {
        self.cols.iter().find(|(c, _)| c == col).map(|(_, v)| v)
    }

    /// Returns true if the row contains the column.
    #[must_use]
    pub fn contains(&self, col: &str) -> bool {
        self.get(col).is_some()
    }

    /// Removes a column, returning its value if it was present.
    pub fn remove(&mut self, col: &str) -> Option<Value> {
        let idx = self.cols.iter().position(|(c, _)| c == col)?;
        Some(self.cols.remove(idx).1)
    }

    /// Iterates over (column, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cols.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Returns the column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cols.iter().map(|(c, _)| c.as_str())
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (col, value) in iter {
            row.set(col, value);
        }
        row
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a str, &'a Value);
    type IntoIter = std::vec::IntoIter<(&'a str, &'a Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.cols
            .iter()
            .map(|(c, v)| (c.as_str(), v))
            .collect::<Vec<_>>()
            .into_iter()
    }
}
