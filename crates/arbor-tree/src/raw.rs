//! Raw parsed rows as handed over by an ingestion layer (CSV, JSON, UI).

use std::collections::HashMap;

/// A single parsed field before normalization.
///
/// Deserializes from a JSON number, string, or `null`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A value the parser already typed as a number.
    Number(f64),
    /// A textual field, possibly numeric-looking.
    Text(String),
    /// An empty or absent field.
    Empty,
}

impl RawValue {
    /// Return `true` when the field carries no usable content.
    ///
    /// Whitespace-only text and non-finite numbers count as empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Number(v) => !v.is_finite(),
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::Empty => true,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

/// One raw row: column name to raw value. Columns absent from the map
/// read as [`RawValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RawRow(HashMap<String, RawValue>);

impl RawRow {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, returning the row for chaining.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<RawValue>) {
        self.0.insert(column.into(), value.into());
    }

    /// Return the value of a column, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.0.get(column)
    }
}

/// A header plus raw rows, the input boundary of the engine.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RawDataset {
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

impl RawDataset {
    /// Create a raw dataset from a header and rows.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { columns, rows }
    }

    /// Return the header-derived column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Return the raw rows.
    #[must_use]
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// Return the number of raw rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }
}
