//! SQL query models.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for executing a SQL query.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct QueryRequest {
    /// ID of the connection to use.
    #[serde(default)]
    #[validate(length(min = 1, message = "Connection ID is required"))]
    pub connection_id: String,

    /// SQL statement to execute.
    #[serde(default)]
    #[validate(length(min = 1, message = "SQL statement is required"))]
    pub sql: String,
}

/// A single cell value.
///
/// Serialized as the bare JSON scalar. Byte sequences read from a database
/// are turned into [`Value::Text`] before a row leaves the driver, so
/// [`Value::Bytes`] only appears for values built by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Replaces a byte sequence with its (lossy) UTF-8 text.
    pub fn bytes_to_text(self) -> Self {
        match self {
            Value::Bytes(b) => Value::Text(String::from_utf8_lossy(&b).into_owned()),
            other => other,
        }
    }
}

/// One result row: column name to value, in column order.
///
/// Behaves as a mapping, so a repeated column name keeps its first position
/// and its last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(Vec<(String, Value)>);

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column` to `value`.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.0.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.0.push((column, value)),
        }
    }

    /// Value of `column`, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// First non-empty text value in column order.
    pub fn first_text(&self) -> Option<&str> {
        self.0
            .iter()
            .filter_map(|(_, value)| value.as_str())
            .find(|s| !s.is_empty())
    }

    /// Iterates `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
                let mut row = Row::new();
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    row.insert(name, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// Result of a SQL query execution.
///
/// A statement that fails to execute still produces a result: `columns` and
/// `rows` are empty and `error` carries the database message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Column names in result order.
    pub columns: Vec<String>,

    /// Row data.
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Row>,

    /// Number of rows returned; always `rows.len()`.
    pub row_count: usize,

    /// Execution time in milliseconds.
    pub execution_time: u64,

    /// Statement error, if execution failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// Creates a result from columns and rows, keeping `row_count` in sync.
    pub fn new(columns: Vec<String>, rows: Vec<Row>, execution_time: u64) -> Self {
        Self {
            columns,
            row_count: rows.len(),
            rows,
            execution_time,
            error: None,
        }
    }

    /// Creates the result of a statement that failed to execute.
    pub fn failed(error: impl Into<String>, execution_time: u64) -> Self {
        Self {
            execution_time,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}
