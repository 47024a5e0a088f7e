//! Data model for the ingestion pipeline
//!
//! A raw CSV row becomes a [`NormalizedRecord`] (mapper), its string values
//! are replaced by typed [`Value`]s (coercer), and records are finally
//! consumed into per-table [`TableProjection`]s grouped in a
//! [`SourceDataset`] (sharder), the unit of transactional persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::source::Source;

/// A scalar value carried by a normalized record or a projected row.
///
/// Typed nulls (`Int(None)`, `Float(None)`, `Text(None)`) keep enough
/// information for the persistence layer to bind NULL with the parameter
/// type the destination column expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Free-form text, including date strings (storage owns date parsing)
    Text(Option<String>),
    /// Integer field (e.g. employee counts)
    Int(Option<i64>),
    /// Floating-point field (e.g. revenue figures)
    Float(Option<f64>),
    /// Surrogate-key column
    Id(Uuid),
    /// Row bookkeeping timestamp (`created_at` / `updated_at`)
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Owned text value
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(Some(s.into()))
    }

    /// True for any of the typed null variants
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Text(None) | Value::Int(None) | Value::Float(None)
        )
    }

    /// Borrow the inner string of a non-null text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(Some(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// One source row after mapping: semantic field names, typed values, and a
/// surrogate key that joins every projection derived from this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Surrogate key, unique within a run
    pub id: Uuid,
    fields: BTreeMap<String, Value>,
}

impl NormalizedRecord {
    /// Create an empty record with the given identity
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    /// Set a field value, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Look up a field by its semantic name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Mutable lookup, used by the coercer to convert values in place
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Whether the record carries the given field
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over field names in deterministic order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields (identity excluded)
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One destination table's share of a source dataset: an ordered column list
/// and rows whose values are positionally aligned with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProjection {
    /// Destination table name
    pub table_name: String,
    /// Column order used for every row and for the generated INSERT
    pub columns: Vec<String>,
    /// Row values, aligned with `columns`
    pub rows: Vec<Vec<Value>>,
}

impl TableProjection {
    /// Create an empty projection for a table
    pub fn new(table_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; its values must align with the projection's columns
    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Position of a column in the row layout
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Value at (row, column), if both exist
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the projection holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything produced from one source file, ready for persistence.
///
/// Projections are ordered parent-first so that foreign keys resolve when
/// they are inserted in order inside one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDataset {
    /// Source this dataset was produced from
    pub source: Source,
    /// Instant stamped on every row as `created_at` / `updated_at`
    pub prepared_at: DateTime<Utc>,
    /// Per-table projections in insert order
    pub projections: Vec<TableProjection>,
}

impl SourceDataset {
    /// Look up a projection by destination table name
    pub fn projection(&self, table_name: &str) -> Option<&TableProjection> {
        self.projections
            .iter()
            .find(|p| p.table_name == table_name)
    }

    /// Total number of rows across all projections
    pub fn total_rows(&self) -> usize {
        self.projections.iter().map(TableProjection::len).sum()
    }
}
