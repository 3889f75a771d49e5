//! Typed attribute tables for graph entities
//!
//! An [`AttrTable`] is an ordered collection of named columns, one row per
//! entity (node or edge). The reserved `name` column holds the entity
//! identifiers and is unique within a table; it is the only handle that
//! stays stable across structural transformations of the owning network.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur in attribute table operations
#[derive(Debug, Error)]
pub enum TableError {
    #[error("duplicate identifier in '{NAME_COLUMN}' column: {0}")]
    DuplicateIdentifier(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("column '{column}' has {actual} values but the table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("column already exists: {0}")]
    DuplicateColumn(String),
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Reserved identifier column, present in every table
pub const NAME_COLUMN: &str = "name";

/// A typed attribute value
///
/// Serializes untagged: `"label"`, `3.5`, `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl AttrValue {
    /// Human-readable type name, used in comparison errors
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Str(_) => "string",
            AttrValue::Num(_) => "number",
            AttrValue::Bool(_) => "boolean",
        }
    }

    /// Get the string value, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric value, if this is a number
    pub fn as_num(&self) -> Option<f64> {
        match self {
            AttrValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the boolean value, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Str(s) => write!(f, "{}", s),
            AttrValue::Num(n) => write!(f, "{}", n),
            AttrValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Num(n)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Num(n as f64)
    }
}

impl From<usize> for AttrValue {
    fn from(n: usize) -> Self {
        AttrValue::Num(n as f64)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

/// A named column of attribute values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// One value per row
    pub values: Vec<AttrValue>,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, values: Vec<AttrValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// An ordered column store with one row per entity
///
/// Invariants: the `name` column is always present and unique; every
/// column has exactly `row_count` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrTable {
    columns: Vec<Column>,
}

impl AttrTable {
    /// Build a table from entity identifiers
    ///
    /// Fails with `DuplicateIdentifier` if the identifiers are not unique.
    pub fn from_names(names: Vec<String>) -> TableResult<Self> {
        let mut seen: HashSet<&str> = HashSet::new();
        for name in &names {
            if !seen.insert(name) {
                return Err(TableError::DuplicateIdentifier(name.clone()));
            }
        }
        let values = names.into_iter().map(AttrValue::Str).collect();
        Ok(Self {
            columns: vec![Column::new(NAME_COLUMN, values)],
        })
    }

    /// Number of rows (entities)
    pub fn row_count(&self) -> usize {
        self.columns[0].values.len()
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Check if a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Get a column's values
    pub fn get(&self, name: &str) -> TableResult<&[AttrValue]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    /// The `name` column values
    pub fn names(&self) -> &[AttrValue] {
        &self.columns[0].values
    }

    /// Row index of the given identifier in the `name` column
    pub fn row_of(&self, name: &str) -> Option<usize> {
        self.names()
            .iter()
            .position(|v| v.as_str() == Some(name))
    }

    /// All row indices whose `column` value equals `value`
    pub fn positions_of(&self, column: &str, value: &AttrValue) -> TableResult<Vec<usize>> {
        let values = self.get(column)?;
        Ok(values
            .iter()
            .enumerate()
            .filter(|(_, v)| *v == value)
            .map(|(i, _)| i)
            .collect())
    }

    /// Add a static column
    ///
    /// Fails with `DuplicateColumn` if the name is taken (use
    /// [`replace_column`](Self::replace_column) for explicit re-annotation)
    /// and with `LengthMismatch` if `values` does not match the row count.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<AttrValue>) -> TableResult<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(TableError::DuplicateColumn(name));
        }
        if values.len() != self.row_count() {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.row_count(),
                actual: values.len(),
            });
        }
        self.columns.push(Column::new(name, values));
        Ok(())
    }

    /// Replace an existing column's values
    pub fn replace_column(&mut self, name: &str, values: Vec<AttrValue>) -> TableResult<()> {
        if values.len() != self.row_count() {
            return Err(TableError::LengthMismatch {
                column: name.to_string(),
                expected: self.row_count(),
                actual: values.len(),
            });
        }
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;
        column.values = values;
        Ok(())
    }

    /// New table containing only the given rows, preserving column set and order
    pub fn rows(&self, indices: &[usize]) -> AttrTable {
        debug_assert!(indices.iter().all(|&i| i < self.row_count()));
        AttrTable {
            columns: self
                .columns
                .iter()
                .map(|c| {
                    Column::new(
                        c.name.clone(),
                        indices.iter().map(|&i| c.values[i].clone()).collect(),
                    )
                })
                .collect(),
        }
    }
}
