//! Row-oriented boundary table for the tabular interface.
//!
//! Dataset ingestion (CSV parsing, database reads, column typing) is an
//! external collaborator; this module only defines the in-memory structure
//! that collaborator hands to [`crate::builder::HarmonicLabeler::predict_table`]:
//! named columns of [`Value`] cells, where a missing target cell marks an
//! observation as unlabelled.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single table cell.
///
/// Target columns may hold any mix of `Number`/`Text` as class labels;
/// feature columns must be `Number` in every row. `Missing` in the target
/// column marks the row as unlabelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the cell, `None` for text or missing cells.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Missing => write!(f, "<missing>"),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Column selectors for one `predict_table` call: which column carries the
/// class labels, which columns are features, and (optionally) which column
/// supplies per-row identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    pub target: String,
    pub features: Vec<String>,
    pub id: Option<String>,
}

impl TableSpec {
    pub fn new(
        target: impl Into<String>,
        features: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            target: target.into(),
            features: features.into_iter().map(Into::into).collect(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A row-oriented table with named columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from headers and rows. Every row must have one cell per
    /// header.
    pub fn new(
        headers: impl IntoIterator<Item = impl Into<String>>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(Error::invalid(format!(
                    "row {} has {} cells, expected {}",
                    i + 1,
                    row.len(),
                    headers.len()
                )));
            }
        }
        Ok(Self { headers, rows })
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Resolve a column name to its index.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::invalid(format!("unknown column '{name}'")))
    }

    /// Cell at (row, column index). Callers obtain the index via
    /// [`Table::column_index`]; out-of-bounds access panics.
    pub fn cell(&self, row: usize, col: usize) -> &Value {
        &self.rows[row][col]
    }

    /// Append one row.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(Error::invalid(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.headers.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }
}
