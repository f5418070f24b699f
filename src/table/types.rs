// src/table/types.rs

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, sync::Arc};

/// Accessor key reserved for the synthetic row identity.
pub const ROW_ID_KEY: &str = "id";

/// A coerced cell: a finite number, or the cleaned text when it does not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// A display header bound to its unique, machine-safe accessor key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub header: String,
    pub accessor_key: String,
}

/// One data row. `cells` holds exactly one entry per column of the owning snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: String,
    #[serde(flatten)]
    pub cells: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.get(key)
    }
}

/// The columns and rows of one successful normalization, always replaced together.
///
/// Rows sit behind `Arc` so an edited snapshot can share every untouched row with the
/// snapshot it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub columns: Vec<Column>,
    pub rows: Vec<Arc<Row>>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn row(&self, id: &str) -> Option<&Arc<Row>> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.accessor_key == key)
    }
}
