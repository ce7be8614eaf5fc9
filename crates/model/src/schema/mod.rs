//! Table and column metadata as seen by the filter compiler.
//!
//! Everything here is a read-only snapshot. Persisting and caching it is the
//! job of whoever owns the schema.

pub mod column;
pub mod formula;
pub mod relation;
pub mod table;

pub use column::{AggregateFn, Column, ColumnKind};
pub use formula::{FormulaDef, FormulaExpr, FormulaOp};
pub use relation::{Junction, KeyRef, LinkToRecord, RelationKind};
pub use table::Table;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a table in the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TableId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TableId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference to a logical column, by id or by title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnRef(String);

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for ColumnRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ColumnRef {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
