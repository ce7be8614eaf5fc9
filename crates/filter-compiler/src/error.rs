use formula::FormulaError;
use model::{
    filter::ComparisonOp,
    schema::{ColumnRef, TableId},
};
use thiserror::Error;

/// Errors aborting a compile call. No partial predicate is ever returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A table, column or relation could not be resolved.
    #[error("Schema resolution failed: {0}")]
    SchemaResolution(String),

    /// The operator is not valid for the kind of the resolved column.
    #[error("Operator `{op}` is not supported on {kind} column `{column}`")]
    UnsupportedOperator {
        op: ComparisonOp,
        kind: &'static str,
        column: String,
    },

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    /// A lookup, rollup or formula revisits a column already being resolved.
    #[error("Cycle detected while resolving: {0}")]
    CycleDetected(String),

    #[error("Resolution exceeded the maximum depth of {0}")]
    DepthExceeded(usize),

    #[error("Unsupported formula function `{0}`")]
    UnsupportedFunction(String),

    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),

    /// The metadata provider failed to fetch a table.
    #[error("Metadata error: {0}")]
    Metadata(String),
}

impl CompileError {
    pub fn table_not_found(table: &TableId) -> Self {
        CompileError::SchemaResolution(format!("table `{table}` not found"))
    }

    pub fn column_not_found(table: &TableId, column: &ColumnRef) -> Self {
        CompileError::SchemaResolution(format!("column `{column}` not found on table `{table}`"))
    }
}
