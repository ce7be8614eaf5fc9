//! Parser for the spreadsheet-style formula language of formula columns.
//!
//! `{Column}` and `{{Column}}` reference other columns of the same table,
//! `&` concatenates strings and function names are case-insensitive.

pub mod error;
pub mod parser;

pub use error::FormulaError;
pub use parser::parse;

use model::schema::{ColumnRef, FormulaDef, FormulaExpr};

/// Parses the formula if it is still source text.
pub fn resolve(def: &FormulaDef) -> Result<FormulaExpr, FormulaError> {
    match def {
        FormulaDef::Source(source) => parse(source),
        FormulaDef::Parsed(expr) => Ok(expr.clone()),
    }
}

/// Columns referenced by a formula source, in order of appearance.
pub fn references(source: &str) -> Result<Vec<ColumnRef>, FormulaError> {
    Ok(parse(source)?
        .references()
        .into_iter()
        .cloned()
        .collect())
}
