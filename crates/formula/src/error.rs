use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Invalid formula: {0}")]
    Parse(String),

    #[error("Invalid number literal `{0}`")]
    InvalidNumber(String),

    #[error("Unexpected `{0}` in formula")]
    Unexpected(String),
}
