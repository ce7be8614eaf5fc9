use filter_compiler::{CompileError, config::ConfigError};
use formula::FormulaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to deserialize input as JSON: {0}")]
    JsonDeserialize(#[from] serde_json::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Failed to load compiler options: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to compile filter: {0}")]
    Compile(#[from] CompileError),

    #[error("Failed to parse formula: {0}")]
    Formula(#[from] FormulaError),

    #[error("No filter given, pass --filter or --filter-file")]
    MissingFilter,
}
