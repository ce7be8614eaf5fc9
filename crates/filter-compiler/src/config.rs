use model::core::dialect::SqlDialect;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_ALIAS_PREFIX: &str = "__nc";
pub const DEFAULT_MAX_DEPTH: usize = 16;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read compiler options: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML compiler options: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON compiler options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported options file `{0}`, expected .toml or .json")]
    UnsupportedFormat(String),

    #[error("Invalid compiler options: {0}")]
    Invalid(String),
}

/// Options of a compile call.
///
/// ```toml
/// dialect = "mysql"
/// alias_prefix = "__nc"
/// max_depth = 16
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    pub dialect: SqlDialect,
    /// Prefix of the aliases minted for joined tables.
    pub alias_prefix: String,
    /// Bound on nested relation and derived-column steps.
    pub max_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            dialect: SqlDialect::default(),
            alias_prefix: DEFAULT_ALIAS_PREFIX.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CompilerOptions {
    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let options: CompilerOptions = toml::from_str(source)?;
        options.validate()
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let options: CompilerOptions = serde_json::from_str(source)?;
        options.validate()
    }

    /// Loads options from a `.toml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.alias_prefix.is_empty() {
            return Err(ConfigError::Invalid("alias_prefix must not be empty".into()));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        Ok(self)
    }
}
