use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The SQL flavours the compiler knows how to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Postgres,
    MySql,
    Sqlite,
}

impl SqlDialect {
    /// Pattern matching is case-insensitive (`ILIKE`) only on Postgres.
    pub fn case_insensitive_like(&self) -> bool {
        matches!(self, SqlDialect::Postgres)
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(SqlDialect::Postgres),
            "mysql" | "mysql2" | "mariadb" => Ok(SqlDialect::MySql),
            "sqlite" | "sqlite3" => Ok(SqlDialect::Sqlite),
            other => Err(format!("unknown SQL dialect `{other}`")),
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::Postgres => write!(f, "postgres"),
            SqlDialect::MySql => write!(f, "mysql"),
            SqlDialect::Sqlite => write!(f, "sqlite"),
        }
    }
}
