//! Defines the `Dialect` trait for database-specific SQL syntax.

use model::core::dialect::SqlDialect;

/// How a case-sensitive pattern match is written on a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSensitiveMatch {
    /// Plain `LIKE` already respects case.
    Like,
    /// `LIKE BINARY`, comparing bytes instead of the column collation.
    LikeBinary,
    /// `GLOB`, with the `LIKE` wildcards translated.
    Glob,
}

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - PostgreSQL and SQLite use double quotes: `"my_column"`
    /// - MySQL uses backticks: `` `my_column` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for a parameterized query.
    ///
    /// - PostgreSQL uses `$1`, `$2`, etc.
    /// - MySQL and SQLite use `?`
    fn get_placeholder(&self, index: usize) -> String;

    /// Returns the name of the dialect (e.g., "PostgreSQL", "MySQL").
    fn name(&self) -> String;

    /// Whether the dialect has a native case-insensitive `ILIKE`.
    fn supports_ilike(&self) -> bool {
        false
    }

    /// The form used for a case-sensitive `LIKE`.
    fn case_sensitive_match(&self) -> CaseSensitiveMatch {
        CaseSensitiveMatch::Like
    }

    /// The infix operator used for boolean exclusive-or.
    fn xor_operator(&self) -> &'static str {
        " <> "
    }

    /// The infix string concatenation operator, or `None` when the dialect
    /// only offers a `CONCAT()` function.
    fn concat_operator(&self) -> Option<&'static str> {
        Some(" || ")
    }
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', r#""""#))
    }

    fn get_placeholder(&self, index: usize) -> String {
        // PostgreSQL uses $1, $2, etc.
        format!("${}", index + 1)
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }

    fn supports_ilike(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct MySql;

impl Dialect for MySql {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn get_placeholder(&self, _index: usize) -> String {
        // MySQL uses ?
        "?".into()
    }

    fn name(&self) -> String {
        "MySQL".into()
    }

    fn case_sensitive_match(&self) -> CaseSensitiveMatch {
        // The default collations fold case.
        CaseSensitiveMatch::LikeBinary
    }

    fn xor_operator(&self) -> &'static str {
        " XOR "
    }

    fn concat_operator(&self) -> Option<&'static str> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', r#""""#))
    }

    fn get_placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn name(&self) -> String {
        "SQLite".into()
    }

    fn case_sensitive_match(&self) -> CaseSensitiveMatch {
        // LIKE folds ASCII case regardless of collation.
        CaseSensitiveMatch::Glob
    }
}

/// Returns the rendering dialect for a configured target database.
pub fn for_sql_dialect(dialect: SqlDialect) -> Box<dyn Dialect> {
    match dialect {
        SqlDialect::Postgres => Box::new(Postgres),
        SqlDialect::MySql => Box::new(MySql),
        SqlDialect::Sqlite => Box::new(Sqlite),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting_escapes_embedded_quotes() {
        assert_eq!(Postgres.quote_identifier(r#"we"ird"#), r#""we""ird""#);
        assert_eq!(MySql.quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Postgres.get_placeholder(0), "$1");
        assert_eq!(MySql.get_placeholder(3), "?");
        assert_eq!(Sqlite.get_placeholder(3), "?");
    }

    #[test]
    fn test_for_sql_dialect() {
        assert_eq!(for_sql_dialect(SqlDialect::MySql).name(), "MySQL");
        assert!(for_sql_dialect(SqlDialect::Postgres).supports_ilike());
        assert!(!for_sql_dialect(SqlDialect::Sqlite).supports_ilike());
    }

    #[test]
    fn test_case_sensitive_match_forms() {
        assert_eq!(Postgres.case_sensitive_match(), CaseSensitiveMatch::Like);
        assert_eq!(MySql.case_sensitive_match(), CaseSensitiveMatch::LikeBinary);
        assert_eq!(Sqlite.case_sensitive_match(), CaseSensitiveMatch::Glob);
    }
}
