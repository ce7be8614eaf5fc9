//! Table references shared by the `FROM` and `JOIN` clauses.

/// A physical table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A table in a `FROM` or `JOIN` position, optionally aliased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    pub table: TableRef,
    pub alias: Option<String>,
}

impl TableSource {
    pub fn new(table: TableRef, alias: Option<&str>) -> Self {
        Self {
            table,
            alias: alias.map(String::from),
        }
    }

    /// The name other clauses use to qualify columns of this table.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}
