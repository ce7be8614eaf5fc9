use super::{Column, ColumnKind, ColumnRef, TableId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    /// Physical table name.
    pub name: String,
    /// The column standing in for a whole record when a link column is
    /// filtered directly. Defaults to the first stored column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_column: Option<ColumnRef>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(id: impl Into<TableId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_column: None,
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_display_column(mut self, column: impl Into<ColumnRef>) -> Self {
        self.display_column = Some(column.into());
        self
    }

    pub fn column(&self, reference: &ColumnRef) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.id.as_deref() == Some(reference.as_str()))
            .or_else(|| self.columns.iter().find(|c| c.title == reference.as_str()))
    }

    pub fn display_column(&self) -> Option<&Column> {
        match &self.display_column {
            Some(reference) => self.column(reference),
            None => self
                .columns
                .iter()
                .find(|c| matches!(c.kind, ColumnKind::Stored { .. })),
        }
    }

    /// Tables reachable in one hop through a link column.
    pub fn linked_tables(&self) -> Vec<&TableId> {
        self.columns
            .iter()
            .filter_map(|c| match &c.kind {
                ColumnKind::LinkToRecord(link) => Some([&link.child.table, &link.parent.table]),
                _ => None,
            })
            .flatten()
            .filter(|id| *id != &self.id)
            .collect()
    }
}
