//! Schema metadata seams.
//!
//! Metadata is fetched up front through the async [`MetadataProvider`] into
//! an immutable [`SchemaSnapshot`]; compilation then resolves columns
//! synchronously through [`ColumnResolver`].

use crate::error::CompileError;
use async_trait::async_trait;
use futures::future::try_join_all;
use model::schema::{Column, ColumnRef, Table, TableId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub trait ColumnResolver {
    fn table(&self, id: &TableId) -> Result<&Table, CompileError>;

    fn resolve_column(&self, table: &TableId, column: &ColumnRef) -> Result<&Column, CompileError> {
        self.table(table)?
            .column(column)
            .ok_or_else(|| CompileError::column_not_found(table, column))
    }
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch_table(&self, id: &TableId) -> Result<Table, CompileError>;
}

/// A point-in-time copy of the tables a compile call may touch.
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    tables: HashMap<TableId, Table>,
}

impl SchemaSnapshot {
    pub fn new(tables: impl IntoIterator<Item = Table>) -> Self {
        Self {
            tables: tables.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn contains(&self, id: &TableId) -> bool {
        self.tables.contains_key(id)
    }

    /// Fetches `root` and every table reachable from it through link
    /// columns, breadth first. Each frontier is fetched concurrently.
    pub async fn load<P>(provider: &P, root: &TableId) -> Result<Self, CompileError>
    where
        P: MetadataProvider + ?Sized,
    {
        let mut tables = HashMap::new();
        let mut seen: HashSet<TableId> = HashSet::from([root.clone()]);
        let mut frontier = vec![root.clone()];
        let mut level = 0;

        while !frontier.is_empty() {
            debug!(level, tables = frontier.len(), "Fetching table metadata");
            let fetched =
                try_join_all(frontier.iter().map(|id| provider.fetch_table(id))).await?;

            let mut next = Vec::new();
            for table in fetched {
                for linked in table.linked_tables() {
                    if seen.insert(linked.clone()) {
                        next.push(linked.clone());
                    }
                }
                tables.insert(table.id.clone(), table);
            }

            frontier = next;
            level += 1;
        }

        Ok(Self { tables })
    }
}

impl ColumnResolver for SchemaSnapshot {
    fn table(&self, id: &TableId) -> Result<&Table, CompileError> {
        self.tables
            .get(id)
            .ok_or_else(|| CompileError::table_not_found(id))
    }
}

/// A provider serving tables from memory, e.g. a parsed schema document.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadata {
    tables: HashMap<TableId, Table>,
}

impl InMemoryMetadata {
    pub fn new(tables: impl IntoIterator<Item = Table>) -> Self {
        Self {
            tables: tables.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }
}

#[async_trait]
impl MetadataProvider for InMemoryMetadata {
    async fn fetch_table(&self, id: &TableId) -> Result<Table, CompileError> {
        self.tables
            .get(id)
            .cloned()
            .ok_or_else(|| CompileError::Metadata(format!("no metadata for table `{id}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::schema::{KeyRef, LinkToRecord};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tables() -> Vec<Table> {
        vec![
            Table::new("orders", "orders")
                .with_column(Column::stored("Id", "id"))
                .with_column(Column::link(
                    "Customer",
                    LinkToRecord::belongs_to(
                        KeyRef::new("orders", "customer_id"),
                        KeyRef::new("customers", "id"),
                    ),
                )),
            Table::new("customers", "customers")
                .with_column(Column::stored("Id", "id"))
                .with_column(Column::link(
                    "Orders",
                    LinkToRecord::has_many(
                        KeyRef::new("customers", "id"),
                        KeyRef::new("orders", "customer_id"),
                    ),
                )),
            Table::new("unrelated", "unrelated").with_column(Column::stored("Id", "id")),
        ]
    }

    struct CountingProvider {
        inner: InMemoryMetadata,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataProvider for CountingProvider {
        async fn fetch_table(&self, id: &TableId) -> Result<Table, CompileError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_table(id).await
        }
    }

    #[tokio::test]
    async fn test_load_follows_links_once() {
        let provider = CountingProvider {
            inner: InMemoryMetadata::new(tables()),
            calls: AtomicUsize::new(0),
        };
        let snapshot = SchemaSnapshot::load(&provider, &"orders".into()).await.unwrap();

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains(&"customers".into()));
        assert!(!snapshot.contains(&"unrelated".into()));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_surfaces_provider_errors() {
        let provider = InMemoryMetadata::new(tables().into_iter().skip(1));
        let err = SchemaSnapshot::load(&provider, &"orders".into()).await.unwrap_err();
        assert!(matches!(err, CompileError::Metadata(_)));
    }

    #[test]
    fn test_resolve_column() {
        let snapshot = SchemaSnapshot::new(tables());
        let column = snapshot
            .resolve_column(&"orders".into(), &"Customer".into())
            .unwrap();
        assert_eq!(column.title, "Customer");

        let err = snapshot
            .resolve_column(&"orders".into(), &"Missing".into())
            .unwrap_err();
        assert!(matches!(err, CompileError::SchemaResolution(_)));
        assert!(matches!(
            snapshot.table(&"nope".into()),
            Err(CompileError::SchemaResolution(_))
        ));
    }
}
