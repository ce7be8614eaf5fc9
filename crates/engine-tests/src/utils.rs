#![allow(dead_code)]

use filter_compiler::{CompileError, CompilerOptions, SchemaSnapshot, compile};
use model::{
    core::{dialect::SqlDialect, value::Value},
    filter::{ComparisonOp, FilterNode},
    schema::{AggregateFn, Column, Junction, KeyRef, LinkToRecord, Table, TableId},
};
use planner::{
    query::{ast::common::OrderDir, builder::select::SelectBuilder, dialect::Sqlite, qualified, renderer::render},
    table_ref,
};
use sqlx::{Row, SqlitePool};

/// DDL of the fixture database: customers with orders (has-many), tags
/// (many-to-many through `customer_tags`) and a region (belongs-to), plus a
/// flat `flags` table for truth-table checks.
pub const FIXTURE_DDL: &str = r#"
    CREATE TABLE regions (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );
    CREATE TABLE customers (
        id INTEGER PRIMARY KEY,
        name TEXT,
        region_id INTEGER REFERENCES regions (id)
    );
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY,
        customer_id INTEGER REFERENCES customers (id),
        amount INTEGER NOT NULL,
        status TEXT NOT NULL
    );
    CREATE TABLE tags (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL
    );
    CREATE TABLE customer_tags (
        customer_id INTEGER NOT NULL REFERENCES customers (id),
        tag_id INTEGER NOT NULL REFERENCES tags (id)
    );
    CREATE TABLE flags (
        id INTEGER PRIMARY KEY,
        a INTEGER NOT NULL,
        b INTEGER NOT NULL,
        c INTEGER NOT NULL
    );
"#;

/// Fixture rows.
///
/// - customers 3, 5 and 6 have no orders; 3, 5 and 6 have no tags
/// - customer 5 has an empty name, customer 6 a NULL name
/// - order 6 belongs to no customer
/// - `flags` holds one row per combination of a/b/c hitting 1/2/3
pub const FIXTURE_ROWS: &str = r#"
    INSERT INTO regions (id, name) VALUES (1, 'EU'), (2, 'US');
    INSERT INTO customers (id, name, region_id) VALUES
        (1, 'Acme Corp', 1),
        (2, 'Globex', 2),
        (3, 'Initech', NULL),
        (4, 'Acme Labs', 2),
        (5, '', 1),
        (6, NULL, NULL);
    INSERT INTO orders (id, customer_id, amount, status) VALUES
        (1, 1, 100, 'paid'),
        (2, 1, 250, 'pending'),
        (3, 2, 80, 'paid'),
        (4, 4, 500, 'refunded'),
        (5, 4, 20, 'paid'),
        (6, NULL, 40, 'paid');
    INSERT INTO tags (id, title) VALUES (1, 'vip'), (2, 'churn-risk'), (3, 'partner');
    INSERT INTO customer_tags (customer_id, tag_id) VALUES (1, 1), (1, 3), (2, 2), (4, 1);
    INSERT INTO flags (id, a, b, c) VALUES
        (0, 0, 0, 0),
        (1, 0, 0, 3),
        (2, 0, 2, 0),
        (3, 0, 2, 3),
        (4, 1, 0, 0),
        (5, 1, 0, 3),
        (6, 1, 2, 0),
        (7, 1, 2, 3);
"#;

pub fn customers_table() -> Table {
    Table::new("customers", "customers")
        .with_display_column("Name")
        .with_column(Column::stored("Id", "id"))
        .with_column(Column::stored("Name", "name"))
        .with_column(Column::link(
            "Orders",
            LinkToRecord::has_many(
                KeyRef::new("customers", "id"),
                KeyRef::new("orders", "customer_id"),
            ),
        ))
        .with_column(Column::link(
            "Tags",
            LinkToRecord::many_to_many(
                KeyRef::new("customers", "id"),
                KeyRef::new("tags", "id"),
                Junction {
                    table: "customer_tags".into(),
                    child_key: "customer_id".into(),
                    parent_key: "tag_id".into(),
                },
            ),
        ))
        .with_column(Column::link(
            "Region",
            LinkToRecord::belongs_to(
                KeyRef::new("customers", "region_id"),
                KeyRef::new("regions", "id"),
            ),
        ))
        .with_column(Column::lookup("Region Name", "Region", "Name"))
        .with_column(Column::lookup("Order Amounts", "Orders", "Amount"))
        .with_column(Column::rollup("Order Total", "Orders", "Amount", AggregateFn::Sum))
        .with_column(Column::rollup("Tag Count", "Tags", "Id", AggregateFn::CountDistinct))
        .with_column(Column::formula("Label", "{Name} & ' (' & {Region Name} & ')'"))
}

pub fn orders_table() -> Table {
    Table::new("orders", "orders")
        .with_display_column("Status")
        .with_column(Column::stored("Id", "id"))
        .with_column(Column::stored("Amount", "amount"))
        .with_column(Column::stored("Status", "status"))
        .with_column(Column::link(
            "Customer",
            LinkToRecord::belongs_to(
                KeyRef::new("orders", "customer_id"),
                KeyRef::new("customers", "id"),
            ),
        ))
        .with_column(Column::lookup("Customer Name", "Customer", "Name"))
        .with_column(Column::lookup("Customer Region", "Customer", "Region Name"))
        .with_column(Column::lookup("Customer Tags", "Customer", "Tags"))
        .with_column(Column::formula("Doubled", "{Amount} * 2"))
}

pub fn schema() -> SchemaSnapshot {
    SchemaSnapshot::new([
        customers_table(),
        orders_table(),
        Table::new("tags", "tags")
            .with_display_column("Title")
            .with_column(Column::stored("Id", "id"))
            .with_column(Column::stored("Title", "title")),
        Table::new("regions", "regions")
            .with_display_column("Name")
            .with_column(Column::stored("Id", "id"))
            .with_column(Column::stored("Name", "name")),
        Table::new("flags", "flags")
            .with_column(Column::stored("Id", "id"))
            .with_column(Column::stored("A", "a"))
            .with_column(Column::stored("B", "b"))
            .with_column(Column::stored("C", "c")),
    ])
}

pub fn cond(column: &str, op: ComparisonOp, value: serde_json::Value) -> FilterNode {
    FilterNode::condition(column, op, Some(value))
}

pub fn test(column: &str, op: ComparisonOp) -> FilterNode {
    FilterNode::condition(column, op, None)
}

/// Compiles `filter` for SQLite as `SELECT id FROM table WHERE ... ORDER BY id`.
pub fn filtered_query(table: &str, filter: &FilterNode) -> Result<(String, Vec<Value>), CompileError> {
    let snapshot = schema();
    let options = CompilerOptions::default().with_dialect(SqlDialect::Sqlite);
    let predicate = compile(filter, &TableId::new(table), &snapshot, &options)?;

    let query = SelectBuilder::new()
        .select(vec![qualified(table, "id")])
        .from(table_ref!(table), None);
    let select = predicate
        .apply(query)
        .order_by(qualified(table, "id"), Some(OrderDir::Asc))
        .build();

    Ok(render(&select, &Sqlite))
}

/// Ids of the rows of `table` matching `filter`, ascending.
pub async fn matching_ids(pool: &SqlitePool, table: &str, filter: &FilterNode) -> Vec<i64> {
    let (sql, params) = filtered_query(table, filter).expect("compile filter");
    tracing::info!("Running {sql} with {} parameter(s)", params.len());

    let mut query = sqlx::query(&sql);
    for param in params {
        query = match param {
            Value::Int(v) => query.bind(v),
            Value::Float(v) => query.bind(v),
            Value::String(v) => query.bind(v),
            Value::Boolean(v) => query.bind(v),
            Value::Null => query.bind(None::<String>),
            other => query.bind(other.to_string()),
        };
    }

    let rows = query.fetch_all(pool).await.expect("run compiled query");
    rows.iter().map(|row| row.get::<i64, _>(0)).collect()
}
