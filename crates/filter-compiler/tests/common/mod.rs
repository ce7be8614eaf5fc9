#![allow(dead_code)]

use filter_compiler::{CompileError, CompiledPredicate, CompilerOptions, SchemaSnapshot, compile};
use model::{
    core::{dialect::SqlDialect, value::Value},
    filter::{ComparisonOp, FilterNode},
    schema::{AggregateFn, Column, Junction, KeyRef, LinkToRecord, Table},
};
use serde_json::json;

pub fn customers() -> Table {
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
        .with_column(Column::rollup("Order Total", "Orders", "Amount", AggregateFn::Sum))
        .with_column(Column::rollup("Tag Count", "Tags", "Id", AggregateFn::CountDistinct))
        .with_column(Column::lookup("Region Name", "Region", "Name"))
        .with_column(Column::lookup("Order Status", "Orders", "Status"))
        .with_column(Column::formula("Label", "{Name} & ' (' & {Region Name} & ')'"))
}

pub fn orders() -> Table {
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

pub fn tags() -> Table {
    Table::new("tags", "tags")
        .with_display_column("Title")
        .with_column(Column::stored("Id", "id"))
        .with_column(Column::stored("Title", "title"))
}

pub fn regions() -> Table {
    Table::new("regions", "regions")
        .with_column(Column::stored("Name", "name"))
        .with_column(Column::stored("Id", "id"))
}

pub fn snapshot() -> SchemaSnapshot {
    SchemaSnapshot::new([customers(), orders(), tags(), regions()])
}

pub fn cond(column: &str, op: ComparisonOp, value: serde_json::Value) -> FilterNode {
    FilterNode::condition(column, op, Some(value))
}

pub fn test(column: &str, op: ComparisonOp) -> FilterNode {
    FilterNode::condition(column, op, None)
}

pub fn try_compile(table: &str, filter: &FilterNode) -> Result<CompiledPredicate, CompileError> {
    compile(filter, &table.into(), &snapshot(), &CompilerOptions::default())
}

pub fn render(table: &str, filter: &FilterNode) -> (String, Vec<Value>) {
    sql_for(table, filter, SqlDialect::Postgres)
}

pub fn sql_for(table: &str, filter: &FilterNode, dialect: SqlDialect) -> (String, Vec<Value>) {
    let options = CompilerOptions::default().with_dialect(dialect);
    compile(filter, &table.into(), &snapshot(), &options)
        .unwrap()
        .to_sql(dialect)
}

pub fn s(value: &str) -> Value {
    Value::from(value)
}

pub fn eq(column: &str, value: serde_json::Value) -> FilterNode {
    cond(column, ComparisonOp::Eq, value)
}

pub fn acme() -> serde_json::Value {
    json!("Acme")
}
