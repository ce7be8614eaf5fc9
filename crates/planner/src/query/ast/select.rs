//! The `SELECT` statements a filter compiles into: correlated subqueries and
//! the outer query a predicate is applied to.

use crate::query::ast::{
    common::{JoinKind, OrderDir, TableSource},
    expr::Expr,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Select {
    /// Projected expressions, e.g. the key a membership subquery returns.
    pub columns: Vec<Expr>,
    pub from: Option<TableSource>,
    /// Join hops, in the order they were walked.
    pub joins: Vec<JoinClause>,
    pub where_clause: Option<Expr>,
    pub order_by: Vec<OrderByExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub source: TableSource,
    /// The join condition, e.g. `ON "__nc0"."tag_id" = "__nc1"."id"`.
    pub on: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub direction: Option<OrderDir>,
}
