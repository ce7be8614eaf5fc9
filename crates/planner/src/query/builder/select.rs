//! A typestate builder for `Select` ASTs.
//!
//! A query is only usable once it has a projection and a `FROM` table, so
//! `join`, `and_where` and `build` exist only on [`SelectBuilder<FromState>`].

use std::marker::PhantomData;

use crate::query::ast::{
    common::{JoinKind, OrderDir, TableRef, TableSource},
    expr::Expr,
    select::{JoinClause, OrderByExpr, Select},
};

#[derive(Debug, Clone)]
pub struct InitialState;

#[derive(Debug, Clone)]
pub struct SelectState;

#[derive(Debug, Clone)]
pub struct FromState;

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    ast: Select,
    state: PhantomData<State>,
}

impl<State> SelectBuilder<State> {
    fn into_state<Next>(self) -> SelectBuilder<Next> {
        SelectBuilder {
            ast: self.ast,
            state: PhantomData,
        }
    }
}

impl Default for SelectBuilder<InitialState> {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectBuilder<InitialState> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            state: PhantomData,
        }
    }

    pub fn select(mut self, columns: Vec<Expr>) -> SelectBuilder<SelectState> {
        self.ast.columns = columns;
        self.into_state()
    }
}

impl SelectBuilder<SelectState> {
    pub fn from(mut self, table: TableRef, alias: Option<&str>) -> SelectBuilder<FromState> {
        self.ast.from = Some(TableSource::new(table, alias));
        self.into_state()
    }
}

impl SelectBuilder<FromState> {
    pub fn join(mut self, kind: JoinKind, table: TableRef, alias: Option<&str>, on: Expr) -> Self {
        self.ast.joins.push(JoinClause {
            kind,
            source: TableSource::new(table, alias),
            on,
        });
        self
    }

    /// One join hop of a relation walk: always inner and always aliased.
    pub fn inner_join(self, table: TableRef, alias: &str, on: Expr) -> Self {
        self.join(JoinKind::Inner, table, Some(alias), on)
    }

    /// Sets the `WHERE` clause, replacing any existing condition.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    /// ANDs a condition onto the existing `WHERE` clause.
    pub fn and_where(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(match self.ast.where_clause.take() {
            Some(existing) => Expr::and(existing, condition),
            None => condition,
        });
        self
    }

    pub fn order_by(mut self, expr: Expr, direction: Option<OrderDir>) -> Self {
        self.ast.order_by.push(OrderByExpr { expr, direction });
        self
    }

    pub fn build(self) -> Select {
        self.ast
    }
}
