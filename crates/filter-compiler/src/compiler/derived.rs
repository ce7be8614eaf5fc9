//! Materialises rollup and formula columns as SQL expressions.

use super::{ConditionCompiler, Scope, relation::RelationSubqueryBuilder};
use crate::{error::CompileError, resolver::ColumnResolver};
use model::{
    core::{dialect::SqlDialect, value::Value},
    schema::{AggregateFn, Column, ColumnKind, ColumnRef, FormulaExpr, FormulaOp, RelationKind},
};
use planner::query::ast::expr::{BinaryOperator, Expr, FunctionCall};

impl<'a, R> ConditionCompiler<'a, R>
where
    R: ColumnResolver + ?Sized,
{
    pub(super) fn derived_expr(
        &mut self,
        column: &'a Column,
        scope: &Scope<'a>,
    ) -> Result<Expr, CompileError> {
        self.guarded(&scope.table.id, column, |this| match &column.kind {
            ColumnKind::Rollup {
                relation,
                target,
                function,
            } => this.rollup_expr(relation, target, *function, scope),
            ColumnKind::Formula { expression } => {
                let parsed = formula::resolve(expression)?;
                this.formula_expr(&parsed, scope)
            }
            other => Err(CompileError::SchemaResolution(format!(
                "`{}` is a {} column, not a derived one",
                column.title,
                other.name()
            ))),
        })
    }

    /// `(SELECT fn(r.target) FROM related AS r ... WHERE r.key = outer.key)`
    fn rollup_expr(
        &mut self,
        relation: &ColumnRef,
        target: &ColumnRef,
        function: AggregateFn,
        scope: &Scope<'a>,
    ) -> Result<Expr, CompileError> {
        let (_, link) = self.link_column(&scope.table.id, relation)?;
        let related = self.table(link.related_table())?;
        let ColumnKind::Stored { column_name } = &self.column(&related.id, target)?.kind else {
            return Err(CompileError::SchemaResolution(format!(
                "rollup target `{target}` on table `{}` must be a stored column",
                related.id
            )));
        };

        let subquery = RelationSubqueryBuilder::new(link, related, &mut self.aliases)?;
        let (name, distinct) = function.sql();
        let mut call = FunctionCall::new(name, vec![subquery.related_scope().column(column_name)]);
        call.distinct = distinct;

        let select = subquery
            .correlated(scope, vec![Expr::FunctionCall(call)])
            .build();
        Ok(Expr::subquery(select))
    }

    fn formula_expr(&mut self, expr: &FormulaExpr, scope: &Scope<'a>) -> Result<Expr, CompileError> {
        match expr {
            FormulaExpr::Literal(value) => Ok(Expr::Value(value.clone())),
            FormulaExpr::Column(reference) => {
                let column = self.column(&scope.table.id, reference)?;
                self.column_expr(column, scope)
            }
            FormulaExpr::Negate(inner) => Ok(Expr::binary(
                Expr::Value(Value::Int(0)),
                BinaryOperator::Minus,
                self.formula_expr(inner, scope)?,
            )),
            FormulaExpr::Binary { op, left, right } => {
                let left = self.formula_expr(left, scope)?;
                let right = self.formula_expr(right, scope)?;
                Ok(Expr::binary(left, binary_operator(*op), right))
            }
            FormulaExpr::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.formula_expr(arg, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                function_call(self.translator.dialect(), name, args)
            }
        }
    }

    /// The value of a column referenced from a formula.
    fn column_expr(&mut self, column: &'a Column, scope: &Scope<'a>) -> Result<Expr, CompileError> {
        match &column.kind {
            ColumnKind::Stored { column_name } => Ok(scope.column(column_name)),
            ColumnKind::Rollup { .. } | ColumnKind::Formula { .. } => {
                self.derived_expr(column, scope)
            }
            ColumnKind::Lookup { relation, target } => {
                self.guarded(&scope.table.id, column, |this| {
                    this.lookup_scalar(relation, target, scope)
                })
            }
            ColumnKind::LinkToRecord(_) => Err(CompileError::SchemaResolution(format!(
                "formulas cannot reference link column `{}`",
                column.title
            ))),
        }
    }

    /// A lookup over a belongs-to link has at most one value per row and
    /// can be inlined as a scalar subquery.
    fn lookup_scalar(
        &mut self,
        relation: &ColumnRef,
        target: &ColumnRef,
        scope: &Scope<'a>,
    ) -> Result<Expr, CompileError> {
        let (_, link) = self.link_column(&scope.table.id, relation)?;
        if link.kind != RelationKind::BelongsTo {
            return Err(CompileError::SchemaResolution(format!(
                "formulas can only reference lookups over belongs-to links, `{relation}` is {}",
                link.kind
            )));
        }

        let related = self.table(link.related_table())?;
        let subquery = RelationSubqueryBuilder::new(link, related, &mut self.aliases)?;
        let target = self.column(&related.id, target)?;
        let value = self.column_expr(target, &subquery.related_scope())?;

        Ok(Expr::subquery(subquery.correlated(scope, vec![value]).build()))
    }
}

fn binary_operator(op: FormulaOp) -> BinaryOperator {
    match op {
        FormulaOp::Add => BinaryOperator::Plus,
        FormulaOp::Subtract => BinaryOperator::Minus,
        FormulaOp::Multiply => BinaryOperator::Multiply,
        FormulaOp::Divide => BinaryOperator::Divide,
        FormulaOp::Concat => BinaryOperator::Concat,
        FormulaOp::Eq => BinaryOperator::Eq,
        FormulaOp::Neq => BinaryOperator::NotEq,
        FormulaOp::Gt => BinaryOperator::Gt,
        FormulaOp::Gte => BinaryOperator::GtEq,
        FormulaOp::Lt => BinaryOperator::Lt,
        FormulaOp::Lte => BinaryOperator::LtEq,
    }
}

fn function_call(dialect: SqlDialect, name: &str, args: Vec<Expr>) -> Result<Expr, CompileError> {
    let call = |sql: &str, args: Vec<Expr>| -> Result<Expr, CompileError> {
        Ok(Expr::FunctionCall(FunctionCall::new(sql, args)))
    };
    let no_args = || CompileError::UnsupportedFunction(format!("{name} without arguments"));

    match name {
        "LEN" => match dialect {
            // LENGTH counts bytes on MySQL.
            SqlDialect::MySql => call("CHAR_LENGTH", args),
            SqlDialect::Postgres | SqlDialect::Sqlite => call("LENGTH", args),
        },
        "IF" => {
            let mut args = args.into_iter();
            match (args.next(), args.next(), args.next(), args.next()) {
                (Some(condition), Some(then), otherwise, None) => {
                    Ok(Expr::case(condition, then, otherwise))
                }
                _ => Err(CompileError::UnsupportedFunction(
                    "IF expects a condition, a value and an optional fallback".into(),
                )),
            }
        }
        "CEILING" => call("CEIL", args),
        "MID" | "SUBSTR" => call("SUBSTR", args),
        "UPPER" | "LOWER" | "TRIM" | "ABS" | "ROUND" | "FLOOR" | "CEIL" | "SQRT" | "POWER"
        | "MOD" | "REPLACE" | "COALESCE" => call(name, args),
        "MIN" | "MAX" => {
            let sql = match (dialect, name) {
                (SqlDialect::Sqlite, _) => name,
                (_, "MIN") => "LEAST",
                _ => "GREATEST",
            };
            call(sql, args)
        }
        "CONCAT" => Expr::fold(BinaryOperator::Concat, args).ok_or_else(no_args),
        "ADD" => Expr::fold(BinaryOperator::Plus, args).ok_or_else(no_args),
        "AVG" => {
            let count = args.len();
            let sum = Expr::fold(BinaryOperator::Plus, args).ok_or_else(no_args)?;
            Ok(Expr::binary(
                sum,
                BinaryOperator::Divide,
                Expr::Value(Value::Float(count as f64)),
            ))
        }
        other => Err(CompileError::UnsupportedFunction(other.to_string())),
    }
}
