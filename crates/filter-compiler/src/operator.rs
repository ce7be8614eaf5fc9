//! Maps a comparison operator onto the predicate shape of the target dialect.

use crate::error::CompileError;
use model::{
    core::{dialect::SqlDialect, value::Value},
    filter::ComparisonOp,
};
use planner::query::ast::expr::{BinaryOperator, Expr};
use serde_json::Value as Json;

/// The left-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A bare column reference.
    Column(Expr),
    /// A materialised rollup or formula expression.
    ///
    /// Ordering comparisons against a derived expression bind the value on
    /// the left and flip the operator: `gt 10` renders as `10 < expr`.
    Derived(Expr),
}

impl Operand {
    fn expr(&self) -> &Expr {
        match self {
            Operand::Column(expr) | Operand::Derived(expr) => expr,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OperatorTranslator {
    dialect: SqlDialect,
}

impl OperatorTranslator {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    pub fn translate(
        &self,
        op: ComparisonOp,
        operand: &Operand,
        value: Option<&Json>,
    ) -> Result<Expr, CompileError> {
        let field = operand.expr().clone();

        let expr = match op {
            ComparisonOp::Eq | ComparisonOp::Neq => {
                let negated = op == ComparisonOp::Neq;
                match scalar(op, value)? {
                    Value::Null => Expr::is_null(field, negated),
                    value => {
                        let bin = if negated {
                            BinaryOperator::NotEq
                        } else {
                            BinaryOperator::Eq
                        };
                        compare(operand, bin, value)
                    }
                }
            }
            ComparisonOp::Gt => compare(operand, BinaryOperator::Gt, scalar(op, value)?),
            ComparisonOp::Gte => compare(operand, BinaryOperator::GtEq, scalar(op, value)?),
            ComparisonOp::Lt => compare(operand, BinaryOperator::Lt, scalar(op, value)?),
            ComparisonOp::Lte => compare(operand, BinaryOperator::LtEq, scalar(op, value)?),
            ComparisonOp::Like | ComparisonOp::Nlike => {
                let needle = scalar(op, value)?.as_string().unwrap_or_default();
                Expr::Like {
                    expr: Box::new(field),
                    pattern: Box::new(Expr::Value(Value::String(format!("%{needle}%")))),
                    negated: op == ComparisonOp::Nlike,
                    case_insensitive: self.dialect.case_insensitive_like(),
                }
            }
            ComparisonOp::In => {
                let items = list(op, value)?;
                if items.is_empty() {
                    return Err(CompileError::MalformedFilter(
                        "`in` needs at least one value".into(),
                    ));
                }
                Expr::InList {
                    expr: Box::new(field),
                    list: items.into_iter().map(Expr::Value).collect(),
                    negated: false,
                }
            }
            ComparisonOp::Btw | ComparisonOp::Nbtw => {
                let mut bounds = list(op, value)?;
                if bounds.len() != 2 {
                    return Err(CompileError::MalformedFilter(format!(
                        "`{op}` needs exactly two values, got {}",
                        bounds.len()
                    )));
                }
                let high = bounds.pop().unwrap_or(Value::Null);
                let low = bounds.pop().unwrap_or(Value::Null);
                Expr::Between {
                    expr: Box::new(field),
                    low: Box::new(Expr::Value(low)),
                    high: Box::new(Expr::Value(high)),
                    negated: op == ComparisonOp::Nbtw,
                }
            }
            ComparisonOp::IsNull => Expr::is_null(field, false),
            ComparisonOp::IsNotNull => Expr::is_null(field, true),
            ComparisonOp::IsEmpty => Expr::binary(
                field,
                BinaryOperator::Eq,
                Expr::Value(Value::String(String::new())),
            ),
            ComparisonOp::IsNotEmpty => Expr::binary(
                field,
                BinaryOperator::NotEq,
                Expr::Value(Value::String(String::new())),
            ),
        };

        Ok(expr)
    }
}

fn compare(operand: &Operand, op: BinaryOperator, value: Value) -> Expr {
    match operand {
        Operand::Column(field) => Expr::binary(field.clone(), op, Expr::Value(value)),
        Operand::Derived(expr) => Expr::binary(Expr::Value(value), op.flipped(), expr.clone()),
    }
}

fn scalar(op: ComparisonOp, value: Option<&Json>) -> Result<Value, CompileError> {
    match value {
        None => Err(CompileError::MalformedFilter(format!(
            "`{op}` needs a value"
        ))),
        Some(Json::Array(_) | Json::Object(_)) => Err(CompileError::MalformedFilter(format!(
            "`{op}` needs a scalar value"
        ))),
        Some(json) => Ok(Value::from_json(json)),
    }
}

/// Accepts either a JSON array or a comma separated string. String items
/// are kept verbatim, whitespace and empty items included.
fn list(op: ComparisonOp, value: Option<&Json>) -> Result<Vec<Value>, CompileError> {
    match value {
        None => Err(CompileError::MalformedFilter(format!(
            "`{op}` needs a value"
        ))),
        Some(Json::Array(items)) => Ok(items.iter().map(Value::from_json).collect()),
        Some(Json::String(s)) => Ok(s.split(',').map(Value::from).collect()),
        Some(Json::Object(_)) => Err(CompileError::MalformedFilter(format!(
            "`{op}` needs a list of values"
        ))),
        Some(json) => Ok(vec![Value::from_json(json)]),
    }
}
