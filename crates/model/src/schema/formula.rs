use super::ColumnRef;
use crate::core::value::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Concat,
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Parsed formula expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaExpr {
    Literal(Value),
    Column(ColumnRef),
    Negate(Box<FormulaExpr>),
    Binary {
        op: FormulaOp,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    Call {
        name: String,
        args: Vec<FormulaExpr>,
    },
}

impl FormulaExpr {
    pub fn column(name: impl Into<ColumnRef>) -> Self {
        FormulaExpr::Column(name.into())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        FormulaExpr::Literal(value.into())
    }

    pub fn binary(op: FormulaOp, left: FormulaExpr, right: FormulaExpr) -> Self {
        FormulaExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<FormulaExpr>) -> Self {
        FormulaExpr::Call {
            name: name.into(),
            args,
        }
    }

    /// Every column referenced by the expression, in source order.
    pub fn references(&self) -> Vec<&ColumnRef> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a ColumnRef>) {
        match self {
            FormulaExpr::Literal(_) => {}
            FormulaExpr::Column(c) => out.push(c),
            FormulaExpr::Negate(inner) => inner.collect_references(out),
            FormulaExpr::Binary { left, right, .. } => {
                left.collect_references(out);
                right.collect_references(out);
            }
            FormulaExpr::Call { args, .. } => {
                for arg in args {
                    arg.collect_references(out);
                }
            }
        }
    }
}

/// A formula as stored in column metadata: either source text still to be
/// parsed, or an already parsed tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormulaDef {
    Source(String),
    Parsed(FormulaExpr),
}

impl From<FormulaExpr> for FormulaDef {
    fn from(expr: FormulaExpr) -> Self {
        FormulaDef::Parsed(expr)
    }
}

impl From<&str> for FormulaDef {
    fn from(source: &str) -> Self {
        FormulaDef::Source(source.to_string())
    }
}
