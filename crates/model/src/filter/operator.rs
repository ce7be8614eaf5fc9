use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown comparison operator `{0}`")]
pub struct UnknownOperator(pub String);

/// Logical operators joining filter nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    #[default]
    And,
    Or,
    Not,
    Xor,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "and"),
            LogicalOp::Or => write!(f, "or"),
            LogicalOp::Not => write!(f, "not"),
            LogicalOp::Xor => write!(f, "xor"),
        }
    }
}

/// Comparison operators a filter condition can apply to a column.
///
/// `IsNull`/`IsNotNull` test SQL `NULL`, `IsEmpty`/`IsNotEmpty` test the
/// empty string. They are four distinct predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ComparisonOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Nlike,
    In,
    Btw,
    Nbtw,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Neq => "neq",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Gte => "gte",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Lte => "lte",
            ComparisonOp::Like => "like",
            ComparisonOp::Nlike => "nlike",
            ComparisonOp::In => "in",
            ComparisonOp::Btw => "btw",
            ComparisonOp::Nbtw => "nbtw",
            ComparisonOp::IsNull => "is_null",
            ComparisonOp::IsNotNull => "is_not_null",
            ComparisonOp::IsEmpty => "is_empty",
            ComparisonOp::IsNotEmpty => "is_not_empty",
        }
    }

    /// The positive counterpart of a negated operator.
    ///
    /// When a condition is pushed into a subquery over a fan-out relation the
    /// inner query matches the positive form and the outer membership test is
    /// inverted instead.
    pub fn positive_form(&self) -> Option<ComparisonOp> {
        match self {
            ComparisonOp::Neq => Some(ComparisonOp::Eq),
            ComparisonOp::Nlike => Some(ComparisonOp::Like),
            ComparisonOp::Nbtw => Some(ComparisonOp::Btw),
            _ => None,
        }
    }

    /// Whether the operator needs a literal to compare against.
    pub fn requires_value(&self) -> bool {
        !matches!(
            self,
            ComparisonOp::IsNull
                | ComparisonOp::IsNotNull
                | ComparisonOp::IsEmpty
                | ComparisonOp::IsNotEmpty
        )
    }

    /// Ordering comparisons, which only make sense on scalar values.
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            ComparisonOp::Gt
                | ComparisonOp::Gte
                | ComparisonOp::Lt
                | ComparisonOp::Lte
                | ComparisonOp::Btw
                | ComparisonOp::Nbtw
        )
    }

    /// Normalises the legacy `is` / `isnot` encoding, where the operand lives
    /// in the value (`null`, `notnull`, `empty`, `notempty`).
    ///
    /// Returns a new operator; the caller swaps it in without touching the
    /// original condition.
    pub fn from_legacy(op: &str, value: Option<&str>) -> Result<ComparisonOp, UnknownOperator> {
        let negate = match op {
            "is" => false,
            "isnot" => true,
            other => return other.parse(),
        };

        let base = match value.unwrap_or_default() {
            "null" => ComparisonOp::IsNull,
            "notnull" => ComparisonOp::IsNotNull,
            "empty" => ComparisonOp::IsEmpty,
            "notempty" => ComparisonOp::IsNotEmpty,
            other => return Err(UnknownOperator(format!("{op} {other}"))),
        };

        Ok(if negate { base.inverse_test() } else { base })
    }

    fn inverse_test(self) -> ComparisonOp {
        match self {
            ComparisonOp::IsNull => ComparisonOp::IsNotNull,
            ComparisonOp::IsNotNull => ComparisonOp::IsNull,
            ComparisonOp::IsEmpty => ComparisonOp::IsNotEmpty,
            ComparisonOp::IsNotEmpty => ComparisonOp::IsEmpty,
            other => other,
        }
    }
}

impl FromStr for ComparisonOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "eq" => ComparisonOp::Eq,
            "neq" | "not" => ComparisonOp::Neq,
            "gt" => ComparisonOp::Gt,
            "gte" | "ge" => ComparisonOp::Gte,
            "lt" => ComparisonOp::Lt,
            "lte" | "le" => ComparisonOp::Lte,
            "like" => ComparisonOp::Like,
            "nlike" => ComparisonOp::Nlike,
            "in" => ComparisonOp::In,
            "btw" => ComparisonOp::Btw,
            "nbtw" => ComparisonOp::Nbtw,
            "is_null" | "null" => ComparisonOp::IsNull,
            "is_not_null" | "notnull" => ComparisonOp::IsNotNull,
            "is_empty" | "empty" => ComparisonOp::IsEmpty,
            "is_not_empty" | "notempty" => ComparisonOp::IsNotEmpty,
            other => return Err(UnknownOperator(other.to_string())),
        };
        Ok(op)
    }
}

impl TryFrom<String> for ComparisonOp {
    type Error = UnknownOperator;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ComparisonOp> for String {
    fn from(op: ComparisonOp) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
