//! Defines the AST for SQL expressions.

use crate::query::ast::select::Select;
use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or table identifier, e.g., `users` or `users.id`.
    Identifier(Ident),

    /// A literal value, bound as a parameter when rendered.
    Value(Value),

    /// A binary operation, e.g., `column = 'value'` or `a + b`.
    BinaryOp(Box<BinaryOp>),

    /// A function call, e.g., `COUNT(*)` or `MAX(price)`.
    FunctionCall(FunctionCall),

    /// `expr [NOT] LIKE pattern`. Case-insensitive matching renders as
    /// `ILIKE` where the dialect has it and as `LOWER(..) LIKE LOWER(..)`
    /// elsewhere. Case-sensitive matching follows
    /// [`Dialect::case_sensitive_match`](crate::query::dialect::Dialect::case_sensitive_match).
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
        case_insensitive: bool,
    },

    /// `expr [NOT] IN (a, b, c)`
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// `expr [NOT] IN (SELECT ...)`
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<Select>,
        negated: bool,
    },

    /// `expr [NOT] BETWEEN low AND high`
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// `expr IS [NOT] NULL`
    IsNull { expr: Box<Expr>, negated: bool },

    Not(Box<Expr>),

    /// A scalar subquery, e.g. `(SELECT COUNT(*) FROM ...)`.
    Subquery(Box<Select>),

    /// `CASE WHEN condition THEN then [ELSE otherwise] END`
    Case {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'users' in 'users.id'
    pub name: String,              // e.g., the 'id' in 'users.id'
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub wildcard: bool, // represents the '*' in 'COUNT(*)'
    pub distinct: bool,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            args,
            wildcard: false,
            distinct: false,
        }
    }

    pub fn count_star() -> Self {
        Self {
            name: "COUNT".to_string(),
            args: Vec::new(),
            wildcard: true,
            distinct: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    // Logical
    And,
    Or,
    Xor,

    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,

    // String
    Concat,
}

impl BinaryOperator {
    /// The operator with its operands swapped: `a < b` is `b > a`.
    pub fn flipped(self) -> Self {
        match self {
            BinaryOperator::Lt => BinaryOperator::Gt,
            BinaryOperator::LtEq => BinaryOperator::GtEq,
            BinaryOperator::Gt => BinaryOperator::Lt,
            BinaryOperator::GtEq => BinaryOperator::LtEq,
            other => other,
        }
    }
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }

    pub fn eq(left: Expr, right: Expr) -> Expr {
        Self::binary(left, BinaryOperator::Eq, right)
    }

    pub fn and(left: Expr, right: Expr) -> Expr {
        Self::binary(left, BinaryOperator::And, right)
    }

    pub fn not(inner: Expr) -> Expr {
        Expr::Not(Box::new(inner))
    }

    pub fn is_null(expr: Expr, negated: bool) -> Expr {
        Expr::IsNull {
            expr: Box::new(expr),
            negated,
        }
    }

    pub fn in_subquery(expr: Expr, subquery: Select, negated: bool) -> Expr {
        Expr::InSubquery {
            expr: Box::new(expr),
            subquery: Box::new(subquery),
            negated,
        }
    }

    pub fn subquery(select: Select) -> Expr {
        Expr::Subquery(Box::new(select))
    }

    pub fn case(condition: Expr, then: Expr, otherwise: Option<Expr>) -> Expr {
        Expr::Case {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
        }
    }

    /// Folds a list of expressions with `op`, left to right.
    /// Returns `None` for an empty list.
    pub fn fold(op: BinaryOperator, exprs: Vec<Expr>) -> Option<Expr> {
        exprs
            .into_iter()
            .reduce(|acc, next| Self::binary(acc, op, next))
    }
}
