use model::core::{dialect::SqlDialect, value::Value};
use planner::query::{
    ast::expr::{BinaryOperator, Expr},
    builder::select::{FromState, SelectBuilder},
    dialect::for_sql_dialect,
    renderer::render,
};

/// A compiled filter, assembled bottom-up and applied to a query once.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledPredicate {
    Leaf(Expr),
    And(Vec<CompiledPredicate>),
    Or(Vec<CompiledPredicate>),
    /// True when an odd number of children hold.
    Xor(Vec<CompiledPredicate>),
    Not(Box<CompiledPredicate>),
}

impl CompiledPredicate {
    pub fn and(self, other: CompiledPredicate) -> CompiledPredicate {
        match self {
            CompiledPredicate::And(mut children) => {
                children.push(other);
                CompiledPredicate::And(children)
            }
            first => CompiledPredicate::And(vec![first, other]),
        }
    }

    pub fn or(self, other: CompiledPredicate) -> CompiledPredicate {
        match self {
            CompiledPredicate::Or(mut children) => {
                children.push(other);
                CompiledPredicate::Or(children)
            }
            first => CompiledPredicate::Or(vec![first, other]),
        }
    }

    pub fn xor(self, other: CompiledPredicate) -> CompiledPredicate {
        CompiledPredicate::Xor(vec![self, other])
    }

    pub fn negate(self) -> CompiledPredicate {
        CompiledPredicate::Not(Box::new(self))
    }

    /// Lowers the predicate into a single SQL expression.
    pub fn into_expr(self) -> Expr {
        match self {
            CompiledPredicate::Leaf(expr) => expr,
            CompiledPredicate::And(children) => fold(BinaryOperator::And, children, true),
            CompiledPredicate::Or(children) => fold(BinaryOperator::Or, children, false),
            CompiledPredicate::Xor(children) => fold(BinaryOperator::Xor, children, false),
            CompiledPredicate::Not(inner) => Expr::not(inner.into_expr()),
        }
    }

    /// ANDs the predicate onto the `WHERE` clause of a query.
    pub fn apply(self, builder: SelectBuilder<FromState>) -> SelectBuilder<FromState> {
        builder.and_where(self.into_expr())
    }

    /// Renders the predicate on its own, returning SQL and bound parameters.
    pub fn to_sql(&self, dialect: SqlDialect) -> (String, Vec<Value>) {
        let dialect = for_sql_dialect(dialect);
        render(&self.clone().into_expr(), dialect.as_ref())
    }

    /// Number of leaves in the predicate.
    pub fn leaf_count(&self) -> usize {
        match self {
            CompiledPredicate::Leaf(_) => 1,
            CompiledPredicate::And(children)
            | CompiledPredicate::Or(children)
            | CompiledPredicate::Xor(children) => children.iter().map(Self::leaf_count).sum(),
            CompiledPredicate::Not(inner) => inner.leaf_count(),
        }
    }
}

// The compiler never builds an empty combination; the identity element keeps
// lowering total.
fn fold(op: BinaryOperator, children: Vec<CompiledPredicate>, identity: bool) -> Expr {
    let exprs = children.into_iter().map(CompiledPredicate::into_expr).collect();
    Expr::fold(op, exprs).unwrap_or_else(|| {
        let rhs = if identity { 1 } else { 0 };
        Expr::binary(
            Expr::Value(Value::Int(1)),
            BinaryOperator::Eq,
            Expr::Value(Value::Int(rhs)),
        )
    })
}
