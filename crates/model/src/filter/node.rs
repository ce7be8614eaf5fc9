use super::operator::{ComparisonOp, LogicalOp, UnknownOperator};
use crate::schema::ColumnRef;
use serde::{Deserialize, Serialize};

/// A node of the boolean filter tree.
///
/// The tree is immutable input: the compiler only borrows it, so a cached
/// tree can be compiled concurrently by several requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    /// A bare array of siblings. Each sibling carries its own logical
    /// operator relative to the nodes before it; the first sibling's operator
    /// only matters when it is `not`.
    Chain(Vec<TaggedNode>),

    /// A nested scope whose children are combined by `logical_op`.
    Group(FilterGroup),

    /// A leaf comparison against a single column.
    Condition(FilterCondition),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_op: Option<LogicalOp>,
    pub node: FilterNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(default)]
    pub logical_op: LogicalOp,
    pub children: Vec<FilterNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition")]
pub struct FilterCondition {
    pub column: ColumnRef,
    pub op: ComparisonOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// Wire form of a condition, before the operator is normalised.
#[derive(Deserialize)]
struct RawCondition {
    column: ColumnRef,
    op: String,
    #[serde(default)]
    value: Option<serde_json::Value>,
}

impl TryFrom<RawCondition> for FilterCondition {
    type Error = UnknownOperator;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        match raw.op.as_str() {
            // Legacy `is` / `isnot`: the value names the test and is consumed.
            "is" | "isnot" => {
                let test = raw.value.as_ref().and_then(|v| v.as_str());
                let op = ComparisonOp::from_legacy(&raw.op, test)?;
                Ok(FilterCondition::new(raw.column, op, None))
            }
            other => Ok(FilterCondition::new(raw.column, other.parse()?, raw.value)),
        }
    }
}

impl FilterCondition {
    pub fn new(column: impl Into<ColumnRef>, op: ComparisonOp, value: Option<serde_json::Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }

    /// Returns a copy of this condition with a different operator.
    pub fn with_op(&self, op: ComparisonOp) -> Self {
        Self {
            column: self.column.clone(),
            op,
            value: self.value.clone(),
        }
    }

    /// Returns a copy of this condition targeting another column.
    pub fn retarget(&self, column: ColumnRef) -> Self {
        Self {
            column,
            op: self.op,
            value: self.value.clone(),
        }
    }
}

impl TaggedNode {
    pub fn new(logical_op: Option<LogicalOp>, node: FilterNode) -> Self {
        Self { logical_op, node }
    }
}

impl FilterNode {
    pub fn condition(
        column: impl Into<ColumnRef>,
        op: ComparisonOp,
        value: Option<serde_json::Value>,
    ) -> Self {
        FilterNode::Condition(FilterCondition::new(column, op, value))
    }

    pub fn group(logical_op: LogicalOp, children: Vec<FilterNode>) -> Self {
        FilterNode::Group(FilterGroup {
            logical_op,
            children,
        })
    }

    pub fn and(children: Vec<FilterNode>) -> Self {
        Self::group(LogicalOp::And, children)
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        Self::group(LogicalOp::Or, children)
    }

    pub fn not(children: Vec<FilterNode>) -> Self {
        Self::group(LogicalOp::Not, children)
    }

    pub fn xor(children: Vec<FilterNode>) -> Self {
        Self::group(LogicalOp::Xor, children)
    }

    pub fn chain(siblings: Vec<(Option<LogicalOp>, FilterNode)>) -> Self {
        FilterNode::Chain(
            siblings
                .into_iter()
                .map(|(op, node)| TaggedNode::new(op, node))
                .collect(),
        )
    }

    /// Visits every leaf condition, depth first.
    pub fn conditions(&self) -> Vec<&FilterCondition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a FilterCondition>) {
        match self {
            FilterNode::Chain(siblings) => {
                for sibling in siblings {
                    sibling.node.collect_conditions(out);
                }
            }
            FilterNode::Group(group) => {
                for child in &group.children {
                    child.collect_conditions(out);
                }
            }
            FilterNode::Condition(cond) => out.push(cond),
        }
    }
}
