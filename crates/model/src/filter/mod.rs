//! The declarative filter tree handed to the condition compiler.

pub mod node;
pub mod operator;

pub use node::{FilterCondition, FilterGroup, FilterNode, TaggedNode};
pub use operator::{ComparisonOp, LogicalOp, UnknownOperator};
