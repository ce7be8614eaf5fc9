//! The recursive core turning a filter tree into a [`CompiledPredicate`].

mod derived;
mod lookup;
mod path;
pub mod relation;

pub use relation::RelationSubqueryBuilder;

use crate::{
    alias::{Alias, AliasAllocator},
    config::CompilerOptions,
    error::CompileError,
    operator::{Operand, OperatorTranslator},
    predicate::CompiledPredicate,
    resolver::ColumnResolver,
};
use model::{
    filter::{ComparisonOp, FilterCondition, FilterGroup, FilterNode, LogicalOp, TaggedNode},
    schema::{Column, ColumnKind, ColumnRef, Table, TableId},
};
use path::ResolutionPath;
use planner::query::{ast::expr::Expr, qualified};
use tracing::{debug, trace};

/// The table a condition is compiled against and the name its columns are
/// qualified with.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    pub table: &'a Table,
    pub qualifier: String,
}

impl<'a> Scope<'a> {
    /// The outer query's table, qualified by its physical name.
    pub fn root(table: &'a Table) -> Self {
        Self {
            table,
            qualifier: table.name.clone(),
        }
    }

    pub fn aliased(table: &'a Table, alias: &Alias) -> Self {
        Self {
            table,
            qualifier: alias.to_string(),
        }
    }

    pub fn column(&self, physical_name: &str) -> Expr {
        qualified(&self.qualifier, physical_name)
    }
}

/// Compiles one filter tree. A compiler is built per compile call and
/// consumed by it, so its alias counter is never shared.
pub struct ConditionCompiler<'a, R: ColumnResolver + ?Sized> {
    resolver: &'a R,
    translator: OperatorTranslator,
    aliases: AliasAllocator,
    path: ResolutionPath,
}

impl<'a, R> ConditionCompiler<'a, R>
where
    R: ColumnResolver + ?Sized,
{
    pub fn new(resolver: &'a R, options: &CompilerOptions) -> Self {
        Self {
            resolver,
            translator: OperatorTranslator::new(options.dialect),
            aliases: AliasAllocator::new(options.alias_prefix.clone()),
            path: ResolutionPath::new(options.max_depth),
        }
    }

    pub fn compile(
        self,
        filter: &FilterNode,
        target: &TableId,
    ) -> Result<CompiledPredicate, CompileError> {
        let table = self.table(target)?;
        self.compile_in(filter, &Scope::root(table))
    }

    /// Compiles against an explicit scope, e.g. an outer query that aliases
    /// its table.
    pub fn compile_in(
        mut self,
        filter: &FilterNode,
        scope: &Scope<'a>,
    ) -> Result<CompiledPredicate, CompileError> {
        let predicate = self.compile_node(filter, scope)?;
        debug!(
            table = %scope.table.id,
            leaves = predicate.leaf_count(),
            aliases = self.aliases.issued(),
            "Compiled filter"
        );
        Ok(predicate)
    }

    fn compile_node(
        &mut self,
        node: &FilterNode,
        scope: &Scope<'a>,
    ) -> Result<CompiledPredicate, CompileError> {
        match node {
            FilterNode::Chain(siblings) => self.compile_chain(siblings, scope),
            FilterNode::Group(group) => self.compile_group(group, scope),
            FilterNode::Condition(cond) => self.compile_condition(cond, scope),
        }
    }

    /// Siblings fold left to right, each joined to what precedes it by its
    /// own tag. A `not` tag means AND NOT; on the first sibling it negates.
    fn compile_chain(
        &mut self,
        siblings: &[TaggedNode],
        scope: &Scope<'a>,
    ) -> Result<CompiledPredicate, CompileError> {
        if siblings.is_empty() {
            return Err(CompileError::MalformedFilter("empty filter list".into()));
        }

        let compiled = siblings
            .iter()
            .map(|s| Ok((s.logical_op, self.compile_node(&s.node, scope)?)))
            .collect::<Result<Vec<_>, CompileError>>()?;

        let mut compiled = compiled.into_iter();
        let Some((first_op, first)) = compiled.next() else {
            return Err(CompileError::MalformedFilter("empty filter list".into()));
        };

        let mut acc = match first_op {
            Some(LogicalOp::Not) => first.negate(),
            _ => first,
        };
        for (op, next) in compiled {
            acc = match op.unwrap_or_default() {
                LogicalOp::And => acc.and(next),
                LogicalOp::Or => acc.or(next),
                LogicalOp::Xor => acc.xor(next),
                LogicalOp::Not => acc.and(next.negate()),
            };
        }
        Ok(acc)
    }

    fn compile_group(
        &mut self,
        group: &FilterGroup,
        scope: &Scope<'a>,
    ) -> Result<CompiledPredicate, CompileError> {
        if group.children.is_empty() {
            return Err(CompileError::MalformedFilter(format!(
                "`{}` group has no children",
                group.logical_op
            )));
        }

        let children = group
            .children
            .iter()
            .map(|child| self.compile_node(child, scope))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match group.logical_op {
            LogicalOp::And => CompiledPredicate::And(children),
            LogicalOp::Or => CompiledPredicate::Or(children),
            LogicalOp::Xor => CompiledPredicate::Xor(children),
            LogicalOp::Not => CompiledPredicate::And(children).negate(),
        })
    }

    fn compile_condition(
        &mut self,
        cond: &FilterCondition,
        scope: &Scope<'a>,
    ) -> Result<CompiledPredicate, CompileError> {
        if cond.column.is_empty() {
            return Err(CompileError::MalformedFilter(
                "condition has no column".into(),
            ));
        }
        if cond.op.requires_value() && cond.value.is_none() {
            return Err(CompileError::MalformedFilter(format!(
                "`{}` on `{}` needs a value",
                cond.op, cond.column
            )));
        }

        let column = self.column(&scope.table.id, &cond.column)?;
        trace!(table = %scope.table.id, %column, op = %cond.op, "Compiling condition");

        match &column.kind {
            ColumnKind::Stored { column_name } => {
                self.translate(cond, Operand::Column(scope.column(column_name)))
            }
            ColumnKind::LinkToRecord(link) => self.compile_link(cond, column, link, scope),
            ColumnKind::Lookup { relation, target } => {
                self.compile_lookup(cond, column, relation, target, scope)
            }
            ColumnKind::Rollup { .. } | ColumnKind::Formula { .. } => {
                let expr = self.derived_expr(column, scope)?;
                self.translate(cond, Operand::Derived(expr))
            }
        }
    }

    fn translate(
        &self,
        cond: &FilterCondition,
        operand: Operand,
    ) -> Result<CompiledPredicate, CompileError> {
        self.translator
            .translate(cond.op, &operand, cond.value.as_ref())
            .map(CompiledPredicate::Leaf)
    }

    /// Runs `f` with `column` on the resolution path.
    fn guarded<T>(
        &mut self,
        table: &TableId,
        column: &Column,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        self.path.enter(table, column)?;
        let result = f(self);
        self.path.leave();
        result
    }

    fn table(&self, id: &TableId) -> Result<&'a Table, CompileError> {
        let resolver: &'a R = self.resolver;
        resolver.table(id)
    }

    fn column(&self, table: &TableId, column: &ColumnRef) -> Result<&'a Column, CompileError> {
        let resolver: &'a R = self.resolver;
        resolver.resolve_column(table, column)
    }

    /// Resolves a column that must be a link.
    fn link_column(
        &self,
        table: &TableId,
        column: &ColumnRef,
    ) -> Result<(&'a Column, &'a model::schema::LinkToRecord), CompileError> {
        let resolved = self.column(table, column)?;
        match &resolved.kind {
            ColumnKind::LinkToRecord(link) => Ok((resolved, link)),
            other => Err(CompileError::SchemaResolution(format!(
                "`{column}` on table `{table}` is a {} column, not a link",
                other.name()
            ))),
        }
    }
}

/// Splits a negated operator into its positive form and the negation to
/// apply to the outer membership test.
fn split_negation(op: ComparisonOp) -> (ComparisonOp, bool) {
    match op.positive_form() {
        Some(positive) => (positive, true),
        None => (op, false),
    }
}

/// The display column reference of a table, used when a link column itself
/// is the filter target.
fn display_ref(table: &Table) -> Result<ColumnRef, CompileError> {
    table
        .display_column()
        .map(|c| ColumnRef::from(c.key()))
        .ok_or_else(|| {
            CompileError::SchemaResolution(format!(
                "table `{}` has no display column",
                table.id
            ))
        })
}
