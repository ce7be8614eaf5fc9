use super::{
    ConditionCompiler, Scope, display_ref,
    relation::{RelationSubqueryBuilder, join_hop},
    split_negation,
};
use crate::{error::CompileError, predicate::CompiledPredicate, resolver::ColumnResolver};
use model::{
    filter::FilterCondition,
    schema::{Column, ColumnKind, ColumnRef},
};
use planner::query::builder::select::{FromState, SelectBuilder};

impl<'a, R> ConditionCompiler<'a, R>
where
    R: ColumnResolver + ?Sized,
{
    /// A condition on a lookup column: the join chain to the terminal column
    /// becomes one correlated subquery tested with `[NOT] IN`.
    pub(super) fn compile_lookup(
        &mut self,
        cond: &FilterCondition,
        column: &'a Column,
        relation: &ColumnRef,
        target: &'a ColumnRef,
        scope: &Scope<'a>,
    ) -> Result<CompiledPredicate, CompileError> {
        self.guarded(&scope.table.id, column, |this| {
            let (_, link) = this.link_column(&scope.table.id, relation)?;
            let related = this.table(link.related_table())?;
            let subquery = RelationSubqueryBuilder::new(link, related, &mut this.aliases)?;

            let (inner_op, negated) = split_negation(cond.op);
            let inner = cond.with_op(inner_op);

            let query = subquery.select(vec![subquery.inner_key()]);
            let query = this.nested_join(query, &inner, target, &subquery.related_scope())?;

            Ok(CompiledPredicate::Leaf(subquery.test(scope, query, negated)))
        })
    }

    /// Follows `target` from `scope`, joining one hop per relation under
    /// fresh aliases, and applies `cond` to the terminal column.
    fn nested_join(
        &mut self,
        query: SelectBuilder<FromState>,
        cond: &FilterCondition,
        target: &'a ColumnRef,
        scope: &Scope<'a>,
    ) -> Result<SelectBuilder<FromState>, CompileError> {
        let column = self.column(&scope.table.id, target)?;

        match &column.kind {
            ColumnKind::Lookup {
                relation,
                target: next,
            } => self.guarded(&scope.table.id, column, |this| {
                let (_, link) = this.link_column(&scope.table.id, relation)?;
                let related = this.table(link.related_table())?;
                let (query, alias) = join_hop(query, link, related, scope, &mut this.aliases)?;
                this.nested_join(query, cond, next, &Scope::aliased(related, &alias))
            }),
            ColumnKind::LinkToRecord(link) => {
                if cond.op.is_range() {
                    return Err(CompileError::UnsupportedOperator {
                        op: cond.op,
                        kind: column.kind.name(),
                        column: column.title.clone(),
                    });
                }
                self.guarded(&scope.table.id, column, |this| {
                    let related = this.table(link.related_table())?;
                    let (query, alias) =
                        join_hop(query, link, related, scope, &mut this.aliases)?;
                    let inner = cond.retarget(display_ref(related)?);
                    let predicate =
                        this.compile_condition(&inner, &Scope::aliased(related, &alias))?;
                    Ok(predicate.apply(query))
                })
            }
            _ => {
                let predicate = self.compile_condition(&cond.retarget(target.clone()), scope)?;
                Ok(predicate.apply(query))
            }
        }
    }
}
