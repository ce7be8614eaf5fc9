//! Correlated subqueries over the far side of a link column.

use super::{ConditionCompiler, Scope, display_ref, split_negation};
use crate::{
    alias::{Alias, AliasAllocator},
    error::CompileError,
    predicate::CompiledPredicate,
    resolver::ColumnResolver,
};
use model::{
    core::value::Value,
    filter::{ComparisonOp, FilterCondition},
    schema::{Column, Junction, LinkToRecord, RelationKind, Table},
};
use planner::{
    query::{
        ast::expr::{BinaryOperator, Expr, FunctionCall},
        builder::select::{FromState, SelectBuilder},
        qualified,
    },
    table_ref,
};

/// A subquery reaching the related rows of a link:
///
/// - has-many: `FROM child AS r`, keyed on `r.child_key`
/// - belongs-to: `FROM parent AS r`, keyed on `r.parent_key`
/// - many-to-many: `FROM junction AS j JOIN parent AS r ON j.parent_key = r.parent_key`,
///   keyed on `j.child_key`
#[derive(Debug)]
pub struct RelationSubqueryBuilder<'a> {
    link: &'a LinkToRecord,
    related: &'a Table,
    related_alias: Alias,
    junction: Option<(&'a Junction, Alias)>,
}

impl<'a> RelationSubqueryBuilder<'a> {
    pub fn new(
        link: &'a LinkToRecord,
        related: &'a Table,
        aliases: &mut AliasAllocator,
    ) -> Result<Self, CompileError> {
        let junction = match link.kind {
            RelationKind::ManyToMany => Some((junction_of(link)?, aliases.next_alias())),
            RelationKind::HasMany | RelationKind::BelongsTo => None,
        };

        Ok(Self {
            link,
            related,
            related_alias: aliases.next_alias(),
            junction,
        })
    }

    /// The related table as seen from inside the subquery.
    pub fn related_scope(&self) -> Scope<'a> {
        Scope::aliased(self.related, &self.related_alias)
    }

    /// The subquery column matched against the outer key.
    pub fn inner_key(&self) -> Expr {
        match &self.junction {
            Some((junction, alias)) => qualified(alias.as_str(), &junction.child_key),
            None => qualified(self.related_alias.as_str(), &self.link.remote_key().column),
        }
    }

    /// The key of the outer row.
    pub fn outer_key(&self, outer: &Scope) -> Expr {
        outer.column(&self.link.local_key().column)
    }

    /// `SELECT columns FROM ...` over the related rows, uncorrelated.
    pub fn select(&self, columns: Vec<Expr>) -> SelectBuilder<FromState> {
        let related = table_ref!(self.related.name);
        let related_alias = self.related_alias.as_str();

        match &self.junction {
            Some((junction, alias)) => SelectBuilder::new()
                .select(columns)
                .from(table_ref!(junction.table), Some(alias.as_str()))
                .inner_join(
                    related,
                    related_alias,
                    Expr::eq(
                        qualified(alias.as_str(), &junction.parent_key),
                        qualified(related_alias, &self.link.parent.column),
                    ),
                ),
            None => SelectBuilder::new()
                .select(columns)
                .from(related, Some(related_alias)),
        }
    }

    /// `outer_key [NOT] IN (SELECT inner_key FROM ... WHERE predicate)`
    pub fn membership(
        &self,
        outer: &Scope,
        predicate: Option<CompiledPredicate>,
        negated: bool,
    ) -> Expr {
        let mut query = self.select(vec![self.inner_key()]);
        if let Some(predicate) = predicate {
            query = predicate.apply(query);
        }
        self.test(outer, query, negated)
    }

    /// Tests the outer key against an already filtered `query` whose single
    /// column is [`inner_key`](Self::inner_key).
    ///
    /// A NULL in the list of a `NOT IN` makes the test NULL for every row,
    /// so on fan-out relations, whose inner key is a nullable foreign key,
    /// NULL keys are excluded from the subquery.
    pub fn test(&self, outer: &Scope, query: SelectBuilder<FromState>, negated: bool) -> Expr {
        let query = if negated && self.link.kind.is_fan_out() {
            query.and_where(Expr::is_null(self.inner_key(), true))
        } else {
            query
        };
        Expr::in_subquery(self.outer_key(outer), query.build(), negated)
    }

    /// `SELECT columns FROM ... WHERE inner_key = outer_key`
    pub fn correlated(&self, outer: &Scope, columns: Vec<Expr>) -> SelectBuilder<FromState> {
        self.select(columns)
            .and_where(Expr::eq(self.inner_key(), self.outer_key(outer)))
    }
}

/// Joins the far side of `link` onto `query`, continuing from the rows of
/// `from`. Returns the alias of the newly joined related table.
pub(crate) fn join_hop(
    query: SelectBuilder<FromState>,
    link: &LinkToRecord,
    related: &Table,
    from: &Scope,
    aliases: &mut AliasAllocator,
) -> Result<(SelectBuilder<FromState>, Alias), CompileError> {
    let local_key = from.column(&link.local_key().column);

    match link.kind {
        RelationKind::HasMany | RelationKind::BelongsTo => {
            let alias = aliases.next_alias();
            let on = Expr::eq(local_key, qualified(alias.as_str(), &link.remote_key().column));
            let query = query.inner_join(table_ref!(related.name), alias.as_str(), on);
            Ok((query, alias))
        }
        RelationKind::ManyToMany => {
            let junction = junction_of(link)?;
            let assoc = aliases.next_alias();
            let alias = aliases.next_alias();
            let query = query
                .inner_join(
                    table_ref!(junction.table),
                    assoc.as_str(),
                    Expr::eq(qualified(assoc.as_str(), &junction.child_key), local_key),
                )
                .inner_join(
                    table_ref!(related.name),
                    alias.as_str(),
                    Expr::eq(
                        qualified(alias.as_str(), &link.parent.column),
                        qualified(assoc.as_str(), &junction.parent_key),
                    ),
                );
            Ok((query, alias))
        }
    }
}

fn junction_of(link: &LinkToRecord) -> Result<&Junction, CompileError> {
    link.junction.as_ref().ok_or_else(|| {
        CompileError::SchemaResolution(format!(
            "many-to-many link between `{}` and `{}` has no junction table",
            link.child.table, link.parent.table
        ))
    })
}

impl<'a, R> ConditionCompiler<'a, R>
where
    R: ColumnResolver + ?Sized,
{
    /// A condition on a link column itself, tested against the related
    /// table's display column.
    pub(super) fn compile_link(
        &mut self,
        cond: &FilterCondition,
        column: &'a Column,
        link: &'a LinkToRecord,
        scope: &Scope<'a>,
    ) -> Result<CompiledPredicate, CompileError> {
        if cond.op.is_range() {
            return Err(CompileError::UnsupportedOperator {
                op: cond.op,
                kind: column.kind.name(),
                column: column.title.clone(),
            });
        }

        self.guarded(&scope.table.id, column, |this| {
            if let Some(predicate) = this.link_presence(cond.op, link, scope)? {
                return Ok(predicate);
            }

            let related = this.table(link.related_table())?;
            let subquery = RelationSubqueryBuilder::new(link, related, &mut this.aliases)?;

            // For a fan-out relation "no related row matches" differs from
            // "some related row does not match": match the positive form
            // inside and negate the membership test outside.
            let (inner_op, negated) = split_negation(cond.op);
            let inner = cond.with_op(inner_op).retarget(display_ref(related)?);
            let predicate = this.compile_condition(&inner, &subquery.related_scope())?;

            Ok(CompiledPredicate::Leaf(subquery.membership(
                scope,
                Some(predicate),
                negated,
            )))
        })
    }

    /// Null and empty tests on a link ask whether any record is linked.
    fn link_presence(
        &mut self,
        op: ComparisonOp,
        link: &'a LinkToRecord,
        scope: &Scope<'a>,
    ) -> Result<Option<CompiledPredicate>, CompileError> {
        let absent = match op {
            ComparisonOp::IsNull | ComparisonOp::IsEmpty => true,
            ComparisonOp::IsNotNull | ComparisonOp::IsNotEmpty => false,
            _ => return Ok(None),
        };

        let expr = match link.kind {
            RelationKind::BelongsTo => {
                Expr::is_null(scope.column(&link.local_key().column), !absent)
            }
            RelationKind::HasMany | RelationKind::ManyToMany => {
                let related = self.table(link.related_table())?;
                let subquery = RelationSubqueryBuilder::new(link, related, &mut self.aliases)?;
                let count = subquery
                    .correlated(scope, vec![Expr::FunctionCall(FunctionCall::count_star())])
                    .build();
                let op = if absent {
                    BinaryOperator::Eq
                } else {
                    BinaryOperator::Lt
                };
                Expr::binary(Expr::Value(Value::Int(0)), op, Expr::subquery(count))
            }
        };

        Ok(Some(CompiledPredicate::Leaf(expr)))
    }
}
