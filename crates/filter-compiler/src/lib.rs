//! Compiles declarative filter trees over logical columns into SQL
//! predicates.
//!
//! ```ignore
//! let snapshot = SchemaSnapshot::load(&provider, &"orders".into()).await?;
//! let predicate = compile(&filter, &"orders".into(), &snapshot, &CompilerOptions::default())?;
//! let (sql, params) = predicate.to_sql(SqlDialect::Postgres);
//! ```

pub mod alias;
pub mod compiler;
pub mod config;
pub mod error;
pub mod operator;
pub mod predicate;
pub mod resolver;

pub use compiler::{ConditionCompiler, Scope};
pub use config::CompilerOptions;
pub use error::CompileError;
pub use predicate::CompiledPredicate;
pub use resolver::{ColumnResolver, InMemoryMetadata, MetadataProvider, SchemaSnapshot};

use model::{filter::FilterNode, schema::TableId};

/// Compiles `filter` against `target_table`. The filter tree is only
/// borrowed, and every call gets its own alias counter.
pub fn compile<R>(
    filter: &FilterNode,
    target_table: &TableId,
    resolver: &R,
    options: &CompilerOptions,
) -> Result<CompiledPredicate, CompileError>
where
    R: ColumnResolver + ?Sized,
{
    ConditionCompiler::new(resolver, options).compile(filter, target_table)
}
