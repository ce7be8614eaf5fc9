use crate::error::CliError;
use clap::Parser;
use commands::Commands;
use filter_compiler::{CompilerOptions, InMemoryMetadata, SchemaSnapshot, compile};
use model::{
    core::dialect::SqlDialect,
    filter::FilterNode,
    schema::{Table, TableId},
};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "filterc", version = "0.0.1", about = "Relational filter to SQL compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// A schema document: every table the filter may reach.
#[derive(Deserialize)]
struct SchemaDocument {
    tables: Vec<Table>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr so stdout stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            schema,
            table,
            filter,
            filter_file,
            config,
            dialect,
            json,
        } => {
            let options = load_options(config.as_deref(), dialect)?;
            let filter = load_filter(filter, filter_file).await?;

            let source = tokio::fs::read_to_string(&schema).await?;
            let document: SchemaDocument = serde_json::from_str(&source)?;
            let provider = InMemoryMetadata::new(document.tables);

            let table = TableId::new(table);
            let snapshot = SchemaSnapshot::load(&provider, &table).await?;
            info!(
                "Loaded {} table(s) reachable from {}, compiling for {}",
                snapshot.len(),
                table,
                options.dialect
            );

            let predicate = compile(&filter, &table, &snapshot, &options)?;
            let (sql, params) = predicate.to_sql(options.dialect);
            output::print_compiled(&sql, &params, json)?;
        }
        Commands::Formula { source } => {
            let expr = formula::parse(&source)?;
            let json = serde_json::to_string_pretty(&expr).map_err(CliError::JsonSerialize)?;
            println!("{json}");

            let refs: Vec<String> = expr.references().iter().map(|c| c.to_string()).collect();
            info!("References: {}", refs.join(", "));
        }
    }

    Ok(())
}

fn load_options(
    path: Option<&str>,
    dialect: Option<SqlDialect>,
) -> Result<CompilerOptions, CliError> {
    let options = match path {
        Some(path) => CompilerOptions::from_file(path)?,
        None => CompilerOptions::default(),
    };
    Ok(match dialect {
        Some(dialect) => options.with_dialect(dialect),
        None => options,
    })
}

async fn load_filter(
    inline: Option<String>,
    file: Option<String>,
) -> Result<FilterNode, CliError> {
    let source = match (inline, file) {
        (Some(inline), _) => inline,
        (None, Some(path)) => tokio::fs::read_to_string(path).await?,
        (None, None) => return Err(CliError::MissingFilter),
    };
    Ok(serde_json::from_str(&source)?)
}
