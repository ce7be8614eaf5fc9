use clap::Subcommand;
use model::core::dialect::SqlDialect;

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a filter tree against a schema document
    Compile {
        #[arg(long, help = "Schema document (JSON) describing the tables")]
        schema: String,

        #[arg(long, help = "Id of the table the filter applies to")]
        table: String,

        #[arg(long, help = "Filter tree as inline JSON", conflicts_with = "filter_file")]
        filter: Option<String>,

        #[arg(long, help = "Path to a JSON file holding the filter tree")]
        filter_file: Option<String>,

        #[arg(long, help = "Compiler options file (.toml or .json)")]
        config: Option<String>,

        /// SQL dialect: "pg", "mysql" or "sqlite"
        #[arg(long)]
        dialect: Option<SqlDialect>,

        #[arg(long, help = "Print the SQL and parameters as JSON")]
        json: bool,
    },
    /// Parse a formula and print its expression tree
    Formula {
        /// Formula source, e.g. "{Price} * 2"
        source: String,
    },
}
