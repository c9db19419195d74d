//! CLI entry point for `ddlscope`.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use ddlscope::audit::{schema_warnings, Severity};
use ddlscope::output::{context, formatter, report};
use ddlscope::schema::SchemaParser;
use ddlscope::source::{self, SourceError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ddlscope",
    about = "Extract tables, keys and RLS policies from SQL schema files"
)]
struct Cli {
    /// Input SQL files
    #[arg(required_unless_present = "schema_dir")]
    input: Vec<PathBuf>,

    /// Process all .sql files in directory
    #[arg(long)]
    schema_dir: Option<PathBuf>,

    /// List the .sql files in --schema-dir as JSON and exit
    #[arg(long, requires = "schema_dir")]
    list: bool,

    /// What to print when no --output-dir is given
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write JSON, chat context and report files into this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Exit with status 1 when the schema has error-level warnings
    #[arg(long)]
    strict: bool,

    /// Print verbose diagnostics
    #[arg(long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Parsed schema as pretty-printed JSON
    Json,
    /// Plain-text schema summary for chat prompts
    Context,
    /// Markdown report with warnings
    Report,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list {
        let Some(dir) = &cli.schema_dir else {
            fail("--list requires --schema-dir");
        };
        let sources = source::list_schema_sources(dir).unwrap_or_else(|e| fail(&e.to_string()));
        match serde_json::to_string_pretty(&sources) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(&format!("Error serializing catalog: {e}")),
        }
        return;
    }

    let sql_files = collect_inputs(&cli).unwrap_or_else(|e| fail(&e.to_string()));
    if sql_files.is_empty() {
        fail("No input SQL files provided");
    }

    // Read and concatenate all SQL
    let mut combined_sql = String::new();
    for path in &sql_files {
        match source::read_source(path) {
            Ok(content) => {
                combined_sql.push_str(&content);
                combined_sql.push('\n');
            }
            Err(e) => fail(&e.to_string()),
        }
    }

    let schema = SchemaParser::new().parse(&combined_sql);
    let warnings = schema_warnings(&schema);
    debug!(
        files = sql_files.len(),
        tables = schema.stats.total_tables,
        policies = schema.stats.total_rls_policies,
        warnings = warnings.len(),
        "parsed input"
    );

    match &cli.output_dir {
        Some(output_dir) => {
            // Derive name from first input file
            let name = sql_files
                .first()
                .and_then(|p| p.file_stem())
                .and_then(|s| s.to_str())
                .unwrap_or("schema");
            if let Err(e) = formatter::write_output(output_dir, name, &schema, &warnings) {
                fail(&format!("Error writing output: {e}"));
            }
        }
        None => match cli.format {
            Format::Json => match serde_json::to_string_pretty(&schema) {
                Ok(json) => println!("{json}"),
                Err(e) => fail(&format!("Error serializing schema: {e}")),
            },
            Format::Context => println!("{}", context::schema_context(&schema)),
            Format::Report => print!("{}", report::build_report(&schema, &warnings)),
        },
    }

    for warning in &warnings {
        debug!(severity = %warning.severity, "{}", warning.message);
    }
    if cli.strict && warnings.iter().any(|w| w.severity == Severity::Error) {
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ddlscope=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit input files followed by the sorted `.sql` files of `--schema-dir`.
fn collect_inputs(cli: &Cli) -> Result<Vec<PathBuf>, SourceError> {
    let mut sql_files = cli.input.clone();
    if let Some(dir) = &cli.schema_dir {
        if !Path::new(dir).is_dir() {
            return Err(SourceError::NotFound { path: dir.clone() });
        }
        sql_files.extend(
            source::list_schema_sources(dir)?
                .into_iter()
                .map(|s| s.path),
        );
    }
    Ok(sql_files)
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    process::exit(2);
}
