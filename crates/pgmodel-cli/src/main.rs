use clap::{Parser, ValueEnum};
use colored::Colorize;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

use pgmodel_catalog::Catalog;
use pgmodel_core::{Config, OutputFormat, Report, Severity};
use pgmodel_sql::{Compiler, SqlParser};

/// pgmodel - Compile PostgreSQL DDL into a semantic catalog
#[derive(Parser)]
#[command(name = "pgmodel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// A .sql file, or a directory whose .sql files are compiled in path order
    input: PathBuf,

    /// Path to config file (default: pgmodel.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dump format, overriding the config file
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Write the compile report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Keep compiling after a failing statement
    #[arg(long)]
    keep_going: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = load_config(&cli)?;
    if cli.verbose {
        eprintln!("{} dialect: {:?}", "Using".cyan(), config.dialect);
    }

    let files = collect_sql_files(&cli.input)?;
    if files.is_empty() {
        return Err(anyhow::anyhow!("No .sql files found under {}", cli.input.display()));
    }
    tracing::info!(files = files.len(), input = %cli.input.display(), "compiling input");

    let format = config.output.format;
    let compiler = compile_files(config, &files, cli.verbose)?;
    let report = compiler.report();

    if let Some(path) = &cli.report {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        if cli.verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    print!("{}", render(&compiler.into_catalog(), format)?);

    print_report_summary(&report);

    // Exit with error code if there are errors
    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Config from `--config`, else `./pgmodel.toml`, else defaults; flags win
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("pgmodel.toml").exists() {
        Config::from_file(Path::new("pgmodel.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if let Some(format) = cli.format {
        config.output.format = format.into();
    }
    if cli.keep_going {
        config.fail_fast = false;
    }
    Ok(config)
}

/// The input file itself, or every .sql file below the input directory
fn collect_sql_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(anyhow::anyhow!("Input not found: {}", input.display()));
    }

    let mut sql_files = Vec::new();
    for entry in WalkDir::new(input)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "sql") {
            sql_files.push(entry.path().to_path_buf());
        }
    }
    Ok(sql_files)
}

/// Parse and compile every file as one statement stream
///
/// A parse failure or a failing statement stops the run while `fail_fast` is
/// set. Otherwise it is recorded in the report and the run continues.
fn compile_files(config: Config, files: &[PathBuf], verbose: bool) -> Result<Compiler> {
    let parser = SqlParser::from_dialect(&config.dialect);
    let fail_fast = config.fail_fast;
    let mut compiler = Compiler::new(config)?;

    for path in files {
        if verbose {
            eprintln!("  {} {}...", "Compiling".cyan(), path.display());
        }

        let parsed = match parser.parse_file(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                compiler.add_diagnostic(e.to_diagnostic());
                if fail_fast {
                    break;
                }
                continue;
            }
        };

        match compiler.compile_parsed(&parsed) {
            Ok(outcome) if verbose => {
                eprintln!(
                    "    {} applied, {} skipped, {} failed",
                    outcome.applied.to_string().green(),
                    outcome.skipped.to_string().yellow(),
                    outcome.failed.to_string().red()
                );
            }
            Ok(_) => {}
            // Already recorded in the report
            Err(_) => break,
        }
    }

    Ok(compiler)
}

fn render(catalog: &Catalog, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(catalog.render_text()),
        OutputFormat::Json => Ok(format!("{}\n", catalog.to_json()?)),
    }
}

fn print_report_summary(report: &Report) {
    let summary = &report.summary;
    eprintln!(
        "{} {} statements: {} applied, {} skipped",
        "Compiled".bold(),
        summary.statements,
        summary.applied,
        summary.skipped
    );

    for diag in &report.diagnostics {
        let severity_str = match diag.severity {
            Severity::Error => "ERROR".red().bold(),
            Severity::Warn => "WARN".yellow().bold(),
            Severity::Info => "INFO".cyan(),
        };

        let location = match (&diag.location, diag.statement) {
            (Some(location), Some(index)) => format!(" {} (statement {})", location, index + 1),
            (Some(location), None) => format!(" {}", location),
            (None, Some(index)) => format!(" (statement {})", index + 1),
            (None, None) => String::new(),
        };
        eprintln!("  [{}] {}{}: {}", severity_str, diag.code, location, diag.message);
    }

    if summary.errors > 0 {
        eprintln!("{} {}", summary.errors.to_string().red().bold(), "errors".red());
    } else if summary.warnings > 0 {
        eprintln!("{} {}", summary.warnings.to_string().yellow(), "warnings".yellow());
    } else {
        eprintln!("{}", "✓ No issues found!".green().bold());
    }
}
