//! tsql2snowflake: T-SQL to Snowflake SQL converter
//!
//! # Usage
//!
//! ```bash
//! # Convert files, writing converted_<name> next to each input
//! tsql2snowflake orders.sql procs/*.sql
//!
//! # Convert stdin to stdout
//! cat orders.sql | tsql2snowflake -
//!
//! # Show which rewrite steps fired
//! tsql2snowflake explain orders.sql
//! ```

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tsql2snowflake::files;
use tsql2snowflake::prelude::*;

#[derive(Parser)]
#[command(name = "tsql2snowflake")]
#[command(version)]
#[command(about = "❄ Convert T-SQL scripts to Snowflake SQL", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "EXAMPLES:
    tsql2snowflake orders.sql
    tsql2snowflake procs/*.sql -o converted --prefix sf_
    cat orders.sql | tsql2snowflake -
    tsql2snowflake explain orders.sql --format json")]
struct Cli {
    /// T-SQL files to convert (`-` reads stdin and prints to stdout)
    files: Vec<PathBuf>,

    /// Output directory (defaults to each input's directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Output file name prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Print converted SQL instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Config file path
    #[arg(short, long, env = "TSQL2SNOWFLAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a file and show which rewrite steps changed it
    Explain {
        /// The T-SQL file (`-` for stdin)
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// List the rewrite steps in execution order
    Rules {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            let rejected = e
                .downcast_ref::<ConvertError>()
                .is_some_and(ConvertError::is_rejected_input);
            ExitCode::from(if rejected { 2 } else { 1 })
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(cli.verbose, &config.log.level);

    let pipeline = Pipeline::from_config(&config)?;
    tracing::debug!(steps = pipeline.len(), "pipeline ready");

    match &cli.command {
        Some(Commands::Explain { file, format }) => explain(&pipeline, file, *format),
        Some(Commands::Rules { format }) => list_rules(&pipeline, *format),
        None => convert_files(&pipeline, &config, cli),
    }
}

/// `RUST_LOG` wins, then `-v`, then the configured level. Logs go to stderr.
fn init_tracing(verbose: bool, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { level };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> Result<String> {
    if is_stdin(path) {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        return Ok(files::decode_source(buf, "stdin"));
    }
    Ok(files::read_source(path)?)
}

fn convert_files(pipeline: &Pipeline, config: &Config, cli: &Cli) -> Result<()> {
    if cli.files.is_empty() {
        return Err(ConvertError::MissingInput.into());
    }

    let prefix = cli.prefix.as_deref().unwrap_or(&config.output.prefix);
    let out_dir = cli
        .out_dir
        .as_deref()
        .or(config.output.directory.as_deref());

    // Reject bad names before any file is written.
    for file in cli.files.iter().filter(|f| !is_stdin(f)) {
        files::output_file_name(file, prefix)?;
    }

    for file in &cli.files {
        if is_stdin(file) || cli.stdout {
            let source = read_input(file)?;
            println!("{}", pipeline.convert(&source));
            continue;
        }

        let output = files::convert_file(pipeline, Some(file), out_dir, prefix)?;
        eprintln!(
            "{} {} → {}",
            "✓".green(),
            file.display(),
            output.display().to_string().cyan()
        );
    }
    Ok(())
}

fn explain(pipeline: &Pipeline, file: &Path, format: OutputFormat) -> Result<()> {
    let source = read_input(file)?;
    let conversion = pipeline.explain(&source);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&conversion)?);
        }
        OutputFormat::Table => {
            println!("{}", "❄ Conversion Explanation".cyan().bold());
            println!();
            println!("{} {}", "Input:".dimmed(), file.display().to_string().yellow());
            println!();

            if conversion.applied.is_empty() {
                println!("{}", "(no steps changed the script)".dimmed());
            } else {
                println!("{}", "Applied Steps:".green().bold());
                for (i, report) in conversion.applied.iter().enumerate() {
                    println!(
                        "  {:>3}. {} {}",
                        i + 1,
                        format!("{:<14}", report.stage).dimmed(),
                        report.step.cyan()
                    );
                }
            }

            println!();
            println!("{}", "Converted SQL:".green().bold());
            println!("{}", conversion.sql.white());
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct StepEntry<'a> {
    position: usize,
    name: &'a str,
    stage: Stage,
}

fn list_rules(pipeline: &Pipeline, format: OutputFormat) -> Result<()> {
    let entries: Vec<StepEntry<'_>> = pipeline
        .steps()
        .enumerate()
        .map(|(i, (name, stage))| StepEntry {
            position: i + 1,
            name,
            stage,
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Table => {
            let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(4).max(4);
            println!(
                "{}",
                format!("{:>3} │ {:<14} │ {:<width$}", "#", "STAGE", "STEP").white().bold()
            );
            println!(
                "{}",
                format!("{}─┼─{}─┼─{}", "─".repeat(3), "─".repeat(14), "─".repeat(width)).dimmed()
            );
            for entry in &entries {
                println!(
                    "{:>3} │ {:<14} │ {}",
                    entry.position,
                    entry.stage.to_string(),
                    entry.name.cyan()
                );
            }
            println!();
            println!("{} step(s)", entries.len().to_string().cyan());
        }
    }
    Ok(())
}
