//! benchtrack CLI - parse, store, merge and compare Go benchmark results

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};

mod report;

use benchtrack_core::{
    compare_two_files, comparison_json, deduplicate_runs, encode_runs, format_comparison_results,
    merge_runs_from_files, read_runs, sort_by_date, sort_by_date_descending, write_run_to_file,
    write_runs, Parser, Run,
};

/// benchtrack: track and compare Go benchmark results over time
#[derive(ClapParser, Debug)]
#[command(name = "benchtrack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse benchmark output into a stored run
    Parse(ParseArgs),
    /// Merge multiple run files
    Merge(MergeArgs),
    /// Compare two runs and detect regressions
    Compare(CompareArgs),
    /// Generate an HTML report
    Report(ReportArgs),
}

#[derive(ClapParser, Debug)]
struct ParseArgs {
    /// Benchmark output file (default: stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file for the run JSON (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Version label for this run
    #[arg(long = "run-version")]
    run_version: Option<String>,

    /// Tags to attach to this run
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,

    /// Unix timestamp for this run (default: now)
    #[arg(long)]
    date: Option<i64>,

    /// Toolchain version to stamp onto every parsed suite
    #[arg(long)]
    go_version: Option<String>,

    /// Append to an existing output file instead of overwriting
    #[arg(long)]
    append: bool,
}

#[derive(ClapParser, Debug)]
struct MergeArgs {
    /// Run files to merge, in order
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Remove duplicate runs (same version and date)
    #[arg(long)]
    unique: bool,

    /// Sort by date descending (newest first)
    #[arg(short = 'd', long)]
    sort_desc: bool,
}

#[derive(ClapParser, Debug)]
struct CompareArgs {
    /// Baseline run file
    before: PathBuf,

    /// Run file to compare against the baseline
    after: PathBuf,

    /// Regression threshold percentage
    #[arg(short, long, default_value_t = 5.0)]
    threshold: f64,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(ClapParser, Debug)]
struct ReportArgs {
    /// Run file to render
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Baseline run file; enables comparison mode
    #[arg(short, long, value_name = "FILE")]
    compare: Option<PathBuf>,

    /// Regression threshold percentage
    #[arg(short, long, default_value_t = 5.0)]
    threshold: f64,

    /// Output HTML file
    #[arg(short, long, default_value = "bench-report.html")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Parse(args) => parse_command(args),
        Commands::Merge(args) => merge_command(args),
        Commands::Compare(args) => compare_command(args),
        Commands::Report(args) => report_command(args),
    }
}

fn parse_command(args: ParseArgs) -> Result<()> {
    let parser = match &args.go_version {
        Some(version) => Parser::with_go_version(version),
        None => Parser::new(),
    };

    let suites = match &args.input {
        Some(path) => parser
            .parse_file(path)
            .with_context(|| format!("failed to parse {}", path.display()))?,
        None => {
            debug!("Reading benchmark output from stdin");
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            parser
                .parse_bytes(input.as_bytes())
                .context("failed to parse benchmark output")?
        }
    };

    if suites.is_empty() {
        bail!("no benchmark suites found in input");
    }

    let date = args.date.unwrap_or_else(|| Utc::now().timestamp());
    let run = Run::new(
        suites,
        args.run_version.unwrap_or_default(),
        date,
        args.tags,
    );

    match &args.output {
        Some(path) => {
            write_run_to_file(path, &run, args.append)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                "Parsed {} benchmark suites to {}",
                run.suites.len(),
                path.display()
            );
        }
        None => {
            encode_runs(std::io::stdout().lock(), &[run])?;
        }
    }

    Ok(())
}

fn merge_command(args: MergeArgs) -> Result<()> {
    let mut runs = merge_runs_from_files(&args.files).context("failed to merge runs")?;

    if runs.is_empty() {
        bail!("no runs found in input files");
    }

    if args.unique {
        runs = deduplicate_runs(runs);
    }

    if args.sort_desc {
        sort_by_date_descending(&mut runs);
    } else {
        sort_by_date(&mut runs);
    }

    match &args.output {
        Some(path) => {
            write_runs(path, &runs)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Merged {} runs to {}", runs.len(), path.display());
        }
        None => {
            encode_runs(std::io::stdout().lock(), &runs)?;
        }
    }

    Ok(())
}

fn compare_command(args: CompareArgs) -> Result<()> {
    let results =
        compare_two_files(&args.before, &args.after).context("failed to compare runs")?;

    match args.format {
        OutputFormat::Table => {
            println!("{}", format_comparison_results(&results, args.threshold));
        }
        OutputFormat::Json => {
            println!("{}", comparison_json(&results));
        }
    }

    Ok(())
}

fn report_command(args: ReportArgs) -> Result<()> {
    let html = match &args.compare {
        Some(baseline) => {
            let results = compare_two_files(baseline, &args.file)
                .context("failed to compare runs")?;
            report::render_comparison(&results, args.threshold)?
        }
        None => {
            let runs = read_runs(&args.file)
                .with_context(|| format!("failed to read {}", args.file.display()))?;
            if runs.is_empty() {
                bail!("no runs found in {}", args.file.display());
            }
            report::render_runs(&runs)?
        }
    };

    report::write_report(&args.output, &html)?;
    info!("Wrote HTML report to {}", args.output.display());

    Ok(())
}
