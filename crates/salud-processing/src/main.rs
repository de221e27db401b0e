//! CLI entry point for the health-survey preprocessing pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use salud_processing::{Pipeline, PipelineResult, PreprocessorConfig};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Normalization and repair pipeline for raw health-survey tables",
    long_about = "Cleans a raw health-survey CSV export: canonicalizes column names,\n\
                  repairs rows mis-split upstream, coerces declared column types,\n\
                  normalizes text and derives indicator columns.\n\n\
                  EXAMPLES:\n  \
                  # Clean an export with default settings\n  \
                  salud-processing -i raw/synthetic_health_data.csv -o processed/health_clean_data.csv\n\n  \
                  # Tighter malformed-row detection, no derived features\n  \
                  salud-processing -i raw.csv -o clean.csv --repair-threshold 0.9 --no-features\n\n  \
                  # Machine-readable run summary\n  \
                  salud-processing -i raw.csv -o clean.csv --json | jq .repair"
)]
struct Args {
    /// Path to the raw CSV file to process
    #[arg(short, long)]
    input: String,

    /// Path of the cleaned CSV file to write
    #[arg(short, long)]
    output: String,

    /// Missing-field ratio above which a row counts as malformed (0.0 - 1.0)
    #[arg(long, default_value = "0.8")]
    repair_threshold: f64,

    /// Canonical column names to drop unconditionally (repeatable)
    #[arg(long = "drop", value_name = "COLUMN")]
    drop_columns: Vec<String>,

    /// Skip the feature-derivation stage
    #[arg(long)]
    no_features: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors)
    #[arg(short, long)]
    quiet: bool,

    /// Print the run summary as JSON to stdout instead of the
    /// human-readable block; disables all logging
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled so stdout
/// only contains the JSON summary.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading dataset from: {}", args.input);
    let data = load_raw_csv(&args.input)?;
    info!("Dataset loaded: {:?}", data.shape());

    let config = PreprocessorConfig::builder()
        .repair_threshold(args.repair_threshold)
        .drop_columns(args.drop_columns.clone())
        .run_features(!args.no_features)
        .build()?;

    let pipeline = Pipeline::builder().config(config).build()?;
    let mut result = pipeline.process(data)?;

    write_clean_csv(&mut result.data, &args.output)?;
    info!("Cleaned dataset written to: {}", args.output);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.summary)?);
    } else if !args.quiet {
        print_summary(&result, &args);
    }

    Ok(())
}

/// Load the raw export with every column as a string.
///
/// No schema inference: cell values are strings until the coercion stage
/// applies the declared per-column policies; empty fields load as null.
fn load_raw_csv(path: &str) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .map_err(|e| anyhow!("Failed to read input file: {e}"))
}

/// Write the cleaned table: canonical headers, ISO-8601 dates,
/// true/false booleans, missing values as empty fields.
fn write_clean_csv(df: &mut DataFrame, path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    CsvWriter::new(file).include_header(true).finish(df)?;
    Ok(())
}

/// Print a human-readable summary of the run.
///
/// Uses `println!` intentionally: this is the primary CLI output, visible
/// regardless of log level.
fn print_summary(result: &PipelineResult, args: &Args) {
    let summary = &result.summary;

    println!();
    println!("{}", "=".repeat(72));
    println!("PREPROCESSING COMPLETE");
    println!("{}", "=".repeat(72));
    println!();
    println!(
        "Input:  {} ({} rows x {} columns)",
        args.input, summary.rows_before, summary.columns_before
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        args.output, summary.rows_after, summary.columns_after
    );
    println!();
    println!("Duration: {}ms", summary.duration_ms);

    if !summary.dropped_columns.is_empty() {
        println!("Dropped columns: {:?}", summary.dropped_columns);
    }

    println!(
        "Malformed rows: {} detected, {} repaired, {} irreparable",
        summary.repair.detected, summary.repair.repaired, summary.repair.irreparable
    );

    if !summary.coercion_steps.is_empty() {
        println!("Type coercion:");
        for step in summary.coercion_steps.iter().take(8) {
            println!("  - {step}");
        }
        if summary.coercion_steps.len() > 8 {
            println!("  ... and {} more", summary.coercion_steps.len() - 8);
        }
    }

    if !summary.actions.is_empty() {
        println!("Actions:");
        for action in &summary.actions {
            println!("  - {action}");
        }
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  ! {warning}");
        }
    }

    println!();
    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(72));
}
