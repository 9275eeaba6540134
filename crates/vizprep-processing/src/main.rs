//! CLI entry point for loading, cleaning and exporting a dataset.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use vizprep_processing::{
    CleaningConfig, CleaningReport, DatasetSummary, DuplicateMode, MissingStrategy,
    OutlierStrategy, Session, profiler::DEFAULT_PREVIEW_ROWS, save_csv,
};

#[cfg(feature = "ai")]
use std::env;
#[cfg(feature = "ai")]
use std::sync::Arc;
#[cfg(feature = "ai")]
use vizprep_processing::ai::{AnthropicProvider, ChartAdvisor};

/// CLI-compatible missing value strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingStrategy {
    /// Fill numeric columns with the mean, others with the mode
    Mean,
    /// Fill numeric columns with the median, others with the mode
    Median,
    /// Fill every column with its mode
    MostFrequent,
    /// Drop rows with missing values
    Drop,
}

impl From<CliMissingStrategy> for MissingStrategy {
    fn from(cli: CliMissingStrategy) -> Self {
        match cli {
            CliMissingStrategy::Mean => MissingStrategy::Mean,
            CliMissingStrategy::Median => MissingStrategy::Median,
            CliMissingStrategy::MostFrequent => MissingStrategy::MostFrequent,
            CliMissingStrategy::Drop => MissingStrategy::Drop,
        }
    }
}

/// CLI-compatible duplicate mode enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliDuplicateMode {
    /// Keep the first occurrence of each row
    Remove,
    /// Leave duplicate rows in place
    Keep,
}

impl From<CliDuplicateMode> for DuplicateMode {
    fn from(cli: CliDuplicateMode) -> Self {
        match cli {
            CliDuplicateMode::Remove => DuplicateMode::Remove,
            CliDuplicateMode::Keep => DuplicateMode::Keep,
        }
    }
}

/// CLI-compatible outlier strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierStrategy {
    /// Report outliers without changing anything
    Nothing,
    /// Replace positive values with ln(x + 1)
    LogTransformation,
    /// Replace outliers with the column mean
    Mean,
    /// Replace outliers with the column median
    Median,
    /// Remove rows containing outliers
    Drop,
}

impl From<CliOutlierStrategy> for OutlierStrategy {
    fn from(cli: CliOutlierStrategy) -> Self {
        match cli {
            CliOutlierStrategy::Nothing => OutlierStrategy::Nothing,
            CliOutlierStrategy::LogTransformation => OutlierStrategy::LogTransformation,
            CliOutlierStrategy::Mean => OutlierStrategy::Mean,
            CliOutlierStrategy::Median => OutlierStrategy::Median,
            CliOutlierStrategy::Drop => OutlierStrategy::Drop,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Load, clean and export tabular datasets",
    long_about = "Loads a CSV, XLS/XLSX, JSON or PDF file, cleans it and writes a UTF-8 CSV.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  ANTHROPIC_API_KEY    API key for chart suggestions (required for --ask)\n\n\
                  EXAMPLES:\n  \
                  # Clean with defaults (mean fill, remove duplicates, keep outliers)\n  \
                  vizprep -i sales.csv\n\n  \
                  # Show the dataset summary only\n  \
                  vizprep -i sales.xlsx --summary-only\n\n  \
                  # Drop outliers beyond 2.5 standard deviations\n  \
                  vizprep -i sales.json --outliers drop --threshold 2.5\n\n  \
                  # Clean and keep the report\n  \
                  vizprep -i sales.csv --report outputs/sales_report.json\n\n  \
                  # Ask for a chart suggestion\n  \
                  vizprep -i sales.csv --ask \"monthly revenue trend\""
)]
struct Args {
    /// Path to the dataset (csv, xls, xlsx, json or pdf)
    #[arg(short, long)]
    input: String,

    /// Path of the cleaned CSV
    ///
    /// Defaults to "./outputs/<input_name>_cleaned.csv"
    #[arg(short, long)]
    output: Option<String>,

    /// Strategy for missing values
    #[arg(long, value_enum, default_value = "mean")]
    missing: CliMissingStrategy,

    /// What to do with duplicate rows
    #[arg(long, value_enum, default_value = "remove")]
    duplicates: CliDuplicateMode,

    /// Strategy for Z-score outliers
    #[arg(long, value_enum, default_value = "nothing")]
    outliers: CliOutlierStrategy,

    /// Z-score threshold above which a value is an outlier
    #[arg(long, default_value = "3.0")]
    threshold: f64,

    /// Write the cleaning report as JSON to this path
    #[arg(short = 'r', long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Print the dataset summary and exit without cleaning
    #[arg(long)]
    summary_only: bool,

    /// Ask the chart advisor for a visualization of the cleaned data
    #[arg(long, conflicts_with = "summary_only")]
    ask: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
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

    init_logging(&args.log_level, args.quiet);

    // Load environment variables from .env file
    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading dataset from: {}", args.input);
    let mut session = Session::from_path(&args.input)?;
    let summary = session.summary()?;
    print_summary(&session, &summary);

    if args.summary_only {
        return Ok(());
    }

    let config = CleaningConfig::builder()
        .missing_strategy(args.missing.into())
        .duplicate_mode(args.duplicates.into())
        .outlier_strategy(args.outliers.into())
        .outlier_threshold(args.threshold)
        .build()?;

    let report = match session.clean(config) {
        Ok(report) => report.clone(),
        Err(e) => {
            error!("Cleaning failed [{}]: {}", e.error_code(), e);
            return Err(anyhow!("Cleaning failed: {}", e));
        }
    };

    let output_path = args
        .output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&args.input));
    save_csv(session.current(), &output_path)?;
    info!("Cleaned dataset written to: {}", output_path.display());

    if let Some(ref report_path) = args.report {
        write_report(&report, report_path)?;
        info!("Report written to: {}", report_path.display());
    }

    print_report(&report, &output_path);

    if let Some(ref request) = args.ask {
        ask_advisor(&session, request)?;
    }

    Ok(())
}

fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

fn default_output_path(input: &str) -> PathBuf {
    PathBuf::from("./outputs").join(format!("{}_cleaned.csv", extract_file_stem(input)))
}

fn write_report(report: &CleaningReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(report)?)?;
    Ok(())
}

/// Print the dataset summary and a short preview.
fn print_summary(session: &Session, summary: &DatasetSummary) {
    println!();
    println!("{}", "=".repeat(80));
    println!("DATASET SUMMARY");
    println!("{}", "=".repeat(80));
    println!("  File: {}", session.source_name());
    println!("  Rows: {}", summary.rows);
    println!("  Columns: {}", summary.columns);
    println!("  Missing cells: {}", summary.missing_cells);
    println!("  Duplicate rows: {}", summary.duplicate_rows);
    println!();

    println!("{:<24} {:<12} {:<12} {:<10}", "Column", "Type", "Kind", "Missing");
    println!("{}", "-".repeat(60));
    for col in &summary.column_summaries {
        println!(
            "{:<24} {:<12} {:<12} {:<10}",
            truncate_str(&col.name, 23),
            col.dtype,
            format!("{:?}", col.kind),
            col.null_count
        );
    }
    println!();

    println!("PREVIEW");
    println!(
        "{}",
        DatasetSummary::preview(session.original(), DEFAULT_PREVIEW_ROWS)
    );
}

fn print_report(report: &CleaningReport, output_path: &Path) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!("Output: {}", output_path.display());
    println!(
        "  Rows: {} -> {} ({} removed)",
        report.rows_before,
        report.rows_after,
        report.rows_removed()
    );
    println!("  Missing values filled: {}", report.missing.values_filled);
    println!("  Rows dropped for missing values: {}", report.missing.rows_dropped);
    if !report.missing.empty_columns.is_empty() {
        println!(
            "  Columns left empty: {}",
            report.missing.empty_columns.join(", ")
        );
    }
    println!("  Duplicates removed: {}", report.duplicates_removed);
    println!(
        "  Outliers detected: {} (threshold {})",
        report.outliers.total_detected(),
        report.outlier_threshold
    );
    for col in report.outliers.columns.iter().filter(|c| c.detected > 0) {
        println!("    - {}: {}", col.column, col.detected);
    }
    println!("{}", "=".repeat(80));
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(feature = "ai")]
fn ask_advisor(session: &Session, request: &str) -> Result<()> {
    let api_key = env::var("ANTHROPIC_API_KEY")
        .map_err(|_| anyhow!("ANTHROPIC_API_KEY must be set to use --ask"))?;

    let advisor = ChartAdvisor::new(Arc::new(AnthropicProvider::new(api_key)?));
    let suggestion = advisor.suggest(&session.advisor_context(), request)?;

    println!();
    println!("CHART SUGGESTION");
    println!("{}", "-".repeat(40));
    println!("Request: {}", request);
    println!("Analysis: {}", suggestion.query_analysis.trim());
    println!("Visualization: {}", suggestion.visualization);
    println!("Why: {}", suggestion.rationale.trim());
    println!();
    println!("Generated code (untrusted, review before running):");
    println!("{}", suggestion.code);

    Ok(())
}

#[cfg(not(feature = "ai"))]
fn ask_advisor(_session: &Session, _request: &str) -> Result<()> {
    Err(anyhow!(
        "Chart suggestions are not compiled in. Rebuild with --features ai."
    ))
}
