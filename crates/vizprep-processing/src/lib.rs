//! Dataset Loading and Cleaning Library
//!
//! Loads tabular uploads into Polars data frames, cleans them with a small
//! set of user-chosen strategies and asks an LLM for chart suggestions.
//!
//! # Overview
//!
//! - **Loading**: CSV (encoding and delimiter detection), XLS/XLSX, JSON and PDF
//! - **Summary**: shape, missing cells, duplicate rows and column types
//! - **Cleaning**: missing values, then duplicates, then Z-score outliers
//! - **Reporting**: a [`CleaningReport`] for every run
//! - **Export**: UTF-8 CSV with a header row
//! - **Chart Advisor**: LLM-backed chart suggestions with untrusted plotting code
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vizprep_processing::{CleaningConfig, MissingStrategy, OutlierStrategy, Session};
//!
//! let mut session = Session::from_path("sales.csv")?;
//! let summary = session.summary()?;
//! println!("{} rows, {} missing cells", summary.rows, summary.missing_cells);
//!
//! let config = CleaningConfig::builder()
//!     .missing_strategy(MissingStrategy::Median)
//!     .outlier_strategy(OutlierStrategy::Drop)
//!     .outlier_threshold(3.0)
//!     .build()?;
//! let report = session.clean(config)?;
//! println!("Removed {} rows", report.rows_removed());
//!
//! std::fs::write("sales_clean.csv", session.export_csv()?)?;
//! ```
//!
//! The handlers can also be used one at a time:
//!
//! ```rust,ignore
//! use vizprep_processing::{handle_duplicates, handle_missing, handle_outliers};
//!
//! let (df, missing) = handle_missing(df, MissingStrategy::Mean)?;
//! let (df, removed) = handle_duplicates(df, DuplicateMode::Remove)?;
//! let (df, outliers) = handle_outliers(df, OutlierStrategy::Median, 3.0)?;
//! ```

pub mod ai;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod export;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DuplicateHandler, handle_duplicates};
pub use config::{
    CleaningConfig, CleaningConfigBuilder, ConfigValidationError, DEFAULT_OUTLIER_THRESHOLD,
    DuplicateMode, MissingStrategy, OutlierStrategy,
};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use export::{save_csv, to_csv_bytes, write_csv};
pub use imputers::{MissingValueHandler, StatisticalImputer, handle_missing};
pub use loader::{FileFormat, load_dataset, load_dataset_from_path};
pub use pipeline::{
    CleaningOutcome, CleaningPipeline, CleaningPipelineBuilder, ClosureProgressReporter,
    OutlierHandler, PipelineStage, ProgressReporter, ProgressUpdate, handle_outliers,
};
pub use profiler::{DataProfiler, summarize};
pub use session::Session;
pub use types::{
    CleaningReport, ColumnKind, ColumnOutliers, ColumnSummary, DatasetSummary, MissingReport,
    OutlierReport,
};
