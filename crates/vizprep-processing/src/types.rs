use crate::config::{DuplicateMode, MissingStrategy, OutlierStrategy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Logical column classification used by the cleaning handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point values
    Numeric,
    /// Text, categorical or boolean values
    Categorical,
    /// Dates, nested or unparsed values
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    /// Polars dtype label, e.g. `f64` or `str`.
    pub dtype: String,
    pub kind: ColumnKind,
    pub null_count: usize,
}

/// Read-only overview of a table, shown before cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub missing_cells: usize,
    pub duplicate_rows: usize,
    pub column_summaries: Vec<ColumnSummary>,
}

impl DatasetSummary {
    /// First `n` rows of `df`, for display next to the summary.
    pub fn preview(df: &polars::prelude::DataFrame, n: usize) -> polars::prelude::DataFrame {
        crate::profiler::DataProfiler::preview(df, n)
    }

    pub fn has_missing(&self) -> bool {
        self.missing_cells > 0
    }
}

/// Outcome of the missing-value stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingReport {
    pub values_filled: usize,
    pub rows_dropped: usize,
    /// Columns with no values at all; left untouched because no fill value exists.
    pub empty_columns: Vec<String>,
}

/// Outlier counts for a single numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutliers {
    pub column: String,
    pub detected: usize,
    pub mean: f64,
    pub std_dev: f64,
}

/// Outcome of the outlier stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub columns: Vec<ColumnOutliers>,
    /// Cells rewritten by mean/median replacement or log transformation.
    pub values_changed: usize,
    pub rows_dropped: usize,
}

impl OutlierReport {
    pub fn total_detected(&self) -> usize {
        self.columns.iter().map(|c| c.detected).sum()
    }
}

/// Everything a cleaning run did, recomputed per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub generated_at: DateTime<Utc>,
    pub missing_strategy: MissingStrategy,
    pub duplicate_mode: DuplicateMode,
    pub outlier_strategy: OutlierStrategy,
    pub outlier_threshold: f64,

    pub rows_before: usize,
    pub rows_after: usize,

    pub missing: MissingReport,
    pub duplicates_removed: usize,
    pub outliers: OutlierReport,

    /// Human-readable log of the steps taken.
    pub processing_steps: Vec<String>,
}

impl CleaningReport {
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}
