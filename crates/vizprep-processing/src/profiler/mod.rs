//! Dataset summary for display before cleaning.
//!
//! The profiler is read-only: it never modifies the table it inspects.

use crate::error::Result;
use crate::types::{ColumnSummary, DatasetSummary};
use crate::cleaner::DuplicateHandler;
use crate::utils::{column_kind, total_null_count};
use polars::prelude::*;
use tracing::debug;

/// Number of rows shown by [`DataProfiler::preview`] when the caller has no preference.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Builds [`DatasetSummary`] values.
pub struct DataProfiler;

impl DataProfiler {
    /// Summarize shape, missing cells, duplicate rows and column types.
    pub fn summarize(df: &DataFrame) -> Result<DatasetSummary> {
        let column_summaries: Vec<ColumnSummary> = df
            .get_columns()
            .iter()
            .map(|col| ColumnSummary {
                name: col.name().to_string(),
                dtype: col.dtype().to_string(),
                kind: column_kind(col.dtype()),
                null_count: col.null_count(),
            })
            .collect();

        let duplicate_rows = DuplicateHandler::count(df)?;

        let summary = DatasetSummary {
            rows: df.height(),
            columns: df.width(),
            missing_cells: total_null_count(df),
            duplicate_rows,
            column_summaries,
        };

        debug!(
            "Summary: {} rows x {} columns, {} missing cells, {} duplicate rows",
            summary.rows, summary.columns, summary.missing_cells, summary.duplicate_rows
        );

        Ok(summary)
    }

    /// First `n` rows of the table.
    pub fn preview(df: &DataFrame, n: usize) -> DataFrame {
        df.head(Some(n))
    }
}

/// Summarize a table without modifying it.
pub fn summarize(df: &DataFrame) -> Result<DatasetSummary> {
    DataProfiler::summarize(df)
}
