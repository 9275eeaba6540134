//! Missing value handling.
//!
//! [`MissingValueHandler`] applies one [`MissingStrategy`] to the whole table.
//! Column-level fills live in [`StatisticalImputer`].

mod statistical;

pub use statistical::StatisticalImputer;

use crate::config::MissingStrategy;
use crate::error::{PreprocessingError, Result};
use crate::types::MissingReport;
use crate::utils::{
    filter_rows, frame_nan_as_null, is_numeric_dtype, null_row_mask, total_null_count,
};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Applies a missing value strategy to a table.
pub struct MissingValueHandler;

impl MissingValueHandler {
    /// Fill or drop missing cells according to `strategy`.
    ///
    /// Float NaN cells are treated as missing. Columns without a single value
    /// are left as they are and listed in [`MissingReport::empty_columns`].
    pub fn handle(
        df: DataFrame,
        strategy: MissingStrategy,
        processing_steps: &mut Vec<String>,
    ) -> Result<(DataFrame, MissingReport)> {
        let mut report = MissingReport::default();
        let df = frame_nan_as_null(df)?;

        if total_null_count(&df) == 0 {
            debug!("No missing values, skipping");
            return Ok((df, report));
        }

        info!("Handling missing values with strategy '{}'", strategy);

        if strategy == MissingStrategy::Drop {
            let has_null = null_row_mask(&df);
            let keep: Vec<bool> = has_null.iter().map(|&n| !n).collect();
            let cleaned = filter_rows(&df, &keep)?;
            report.rows_dropped = df.height() - cleaned.height();
            processing_steps.push(format!(
                "Dropped {} rows containing missing values",
                report.rows_dropped
            ));
            return Ok((cleaned, report));
        }

        let mut df = df;
        let columns_with_missing: Vec<(String, bool)> = df
            .get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .map(|col| (col.name().to_string(), is_numeric_dtype(col.dtype())))
            .collect();

        for (col_name, numeric) in &columns_with_missing {
            let filled = match (strategy, numeric) {
                (MissingStrategy::Mean, true) => {
                    StatisticalImputer::apply_numeric_mean(&mut df, col_name, processing_steps)
                }
                (MissingStrategy::Median, true) => {
                    StatisticalImputer::apply_numeric_median(&mut df, col_name, processing_steps)
                }
                _ => StatisticalImputer::apply_mode_imputation(&mut df, col_name, processing_steps),
            };

            match filled {
                Ok(count) => report.values_filled += count,
                Err(PreprocessingError::EmptyColumn(_)) => {
                    warn!("Column '{}' is empty, leaving it unmodified", col_name);
                    processing_steps.push(format!(
                        "Left '{}' unmodified: column has no values",
                        col_name
                    ));
                    report.empty_columns.push(col_name.clone());
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Filled {} values, {} empty columns",
            report.values_filled,
            report.empty_columns.len()
        );

        Ok((df, report))
    }
}

/// Fill or drop missing cells, returning the new table and what changed.
pub fn handle_missing(
    df: DataFrame,
    strategy: MissingStrategy,
) -> Result<(DataFrame, MissingReport)> {
    MissingValueHandler::handle(df, strategy, &mut Vec::new())
}
