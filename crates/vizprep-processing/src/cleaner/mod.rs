//! Duplicate row handling.
//!
//! Rows are compared by full equality across all columns. The first
//! occurrence of each distinct row is kept and the original order of the
//! kept rows is preserved.

use crate::config::DuplicateMode;
use crate::error::Result;
use crate::utils::{duplicate_count, unique_rows};
use polars::prelude::*;
use tracing::{debug, info};

/// Removes or keeps fully identical rows.
pub struct DuplicateHandler;

impl DuplicateHandler {
    /// Apply `mode` and return the table plus the number of rows removed.
    pub fn handle(
        df: DataFrame,
        mode: DuplicateMode,
        processing_steps: &mut Vec<String>,
    ) -> Result<(DataFrame, usize)> {
        if mode == DuplicateMode::Keep {
            processing_steps.push("Kept duplicate rows unchanged".to_string());
            debug!("Duplicate removal disabled");
            return Ok((df, 0));
        }

        let before = df.height();
        let unique = unique_rows(&df)?;
        let removed = before - unique.height();

        if removed == 0 {
            processing_steps.push("No duplicate rows found".to_string());
            debug!("No duplicate rows found");
            return Ok((df, 0));
        }

        let df = unique;

        let pct = (removed as f64 / before as f64) * 100.0;
        processing_steps.push(format!(
            "Removed {} duplicate rows ({:.1}%)",
            removed, pct
        ));
        info!("Removed {} duplicate rows", removed);

        Ok((df, removed))
    }

    /// Count rows equal to an earlier row, without modifying the table.
    pub fn count(df: &DataFrame) -> Result<usize> {
        Ok(duplicate_count(df)?)
    }
}

/// Remove or keep duplicate rows, returning the table and the removed count.
pub fn handle_duplicates(df: DataFrame, mode: DuplicateMode) -> Result<(DataFrame, usize)> {
    DuplicateHandler::handle(df, mode, &mut Vec::new())
}
