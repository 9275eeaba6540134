//! Outlier handling module.
//!
//! Contains functions for detecting Z-score outliers in numeric columns and
//! applying an [`OutlierStrategy`] to them.

use crate::config::{OutlierStrategy, validate_threshold};
use crate::error::Result;
use crate::types::{ColumnOutliers, OutlierReport};
use crate::utils::{filter_rows, nan_as_null, numeric_column_names, numeric_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Z-score statistics and flags for one numeric column.
#[derive(Debug, Clone)]
pub struct ColumnZScores {
    pub name: String,
    pub values: Vec<Option<f64>>,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    /// `true` where |z| exceeds the threshold. Nulls are never flagged.
    pub flags: Vec<bool>,
}

impl ColumnZScores {
    /// Compute statistics over the present values of `series` and flag outliers.
    ///
    /// Uses the population standard deviation. NaN counts as missing. A
    /// column without values or without variance has no outliers.
    pub fn compute(series: &Series, threshold: f64) -> PolarsResult<Self> {
        let float_series = nan_as_null(&series.cast(&DataType::Float64)?)?;
        let values = numeric_values(&float_series)?;
        let col_mean = float_series.mean().unwrap_or(0.0);
        let median = float_series.median().unwrap_or(0.0);
        let std_dev = float_series.std(0).unwrap_or(0.0);

        let flags = values
            .iter()
            .map(|v| match v {
                Some(x) if std_dev > 0.0 => ((x - col_mean) / std_dev).abs() > threshold,
                _ => false,
            })
            .collect();

        Ok(Self {
            name: series.name().to_string(),
            values,
            mean: col_mean,
            median,
            std_dev,
            flags,
        })
    }

    pub fn outlier_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    fn summary(&self) -> ColumnOutliers {
        ColumnOutliers {
            column: self.name.clone(),
            detected: self.outlier_count(),
            mean: self.mean,
            std_dev: self.std_dev,
        }
    }
}

/// Handles outlier detection and treatment.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Flag outliers in every numeric column of `df`.
    pub fn detect(df: &DataFrame, threshold: f64) -> Result<Vec<ColumnZScores>> {
        validate_threshold(threshold)?;
        let mut scores = Vec::new();
        for col_name in numeric_column_names(df) {
            let series = df.column(&col_name)?.as_materialized_series();
            scores.push(ColumnZScores::compute(series, threshold)?);
        }
        Ok(scores)
    }

    /// Handle outliers based on the selected strategy.
    pub fn handle_outliers(
        df: DataFrame,
        strategy: OutlierStrategy,
        threshold: f64,
        processing_steps: &mut Vec<String>,
    ) -> Result<(DataFrame, OutlierReport)> {
        let scores = Self::detect(&df, threshold)?;
        let mut report = OutlierReport {
            columns: scores.iter().map(ColumnZScores::summary).collect(),
            ..Default::default()
        };

        if scores.is_empty() {
            debug!("No numeric columns, skipping outlier handling");
            return Ok((df, report));
        }

        let detected = report.total_detected();
        debug!("Detected {} outlier cells (|z| > {})", detected, threshold);

        let mut df = df;
        match strategy {
            OutlierStrategy::Nothing => {
                processing_steps.push(format!(
                    "Detected {} outliers (|z| > {}), no transformation applied",
                    detected, threshold
                ));
            }
            OutlierStrategy::LogTransformation => {
                report.values_changed = Self::log_transform(&mut df, &scores, processing_steps)?;
            }
            OutlierStrategy::Mean => {
                report.values_changed =
                    Self::replace_outliers(&mut df, &scores, "mean", |c| c.mean, processing_steps)?;
            }
            OutlierStrategy::Median => {
                report.values_changed =
                    Self::replace_outliers(&mut df, &scores, "median", |c| c.median, processing_steps)?;
            }
            OutlierStrategy::Drop => {
                let before = df.height();
                df = Self::remove_outliers(&df, &scores)?;
                report.rows_dropped = before - df.height();
                processing_steps.push(format!(
                    "Removed {} rows containing outliers",
                    report.rows_dropped
                ));
                info!("Removed {} outlier rows", report.rows_dropped);
            }
        }

        Ok((df, report))
    }

    /// Replace every positive value `x` of every numeric column with `ln(x + 1)`.
    fn log_transform(
        df: &mut DataFrame,
        scores: &[ColumnZScores],
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let mut changed = 0;
        for col in scores {
            let transformed: Vec<Option<f64>> = col
                .values
                .iter()
                .map(|v| {
                    v.map(|x| {
                        if x > 0.0 {
                            changed += 1;
                            x.ln_1p()
                        } else {
                            x
                        }
                    })
                })
                .collect();
            df.replace(&col.name, Series::new(col.name.as_str().into(), transformed))?;
        }

        processing_steps.push(format!(
            "Applied log transformation to {} numeric columns ({} values)",
            scores.len(),
            changed
        ));
        Ok(changed)
    }

    /// Replace flagged cells with a statistic of the full column.
    fn replace_outliers(
        df: &mut DataFrame,
        scores: &[ColumnZScores],
        method: &str,
        statistic: fn(&ColumnZScores) -> f64,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let mut changed = 0;
        for col in scores {
            let count = col.outlier_count();
            if count == 0 {
                continue;
            }
            let replacement = statistic(col);

            let replaced: Vec<Option<f64>> = col
                .values
                .iter()
                .zip(&col.flags)
                .map(|(v, &flagged)| if flagged { Some(replacement) } else { *v })
                .collect();
            df.replace(&col.name, Series::new(col.name.as_str().into(), replaced))?;

            changed += count;
            processing_steps.push(format!(
                "Replaced {} outliers in '{}' with {}: {:.2}",
                count, col.name, method, replacement
            ));
        }
        Ok(changed)
    }

    /// Drop rows flagged in any numeric column.
    fn remove_outliers(df: &DataFrame, scores: &[ColumnZScores]) -> Result<DataFrame> {
        let keep: Vec<bool> = (0..df.height())
            .map(|row| !scores.iter().any(|col| col.flags[row]))
            .collect();
        Ok(filter_rows(df, &keep)?)
    }
}

/// Detect and treat outliers, returning the new table and what changed.
pub fn handle_outliers(
    df: DataFrame,
    strategy: OutlierStrategy,
    threshold: f64,
) -> Result<(DataFrame, OutlierReport)> {
    OutlierHandler::handle_outliers(df, strategy, threshold, &mut Vec::new())
}
