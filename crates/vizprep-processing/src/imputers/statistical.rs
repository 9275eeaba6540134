//! Statistical imputation methods.
//!
//! Provides mean, median and mode fills for a single column. Every method
//! returns the number of cells it filled. A column with no values at all has
//! no statistic: it is left untouched and [`PreprocessingError::EmptyColumn`]
//! is returned. Float NaN cells count as missing.

use crate::error::{PreprocessingError, Result};
use crate::utils::{fill_nulls_with, fill_numeric_nulls, mode_value, nan_as_null};
use polars::prelude::*;
use tracing::debug;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Apply median imputation for numeric columns.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        Self::fill_numeric_with(df, col_name, processing_steps, "median", |s| s.median())
    }

    /// Apply mean imputation for numeric columns.
    pub fn apply_numeric_mean(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        Self::fill_numeric_with(df, col_name, processing_steps, "mean", |s| s.mean())
    }

    /// Apply mode imputation. The column keeps its dtype.
    pub fn apply_mode_imputation(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let series = column_series(df, col_name)?;
        let missing = series.null_count();

        let Some(mode) = mode_value(&series)? else {
            debug!("No mode for '{}': column is empty", col_name);
            return Err(PreprocessingError::EmptyColumn(col_name.to_string()));
        };

        let filled = fill_nulls_with(&series, &mode)?;
        df.replace(col_name, filled)?;

        processing_steps.push(format!(
            "Filled {} missing values in '{}' with mode: '{}'",
            missing,
            col_name,
            mode.str_value(0)?
        ));

        Ok(missing)
    }

    fn fill_numeric_with(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
        method: &str,
        statistic: fn(&Series) -> Option<f64>,
    ) -> Result<usize> {
        let series = column_series(df, col_name)?;
        let missing = series.null_count();

        let Some(fill_value) = statistic(&series) else {
            debug!("No {} for '{}': column is empty", method, col_name);
            return Err(PreprocessingError::EmptyColumn(col_name.to_string()));
        };

        let filled = fill_numeric_nulls(&series, fill_value)?;
        df.replace(col_name, filled)?;

        processing_steps.push(format!(
            "Filled {} missing values in '{}' with {}: {:.2}",
            missing, col_name, method, fill_value
        ));

        Ok(missing)
    }
}

fn column_series(df: &DataFrame, col_name: &str) -> Result<Series> {
    let column = df
        .column(col_name)
        .map_err(|_| PreprocessingError::ColumnNotFound(col_name.to_string()))?;
    Ok(nan_as_null(column.as_materialized_series())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_numeric_median_basic() {
        let mut df = df![
            "values" => [Some(1.0), None, Some(3.0), None, Some(5.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let filled = StatisticalImputer::apply_numeric_median(&mut df, "values", &mut steps).unwrap();
        assert_eq!(filled, 2);

        let values = df.column("values").unwrap();
        assert_eq!(values.null_count(), 0);

        // Median of [1, 3, 5] = 3
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert_eq!(values.get(3).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert!(steps[0].contains("median"));
    }

    #[test]
    fn test_apply_numeric_mean_preserves_original_values() {
        let mut df = df![
            "values" => [Some(10.0), None, Some(20.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        StatisticalImputer::apply_numeric_mean(&mut df, "values", &mut steps).unwrap();

        let values = df.column("values").unwrap();
        assert_eq!(values.get(0).unwrap().try_extract::<f64>().unwrap(), 10.0);
        assert_eq!(values.get(2).unwrap().try_extract::<f64>().unwrap(), 20.0);
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 15.0);
        assert!(steps[0].contains("15.00"));
    }

    #[test]
    fn test_apply_numeric_mean_on_integer_column() {
        let mut df = df![
            "values" => [Some(1i64), None, Some(4i64)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        StatisticalImputer::apply_numeric_mean(&mut df, "values", &mut steps).unwrap();

        let values = df.column("values").unwrap();
        assert!(matches!(values.dtype(), DataType::Float64));
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 2.5);
    }

    #[test]
    fn test_apply_numeric_median_all_nulls() {
        let mut df = df![
            "values" => [Option::<f64>::None, None, None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let err = StatisticalImputer::apply_numeric_median(&mut df, "values", &mut steps).unwrap_err();

        assert!(matches!(err, PreprocessingError::EmptyColumn(ref name) if name == "values"));
        assert!(steps.is_empty());
        assert_eq!(df.column("values").unwrap().null_count(), 3);
    }

    #[test]
    fn test_apply_mode_imputation_on_numeric_keeps_dtype() {
        let mut df = df![
            "values" => [Some(2i64), Some(7), Some(7), None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        StatisticalImputer::apply_mode_imputation(&mut df, "values", &mut steps).unwrap();

        let values = df.column("values").unwrap();
        assert_eq!(values.dtype(), &DataType::Int64);
        assert_eq!(values.get(3).unwrap().try_extract::<i64>().unwrap(), 7);
    }

    #[test]
    fn test_apply_mode_imputation_on_boolean_keeps_dtype() {
        let mut df = df![
            "flag" => [Some(true), None, Some(true), Some(false)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let filled = StatisticalImputer::apply_mode_imputation(&mut df, "flag", &mut steps).unwrap();

        let flag = df.column("flag").unwrap();
        assert_eq!(filled, 1);
        assert_eq!(flag.dtype(), &DataType::Boolean);
        assert_eq!(flag.bool().unwrap().get(1), Some(true));
        assert!(steps[0].contains("'true'"));
    }

    #[test]
    fn test_apply_numeric_mean_fills_nan() {
        let mut df = df![
            "values" => [1.0, f64::NAN, 3.0],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let filled = StatisticalImputer::apply_numeric_mean(&mut df, "values", &mut steps).unwrap();

        assert_eq!(filled, 1);
        let values = df.column("values").unwrap();
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 2.0);
    }

    #[test]
    fn test_apply_mode_imputation_basic() {
        let mut df = df![
            "category" => [Some("A"), Some("B"), Some("A"), None, Some("A")],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let filled = StatisticalImputer::apply_mode_imputation(&mut df, "category", &mut steps).unwrap();
        assert_eq!(filled, 1);

        let category = df.column("category").unwrap().as_materialized_series();
        assert_eq!(category.null_count(), 0);
        assert_eq!(category.str().unwrap().get(3), Some("A"));
        assert!(steps[0].contains("mode"));
    }

    #[test]
    fn test_apply_mode_imputation_missing_column() {
        let mut df = df![
            "other" => [1.0, 2.0, 3.0],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let err = StatisticalImputer::apply_mode_imputation(&mut df, "category", &mut steps).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}
