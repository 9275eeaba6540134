//! Shared utilities for the loader and the cleaning handlers.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use crate::types::ColumnKind;
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Classify a DataType for cleaning purposes.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else if matches!(
        dtype,
        DataType::String | DataType::Boolean | DataType::Categorical(_, _)
    ) {
        ColumnKind::Categorical
    } else {
        ColumnKind::Other
    }
}

/// Names of all numeric columns, in table order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Total number of null cells in the table.
pub fn total_null_count(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|col| col.null_count()).sum()
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Read a numeric Series as `f64` values. Nulls and NaN both become `None`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Most frequent value of a Series as a single-row Series of the same dtype.
///
/// Ties resolve to the smallest value in sort order. Returns `None` when the
/// Series has no values.
pub fn mode_value(series: &Series) -> PolarsResult<Option<Series>> {
    let sorted = series.drop_nulls().sort(SortOptions::default())?;
    if sorted.is_empty() {
        return Ok(None);
    }

    let mut best_start = 0usize;
    let mut best_count = 0usize;
    let mut run_start = 0usize;
    for i in 1..=sorted.len() {
        if i == sorted.len() || sorted.get(i)? != sorted.get(run_start)? {
            let run_len = i - run_start;
            if run_len > best_count {
                best_count = run_len;
                best_start = run_start;
            }
            run_start = i;
        }
    }
    Ok(Some(sorted.slice(best_start as i64, 1)))
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let float_series = series.cast(&DataType::Float64)?;
    let filled = float_series.f64()?.fill_null_with_values(fill_value)?;
    Ok(filled.into_series().with_name(series.name().clone()))
}

/// Fill null values with the single value held by `value`, keeping the dtype.
pub fn fill_nulls_with(series: &Series, value: &Series) -> PolarsResult<Series> {
    let fill = value.cast(series.dtype())?.new_from_index(0, series.len());
    Ok(series
        .zip_with(&series.is_not_null(), &fill)?
        .with_name(series.name().clone()))
}

/// Turn float NaN cells into nulls so they count as missing.
pub fn nan_as_null(series: &Series) -> PolarsResult<Series> {
    let cleared = match series.dtype() {
        DataType::Float64 => {
            let ca = series.f64()?;
            ca.set(&ca.is_nan(), None)?.into_series()
        }
        DataType::Float32 => {
            let ca = series.f32()?;
            ca.set(&ca.is_nan(), None)?.into_series()
        }
        _ => return Ok(series.clone()),
    };
    Ok(cleared.with_name(series.name().clone()))
}

/// Apply [`nan_as_null`] to every float column of the table.
pub fn frame_nan_as_null(df: DataFrame) -> PolarsResult<DataFrame> {
    let float_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| col.dtype().is_float())
        .map(|col| col.name().to_string())
        .collect();

    let mut df = df;
    for name in float_columns {
        let series = df.column(&name)?.as_materialized_series().clone();
        if series.is_nan()?.any() {
            df.replace(&name, nan_as_null(&series)?)?;
        }
    }
    Ok(df)
}

// =============================================================================
// Row Utilities
// =============================================================================

/// Keep only the rows whose mask entry is `true`.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> PolarsResult<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), keep);
    df.filter(&mask)
}

/// Keep the first occurrence of every fully identical row, in table order.
pub fn unique_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.unique_stable(None, UniqueKeepStrategy::First, None)
}

/// Number of rows equal to an earlier row.
pub fn duplicate_count(df: &DataFrame) -> PolarsResult<usize> {
    Ok(df.height() - unique_rows(df)?.height())
}

/// Mark rows with at least one null cell.
pub fn null_row_mask(df: &DataFrame) -> Vec<bool> {
    let mut has_null = vec![false; df.height()];
    for col in df.get_columns() {
        if col.null_count() == 0 {
            continue;
        }
        let nulls = col.as_materialized_series().is_null();
        for (row, is_null) in nulls.into_iter().enumerate() {
            if is_null.unwrap_or(false) {
                has_null[row] = true;
            }
        }
    }
    has_null
}

// =============================================================================
// Tests
// =============================================================================
