//! Dataset loading.
//!
//! [`load_dataset`] picks a reader from the file extension and turns the raw
//! bytes into a [`DataFrame`]. Supported formats are CSV, spreadsheets
//! (XLS/XLSX and friends), JSON and PDF.
//!
//! # Example
//!
//! ```rust,ignore
//! use vizprep_processing::loader::load_dataset_from_path;
//!
//! let df = load_dataset_from_path("sales.xlsx")?;
//! println!("{} rows", df.height());
//! ```

pub mod csv;
pub mod encoding;
mod excel;
mod json;
pub mod pdf;

use crate::error::{PreprocessingError, Result};
use crate::utils::frame_nan_as_null;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Input formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
    Json,
    Pdf,
}

impl FileFormat {
    /// Pick a format from the extension of `filename`, ignoring case.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            "json" => Ok(Self::Json),
            "pdf" => Ok(Self::Pdf),
            "" => Err(PreprocessingError::UnsupportedFormat(filename.to_string())),
            other => Err(PreprocessingError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Spreadsheet => "spreadsheet",
            Self::Json => "json",
            Self::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse `bytes` as a table, choosing the reader from `filename`'s extension.
pub fn load_dataset(bytes: &[u8], filename: &str) -> Result<DataFrame> {
    let format = FileFormat::from_filename(filename)?;
    info!("Loading '{}' as {} ({} bytes)", filename, format, bytes.len());

    let df = match format {
        FileFormat::Csv => csv::read_csv(bytes),
        FileFormat::Spreadsheet => excel::read_spreadsheet(bytes),
        FileFormat::Json => json::read_json(bytes),
        FileFormat::Pdf => pdf::read_pdf(bytes),
    }?;
    let df = frame_nan_as_null(df)?;

    info!("Loaded {} rows x {} columns", df.height(), df.width());
    Ok(df)
}

/// Read the file at `path` and parse it with [`load_dataset`].
pub fn load_dataset_from_path(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    // Reject unknown extensions before touching the file system.
    FileFormat::from_filename(&path.to_string_lossy())?;
    let bytes = std::fs::read(path)?;
    load_dataset(&bytes, &path.to_string_lossy())
}

/// Whether a text cell spells a missing value (blank or one of
/// [`csv::MISSING_VALUE_TOKENS`]).
pub(crate) fn is_missing_token(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || csv::MISSING_VALUE_TOKENS.contains(&trimmed)
}

/// A single parsed cell from a spreadsheet, JSON document or PDF grid.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    fn render(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

/// Build a typed column from cells.
///
/// The column is `i64` when every present cell is an integer, `f64` when every
/// present cell is a number, boolean when every present cell is a boolean and
/// text otherwise. A column without any present cell is text.
pub(crate) fn column_from_cells(name: &str, cells: &[CellValue]) -> Column {
    let present: Vec<&CellValue> = cells.iter().filter(|c| **c != CellValue::Null).collect();

    if !present.is_empty() && present.iter().all(|c| matches!(c, CellValue::Int(_))) {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                CellValue::Int(i) => Some(*i),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), values);
    }

    if !present.is_empty()
        && present
            .iter()
            .all(|c| matches!(c, CellValue::Int(_) | CellValue::Float(_)))
    {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                CellValue::Int(i) => Some(*i as f64),
                CellValue::Float(f) => Some(*f),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), values);
    }

    if !present.is_empty() && present.iter().all(|c| matches!(c, CellValue::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                CellValue::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), values);
    }

    let values: Vec<Option<String>> = cells.iter().map(CellValue::render).collect();
    Column::new(name.into(), values)
}

/// Make header names usable as column names.
///
/// Blank names become `column_<n>` (1-based position); repeated names get a
/// `_<k>` suffix so every name is unique.
pub(crate) fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut headers = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let trimmed = name.trim();
        let base = if trimmed.is_empty() {
            format!("column_{}", idx + 1)
        } else {
            trimmed.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

/// Assemble a table from a header row and data rows of cells.
///
/// Short rows are padded with nulls; cells beyond the header width are ignored.
pub(crate) fn frame_from_rows(headers: &[String], rows: &[Vec<CellValue>]) -> PolarsResult<DataFrame> {
    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<CellValue> = rows
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or(CellValue::Null))
                .collect();
            column_from_cells(name, &cells)
        })
        .collect();
    DataFrame::new(columns)
}
