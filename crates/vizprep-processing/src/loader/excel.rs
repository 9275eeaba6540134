//! Spreadsheet reader (XLS, XLSX, XLSM, XLSB, ODS) backed by calamine.

use super::{CellValue, frame_from_rows, is_missing_token, unique_headers};
use crate::error::{PreprocessingError, Result};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use polars::prelude::*;
use std::io::Cursor;
use tracing::debug;

/// Read the first worksheet. The first row holds the column names.
pub(crate) fn read_spreadsheet(bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| PreprocessingError::load("spreadsheet", e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PreprocessingError::load("spreadsheet", "workbook has no worksheet"))?
        .map_err(|e| PreprocessingError::load("spreadsheet", e))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(PreprocessingError::load("spreadsheet", "first worksheet is empty"));
    };

    let headers = unique_headers(header_row.iter().map(header_text).collect());
    let data: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(cell_value).collect())
        .filter(|row: &Vec<CellValue>| row.iter().any(|c| *c != CellValue::Null))
        .collect();

    debug!("Worksheet has {} columns and {} data rows", headers.len(), data.len());

    frame_from_rows(&headers, &data).map_err(|e| PreprocessingError::load("spreadsheet", e))
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if is_missing_token(s) => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}
