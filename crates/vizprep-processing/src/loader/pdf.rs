//! PDF reader.
//!
//! Text is extracted page by page with `lopdf`. Pages whose lines line up
//! into a grid are read as a table; when no page does, every text line is
//! split on whitespace instead.

use super::{CellValue, frame_from_rows, is_missing_token, unique_headers};
use crate::error::{PreprocessingError, Result};
use lopdf::Document;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

/// Cell separator inside a table row: a tab or a run of two or more spaces.
static CELL_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\t+|\s{2,}").expect("Invalid regex pattern for CELL_SEPARATOR")
});

/// Read a PDF's text into a table.
pub(crate) fn read_pdf(bytes: &[u8]) -> Result<DataFrame> {
    let document = Document::load_mem(bytes).map_err(|e| PreprocessingError::load("pdf", e))?;

    let mut pages = Vec::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => pages.push(text),
            Err(e) => warn!("Skipping page {}: {}", page_number, e),
        }
    }
    debug!("Extracted text from {} pages", pages.len());

    frame_from_pages(&pages)
}

/// Build a table from the text of each page.
pub fn frame_from_pages(pages: &[String]) -> Result<DataFrame> {
    if pages.iter().all(|p| p.trim().is_empty()) {
        return Err(PreprocessingError::load("pdf", "no extractable text"));
    }

    let (headers, rows) = match tables_from_pages(pages) {
        Some(table) => {
            debug!("Found a table grid with {} columns", table.0.len());
            table
        }
        None => {
            debug!("No table grid found, splitting lines on whitespace");
            split_lines(pages)
        }
    };

    let cells: Vec<Vec<CellValue>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| parse_cell(cell)).collect())
        .collect();
    frame_from_rows(&headers, &cells).map_err(|e| PreprocessingError::load("pdf", e))
}

/// Split a line into table cells.
pub fn split_cells(line: &str) -> Vec<String> {
    CELL_SEPARATOR
        .split(line.trim())
        .map(|cell| cell.trim().to_string())
        .collect()
}

/// Rows of the grid on a page, if any.
///
/// The grid width is the most common cell count, provided that count is at
/// least 2 and at least two lines share it. The grid starts at the first
/// line of that width. Later lines with fewer cells are padded with empty
/// cells; lines with more cells are skipped with a warning. Single-cell
/// lines are prose and are left out.
pub fn detect_grid(page: &str) -> Option<Vec<Vec<String>>> {
    let rows: Vec<Vec<String>> = page
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(split_cells)
        .collect();

    let mut best: Option<(usize, usize)> = None;
    for width in rows.iter().map(Vec::len).filter(|&w| w >= 2) {
        let count = rows.iter().filter(|r| r.len() == width).count();
        let better = match best {
            None => true,
            Some((best_width, best_count)) => {
                count > best_count || (count == best_count && width > best_width)
            }
        };
        if better {
            best = Some((width, count));
        }
    }

    let (width, count) = best?;
    if count < 2 {
        return None;
    }

    let start = rows.iter().position(|r| r.len() == width)?;
    let mut grid = Vec::with_capacity(rows.len() - start);
    for mut row in rows.into_iter().skip(start) {
        match row.len() {
            0 | 1 => continue,
            n if n > width => {
                warn!("Skipping a table row with {} cells, expected {}", n, width);
            }
            _ => {
                row.resize(width, String::new());
                grid.push(row);
            }
        }
    }
    Some(grid)
}

/// Concatenate the page grids into one table.
///
/// The first grid row is the header. Later grids must have the same width;
/// their rows equal to the header are repeated headers and are skipped.
fn tables_from_pages(pages: &[String]) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let mut grids = pages.iter().filter_map(|page| detect_grid(page));
    let mut first = grids.next()?.into_iter();
    let header = first.next()?;
    let mut rows: Vec<Vec<String>> = first.collect();

    for grid in grids {
        if grid.first().map(Vec::len) != Some(header.len()) {
            warn!("Skipping a page table with a different column count");
            continue;
        }
        rows.extend(grid.into_iter().filter(|row| *row != header));
    }

    Some((unique_headers(header), rows))
}

/// Split every non-empty line on whitespace. Columns are named `0..n`.
fn split_lines(pages: &[String]) -> (Vec<String>, Vec<Vec<String>>) {
    let rows: Vec<Vec<String>> = pages
        .iter()
        .flat_map(|page| page.lines())
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let headers = (0..width).map(|i| i.to_string()).collect();
    (headers, rows)
}

fn parse_cell(cell: &str) -> CellValue {
    let trimmed = cell.trim();
    if is_missing_token(trimmed) {
        CellValue::Null
    } else if let Ok(i) = trimmed.parse::<i64>() {
        CellValue::Int(i)
    } else if let Ok(f) = trimmed.parse::<f64>() {
        CellValue::Float(f)
    } else {
        CellValue::Text(trimmed.to_string())
    }
}
