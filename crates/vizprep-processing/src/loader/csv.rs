//! Delimited text reader with encoding and delimiter detection.

use super::encoding::{decode, detect_encoding};
use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use std::io::Cursor;
use tracing::debug;

/// Delimiters tried by [`detect_delimiter`], in tie-break order.
pub const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Number of leading lines inspected by [`detect_delimiter`].
const SAMPLE_LINES: usize = 10;

const INFER_SCHEMA_ROWS: usize = 1000;

/// Cell texts read as missing, matching the usual spreadsheet and pandas
/// spellings. Empty fields are missing as well.
pub const MISSING_VALUE_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Count `delimiter` bytes outside double-quoted sections of `line`.
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Pick the delimiter that appears most often and most consistently per line.
///
/// Each candidate is scored as `avg / (1 + std_dev)` of its per-line count
/// over the first lines. Quoted text is ignored, and a candidate missing from
/// the header line is never picked. Comma wins when nothing scores.
pub fn detect_delimiter(content: &str) -> u8 {
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SAMPLE_LINES)
        .collect();
    if sample_lines.is_empty() {
        return b',';
    }

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    for &delimiter in &DELIMITER_CANDIDATES {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| count_unquoted(line, delimiter))
            .collect();
        if counts[0] == 0 {
            continue;
        }

        let avg = counts.iter().sum::<usize>() as f32 / counts.len() as f32;
        let variance = counts
            .iter()
            .map(|&x| (x as f32 - avg).powi(2))
            .sum::<f32>()
            / counts.len() as f32;
        let score = avg / (1.0 + variance.sqrt());

        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}

/// Parse a delimited file with a header row.
pub fn read_csv(bytes: &[u8]) -> Result<DataFrame> {
    let detected = detect_encoding(bytes);
    debug!(
        "Detected encoding {} (confidence {:.2})",
        detected.encoding.name(),
        detected.confidence
    );

    let text = decode(bytes, detected.encoding);
    if text.trim().is_empty() {
        return Err(PreprocessingError::load("csv", "file is empty"));
    }

    let delimiter = detect_delimiter(&text);
    debug!("Detected delimiter {:?}", delimiter as char);

    let null_values = MISSING_VALUE_TOKENS
        .iter()
        .map(|token| PlSmallStr::from_str(token))
        .collect();

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(delimiter)
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(NullValues::AllColumns(null_values))),
        )
        .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
        .finish()
        .map_err(|e| PreprocessingError::load("csv", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3\n4,5,6\n"), b',');
    }

    #[test]
    fn test_detect_semicolon_with_decimal_commas() {
        let content = "name;price;qty\napple;1,5;3\npear;2,25;10\n";
        assert_eq!(detect_delimiter(content), b';');
    }

    #[test]
    fn test_detect_tab_and_pipe() {
        assert_eq!(detect_delimiter("a\tb\n1\t2\n"), b'\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3\n"), b'|');
    }

    #[test]
    fn test_detect_defaults_to_comma() {
        assert_eq!(detect_delimiter("single\nvalue\n"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn test_detect_ignores_quoted_delimiters() {
        let content = "note,id\n\"x;y;z\",1\n\"p;q;r\",2\n";
        assert_eq!(detect_delimiter(content), b',');
    }

    #[test]
    fn test_detect_requires_delimiter_in_header() {
        assert_eq!(detect_delimiter("note\nx;y\np;q\n"), b',');
    }

    #[test]
    fn test_read_single_column_with_separators_in_values() {
        let df = read_csv(b"note\n\"x;y\"\n\"p;q\"\n").unwrap();
        assert_eq!(df.shape(), (2, 1));
        let note = df.column("note").unwrap().as_materialized_series();
        assert_eq!(note.str().unwrap().get(0), Some("x;y"));
    }

    #[test]
    fn test_missing_value_tokens_become_null() {
        let df = read_csv(b"a,b\n1,x\nNA,y\n3,N/A\nNaN,null\n").unwrap();

        let a = df.column("a").unwrap();
        assert_eq!(a.dtype(), &DataType::Int64);
        assert_eq!(a.null_count(), 2);
        assert_eq!(df.column("b").unwrap().null_count(), 2);
    }

    #[test]
    fn test_nan_in_float_column_is_null() {
        let df = read_csv(b"a\n1.5\nNaN\n3.5\n").unwrap();
        let a = df.column("a").unwrap();
        assert_eq!(a.dtype(), &DataType::Float64);
        assert_eq!(a.null_count(), 1);
    }

    #[test]
    fn test_read_semicolon_csv() {
        let df = read_csv(b"a;b\n1;x\n2;y\n").unwrap();
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_read_latin1_csv() {
        let bytes = [
            b'v', b'i', b'l', b'l', b'e', b',', b'n', b'\n', b'N', b'\xEE', b'm', b'e', b's',
            b',', b'1', b'\n',
        ];
        let df = read_csv(&bytes).unwrap();
        let ville = df.column("ville").unwrap().as_materialized_series();
        assert_eq!(ville.str().unwrap().get(0), Some("Nîmes"));
    }

    #[test]
    fn test_read_empty_fails() {
        let err = read_csv(b"  \n").unwrap_err();
        assert_eq!(err.error_code(), "LOAD_ERROR");
    }

    #[test]
    fn test_missing_cells_become_null() {
        let df = read_csv(b"a,b\n1,\n,2\n").unwrap();
        assert_eq!(df.column("a").unwrap().null_count(), 1);
        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }
}
