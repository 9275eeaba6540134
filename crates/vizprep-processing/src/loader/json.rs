//! JSON reader for record arrays and column-oriented objects.

use super::{CellValue, column_from_cells};
use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use serde_json::{Map, Value};

/// Parse either `[{"col": v, ...}, ...]` or `{"col": {"0": v, ...}}` /
/// `{"col": [v, ...]}`.
pub(crate) fn read_json(bytes: &[u8]) -> Result<DataFrame> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| PreprocessingError::load("json", e))?;

    let (names, columns) = match value {
        Value::Array(records) => from_records(&records)?,
        Value::Object(map) => from_columns(&map)?,
        _ => {
            return Err(PreprocessingError::load(
                "json",
                "expected an array of records or an object of columns",
            ));
        }
    };

    let columns: Vec<Column> = names
        .iter()
        .zip(&columns)
        .map(|(name, cells)| column_from_cells(name, cells))
        .collect();
    DataFrame::new(columns).map_err(|e| PreprocessingError::load("json", e))
}

type ColumnCells = (Vec<String>, Vec<Vec<CellValue>>);

fn from_records(records: &[Value]) -> Result<ColumnCells> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        let Value::Object(fields) = record else {
            return Err(PreprocessingError::load("json", "array items must be objects"));
        };
        for key in fields.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .iter()
        .map(|name| {
            records
                .iter()
                .map(|record| record.get(name).map(cell_value).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok((names, columns))
}

fn from_columns(map: &Map<String, Value>) -> Result<ColumnCells> {
    // Row labels in first-seen order; each column is matched on them.
    let mut row_keys: Vec<String> = Vec::new();
    for column in map.values() {
        match column {
            Value::Object(cells) => {
                for key in cells.keys() {
                    if !row_keys.contains(key) {
                        row_keys.push(key.clone());
                    }
                }
            }
            Value::Array(cells) => {
                for idx in row_keys.len()..cells.len() {
                    row_keys.push(idx.to_string());
                }
            }
            _ => {
                return Err(PreprocessingError::load(
                    "json",
                    "column values must be objects or arrays",
                ));
            }
        }
    }

    let names: Vec<String> = map.keys().cloned().collect();
    let columns = map
        .values()
        .map(|column| {
            row_keys
                .iter()
                .enumerate()
                .map(|(idx, key)| {
                    let cell = match column {
                        Value::Object(cells) => cells.get(key),
                        Value::Array(cells) => cells.get(idx),
                        _ => None,
                    };
                    cell.map(cell_value).unwrap_or(CellValue::Null)
                })
                .collect()
        })
        .collect();

    Ok((names, columns))
}

fn cell_value(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Bool(b) => CellValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => CellValue::Int(i),
            None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null),
        },
        Value::String(s) => CellValue::Text(s.clone()),
        nested => CellValue::Text(nested.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_records() {
        let json = br#"[{"a": 1, "b": "x"}, {"a": null, "b": "x"}, {"a": 3, "b": "y"}]"#;
        let df = read_json(json).unwrap();

        assert_eq!(df.shape(), (3, 2));
        assert_eq!(column_names(&df), vec!["a", "b"]);
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("a").unwrap().null_count(), 1);
    }

    #[test]
    fn test_records_with_missing_keys() {
        let json = br#"[{"a": 1.5}, {"b": true}]"#;
        let df = read_json(json).unwrap();

        assert_eq!(column_names(&df), vec!["a", "b"]);
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("b").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column("a").unwrap().null_count(), 1);
        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn test_column_objects() {
        let json = br#"{"city": {"0": "Lyon", "1": "Nice"}, "pop": {"0": 513, "1": 342}}"#;
        let df = read_json(json).unwrap();

        assert_eq!(df.shape(), (2, 2));
        assert_eq!(column_names(&df), vec!["city", "pop"]);
        let city = df.column("city").unwrap().as_materialized_series();
        assert_eq!(city.str().unwrap().get(1), Some("Nice"));
    }

    #[test]
    fn test_columns_keep_document_order() {
        let json = br#"{"zeta": [1], "alpha": [2]}"#;
        let df = read_json(json).unwrap();
        assert_eq!(column_names(&df), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_column_arrays_of_uneven_length() {
        let json = br#"{"x": [1, 2, 3], "y": ["a"]}"#;
        let df = read_json(json).unwrap();

        assert_eq!(df.shape(), (3, 2));
        assert_eq!(df.column("y").unwrap().null_count(), 2);
    }

    #[test]
    fn test_scalar_is_rejected() {
        assert_eq!(read_json(b"42").unwrap_err().error_code(), "LOAD_ERROR");
        assert_eq!(read_json(b"{not json").unwrap_err().error_code(), "LOAD_ERROR");
        assert_eq!(read_json(b"[1, 2]").unwrap_err().error_code(), "LOAD_ERROR");
    }
}
