//! CSV export of cleaned tables.
//!
//! Output is always UTF-8 with a header row and comma separators, so it can
//! be loaded again with [`load_dataset`](crate::loader::load_dataset).

use crate::error::Result;
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write `df` as CSV to `writer`.
pub fn write_csv<W: Write>(df: &mut DataFrame, writer: W) -> Result<()> {
    let mut writer = writer;
    CsvWriter::new(&mut writer)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)?;
    Ok(())
}

/// Render `df` as CSV bytes.
pub fn to_csv_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut df = df.clone();
    write_csv(&mut df, &mut buffer)?;
    Ok(buffer)
}

/// Write `df` as CSV to the file at `path`, creating parent directories.
pub fn save_csv(df: &DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    let mut df = df.clone();
    write_csv(&mut df, &mut file)?;
    info!("Cleaned dataset saved: {}", path.display());
    Ok(())
}
