//! Explicit per-user session state.
//!
//! A [`Session`] owns the table a user loaded, the result of the last
//! cleaning run and its report. Cleaning always starts from the loaded
//! table, so running it again with another configuration is reproducible.

use crate::config::CleaningConfig;
use crate::error::Result;
use crate::export::to_csv_bytes;
use crate::loader::{load_dataset, load_dataset_from_path};
use crate::pipeline::CleaningPipeline;
use crate::profiler::DataProfiler;
use crate::types::{CleaningReport, DatasetSummary};
use polars::prelude::*;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{info, warn};

/// Loaded dataset plus the outcome of the most recent cleaning run.
#[derive(Debug, Clone)]
pub struct Session {
    source_name: String,
    original: DataFrame,
    cleaned: Option<DataFrame>,
    report: Option<CleaningReport>,
}

static_assertions::assert_impl_all!(Session: Send);

impl Session {
    /// Start a session from an already loaded table.
    pub fn new(source_name: impl Into<String>, df: DataFrame) -> Self {
        Self {
            source_name: source_name.into(),
            original: df,
            cleaned: None,
            report: None,
        }
    }

    /// Load `bytes`, choosing the reader from `filename`.
    pub fn from_bytes(bytes: &[u8], filename: &str) -> Result<Self> {
        let df = load_dataset(bytes, filename)?;
        Ok(Self::new(filename, df))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let df = load_dataset_from_path(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, df))
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Summary of the loaded table.
    pub fn summary(&self) -> Result<DatasetSummary> {
        DataProfiler::summarize(&self.original)
    }

    pub fn original(&self) -> &DataFrame {
        &self.original
    }

    pub fn cleaned(&self) -> Option<&DataFrame> {
        self.cleaned.as_ref()
    }

    pub fn report(&self) -> Option<&CleaningReport> {
        self.report.as_ref()
    }

    /// The cleaned table when one exists, otherwise the loaded one.
    pub fn current(&self) -> &DataFrame {
        self.cleaned.as_ref().unwrap_or(&self.original)
    }

    /// Run the cleaning pipeline on a copy of the loaded table.
    ///
    /// On failure the previous cleaned table and report are kept.
    pub fn clean(&mut self, config: CleaningConfig) -> Result<&CleaningReport> {
        let pipeline = CleaningPipeline::builder().config(config).build()?;
        let outcome = match pipeline.run(self.original.clone()) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Cleaning '{}' failed, keeping previous state: {}", self.source_name, e);
                return Err(e);
            }
        };

        info!(
            "Cleaned '{}': {} -> {} rows",
            self.source_name, outcome.report.rows_before, outcome.report.rows_after
        );
        self.cleaned = Some(outcome.data);
        Ok(&*self.report.insert(outcome.report))
    }

    /// CSV bytes of [`current`](Self::current).
    pub fn export_csv(&self) -> Result<Vec<u8>> {
        to_csv_bytes(self.current())
    }

    /// Plain-text description of the current table's columns, given to the
    /// chart advisor as dataset context.
    pub fn advisor_context(&self) -> String {
        let df = self.current();
        let mut context = format!(
            "Dataset '{}' with {} rows and {} columns:\n",
            self.source_name,
            df.height(),
            df.width()
        );
        for col in df.get_columns() {
            // Writing to a String cannot fail.
            let _ = writeln!(context, "- {} ({})", col.name(), col.dtype());
        }
        context
    }
}
