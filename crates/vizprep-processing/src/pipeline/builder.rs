//! Cleaning pipeline and builder.
//!
//! [`CleaningPipeline`] runs the three handlers in a fixed order
//! (missing values, duplicates, outliers) and assembles a
//! [`CleaningReport`] describing what each stage did.

use crate::cleaner::DuplicateHandler;
use crate::config::CleaningConfig;
use crate::error::{Result, ResultExt};
use crate::imputers::MissingValueHandler;
use crate::pipeline::OutlierHandler;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::types::CleaningReport;
use chrono::Utc;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Cleaned table plus the report of the run that produced it.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub data: DataFrame,
    pub report: CleaningReport,
}

/// Runs the cleaning stages over a table.
///
/// Use [`CleaningPipeline::builder()`] to create a pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use vizprep_processing::{CleaningConfig, CleaningPipeline, MissingStrategy};
///
/// let outcome = CleaningPipeline::builder()
///     .config(CleaningConfig::builder().missing_strategy(MissingStrategy::Median).build()?)
///     .on_progress(|update| println!("[{:.0}%] {}", update.progress * 100.0, update.message))
///     .build()?
///     .run(df)?;
/// println!("{} rows removed", outcome.report.rows_removed());
/// ```
pub struct CleaningPipeline {
    config: CleaningConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(CleaningPipeline: Send);

impl CleaningPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> CleaningPipelineBuilder {
        CleaningPipelineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean `df` and return the new table with its report.
    ///
    /// The input is consumed. A failing stage aborts the run; no partial
    /// result is returned.
    pub fn run(&self, df: DataFrame) -> Result<CleaningOutcome> {
        match self.run_internal(df) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Cleaning completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Cleaning pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self, df: DataFrame) -> Result<CleaningOutcome> {
        let start_time = Instant::now();
        let config = &self.config;

        info!(
            "Starting cleaning pipeline (missing={}, duplicates={}, outliers={}, threshold={})",
            config.missing_strategy,
            config.duplicate_mode,
            config.outlier_strategy,
            config.outlier_threshold
        );
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Initializing,
            0.0,
            "Starting cleaning pipeline...",
        ));
        config.validate()?;

        let rows_before = df.height();
        let mut processing_steps: Vec<String> = Vec::new();

        // Step 1: Missing values
        self.report_progress(ProgressUpdate::new(
            PipelineStage::MissingValues,
            0.0,
            format!("Handling missing values ({})...", config.missing_strategy),
        ));
        let (df, missing) =
            MissingValueHandler::handle(df, config.missing_strategy, &mut processing_steps)
                .context("missing value handling")?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::MissingValues,
            1.0,
            format!(
                "Filled {} values, dropped {} rows",
                missing.values_filled, missing.rows_dropped
            ),
        ));

        // Step 2: Duplicates
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Duplicates,
            0.0,
            "Checking for duplicate rows...",
        ));
        let (df, duplicates_removed) =
            DuplicateHandler::handle(df, config.duplicate_mode, &mut processing_steps)
                .context("duplicate handling")?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Duplicates,
            1.0,
            format!("Removed {} duplicate rows", duplicates_removed),
        ));

        // Step 3: Outliers
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Outliers,
            0.0,
            format!("Handling outliers ({})...", config.outlier_strategy),
        ));
        let (df, outliers) = OutlierHandler::handle_outliers(
            df,
            config.outlier_strategy,
            config.outlier_threshold,
            &mut processing_steps,
        )
        .context("outlier handling")?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Outliers,
            1.0,
            format!("Detected {} outliers", outliers.total_detected()),
        ));

        let report = CleaningReport {
            generated_at: Utc::now(),
            missing_strategy: config.missing_strategy,
            duplicate_mode: config.duplicate_mode,
            outlier_strategy: config.outlier_strategy,
            outlier_threshold: config.outlier_threshold,
            rows_before,
            rows_after: df.height(),
            missing,
            duplicates_removed,
            outliers,
            processing_steps,
        };

        info!(
            "Cleaning finished in {:.2?}: {} -> {} rows",
            start_time.elapsed(),
            report.rows_before,
            report.rows_after
        );

        Ok(CleaningOutcome { data: df, report })
    }
}

/// Builder for creating a [`CleaningPipeline`] instance.
#[derive(Default)]
pub struct CleaningPipelineBuilder {
    config: Option<CleaningConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(CleaningPipelineBuilder: Send);

impl CleaningPipelineBuilder {
    /// Set the cleaning configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<CleaningPipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(CleaningPipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DuplicateMode, MissingStrategy, OutlierStrategy};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn messy_df() -> DataFrame {
        df![
            "a" => [Some(1.0), None, Some(3.0), Some(3.0)],
            "b" => [Some("x"), Some("x"), Some("y"), Some("y")],
        ]
        .unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = CleaningPipeline::builder().build().unwrap();
        assert_eq!(pipeline.config(), &CleaningConfig::default());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = CleaningConfig {
            outlier_threshold: -1.0,
            ..Default::default()
        };
        assert!(CleaningPipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_run_applies_stages_in_order() {
        let outcome = CleaningPipeline::builder().build().unwrap().run(messy_df()).unwrap();

        // Mean fill gives a[1] = 2.33.., then rows 2 and 3 are duplicates.
        assert_eq!(outcome.data.height(), 3);
        assert_eq!(outcome.report.rows_before, 4);
        assert_eq!(outcome.report.rows_after, 3);
        assert_eq!(outcome.report.missing.values_filled, 1);
        assert_eq!(outcome.report.duplicates_removed, 1);
        assert_eq!(outcome.report.rows_removed(), 1);
        assert!(!outcome.report.processing_steps.is_empty());
    }

    #[test]
    fn test_missing_drop_runs_before_duplicates() {
        let df = df![
            "a" => [Some(1.0), None, Some(1.0)],
            "b" => ["x", "x", "x"],
        ]
        .unwrap();
        let config = CleaningConfig::builder()
            .missing_strategy(MissingStrategy::Drop)
            .duplicate_mode(DuplicateMode::Remove)
            .outlier_strategy(OutlierStrategy::Nothing)
            .build()
            .unwrap();

        let outcome = CleaningPipeline::builder().config(config).build().unwrap().run(df).unwrap();

        assert_eq!(outcome.report.missing.rows_dropped, 1);
        assert_eq!(outcome.report.duplicates_removed, 1);
        assert_eq!(outcome.data.height(), 1);
    }

    #[test]
    fn test_report_records_config() {
        let config = CleaningConfig::builder()
            .outlier_strategy(OutlierStrategy::Median)
            .outlier_threshold(2.0)
            .build()
            .unwrap();
        let outcome = CleaningPipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .run(messy_df())
            .unwrap();

        assert_eq!(outcome.report.outlier_strategy, OutlierStrategy::Median);
        assert_eq!(outcome.report.outlier_threshold, 2.0);
    }

    #[test]
    fn test_progress_callback_sees_every_stage() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = stages.clone();

        CleaningPipeline::builder()
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap()
            .run(messy_df())
            .unwrap();

        let stages = stages.lock().unwrap();
        assert_eq!(stages.first(), Some(&PipelineStage::Initializing));
        assert!(stages.contains(&PipelineStage::MissingValues));
        assert!(stages.contains(&PipelineStage::Duplicates));
        assert!(stages.contains(&PipelineStage::Outliers));
        assert_eq!(stages.last(), Some(&PipelineStage::Complete));
    }

    #[test]
    fn test_progress_reporter_counts_updates() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let pipeline = CleaningPipeline::builder()
            .on_progress(move |_update| {
                call_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        pipeline.report_progress(ProgressUpdate::new(PipelineStage::Outliers, 0.5, "Test"));

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}
