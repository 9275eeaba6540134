//! Pipeline module.
//!
//! This module provides the cleaning pipeline, the outlier handler and
//! progress reporting.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{CleaningOutcome, CleaningPipeline, CleaningPipelineBuilder};
pub use outliers::{ColumnZScores, OutlierHandler, handle_outliers};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
