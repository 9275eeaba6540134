//! Configuration types for the cleaning pipeline.
//!
//! Strategy enums are closed: tokens coming from a UI or CLI are parsed with
//! [`std::str::FromStr`] (case-insensitive) and unknown tokens are rejected
//! with [`PreprocessingError::InvalidStrategy`] instead of silently skipping
//! a cleaning stage.

use crate::error::PreprocessingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default absolute Z-score above which a numeric cell is an outlier.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.0;

/// Strategy for handling missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingStrategy {
    /// Numeric columns get their mean, other columns their mode
    #[default]
    Mean,
    /// Numeric columns get their median, other columns their mode
    Median,
    /// Every column gets its own mode
    MostFrequent,
    /// Drop rows with at least one missing value
    Drop,
}

/// What to do with fully identical rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMode {
    /// Keep the first occurrence, drop the rest
    #[default]
    Remove,
    /// Leave the table as-is
    Keep,
}

/// Strategy for handling Z-score outliers in numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutlierStrategy {
    /// Detect and report only
    #[default]
    Nothing,
    /// Replace every positive value `x` with `ln(x + 1)`
    LogTransformation,
    /// Replace flagged cells with the column mean
    Mean,
    /// Replace flagged cells with the column median
    Median,
    /// Remove rows containing at least one flagged cell
    Drop,
}

fn normalize_token(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

impl FromStr for MissingStrategy {
    type Err = PreprocessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "most_frequent" | "mode" => Ok(Self::MostFrequent),
            "drop" => Ok(Self::Drop),
            _ => Err(PreprocessingError::InvalidStrategy {
                kind: "missing value",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for DuplicateMode {
    type Err = PreprocessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "remove" | "drop" | "supprimer" => Ok(Self::Remove),
            "keep" | "garder" => Ok(Self::Keep),
            _ => Err(PreprocessingError::InvalidStrategy {
                kind: "duplicate",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for OutlierStrategy {
    type Err = PreprocessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "nothing" | "none" | "keep" => Ok(Self::Nothing),
            "log_transformation" | "log" => Ok(Self::LogTransformation),
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "drop" => Ok(Self::Drop),
            _ => Err(PreprocessingError::InvalidStrategy {
                kind: "outlier",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MissingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::MostFrequent => "most_frequent",
            Self::Drop => "drop",
        })
    }
}

impl fmt::Display for DuplicateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Remove => "remove",
            Self::Keep => "keep",
        })
    }
}

impl fmt::Display for OutlierStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nothing => "nothing",
            Self::LogTransformation => "log_transformation",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Drop => "drop",
        })
    }
}

/// Configuration for one cleaning run.
///
/// Use [`CleaningConfig::builder()`] to create a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use vizprep_processing::config::{CleaningConfig, MissingStrategy, OutlierStrategy};
///
/// let config = CleaningConfig::builder()
///     .missing_strategy(MissingStrategy::Median)
///     .outlier_strategy(OutlierStrategy::Drop)
///     .outlier_threshold(2.5)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Strategy for missing cells.
    /// Default: Mean
    pub missing_strategy: MissingStrategy,

    /// Duplicate row handling.
    /// Default: Remove
    pub duplicate_mode: DuplicateMode,

    /// Strategy for outlier cells.
    /// Default: Nothing
    pub outlier_strategy: OutlierStrategy,

    /// Absolute Z-score above which a cell is an outlier.
    /// Default: 3.0
    pub outlier_threshold: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            missing_strategy: MissingStrategy::default(),
            duplicate_mode: DuplicateMode::default(),
            outlier_strategy: OutlierStrategy::default(),
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        validate_threshold(self.outlier_threshold)
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<(), ConfigValidationError> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(ConfigValidationError::InvalidThreshold(threshold));
    }
    Ok(())
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid outlier threshold: {0} (must be a finite number above 0)")]
    InvalidThreshold(f64),
}

impl From<ConfigValidationError> for PreprocessingError {
    fn from(e: ConfigValidationError) -> Self {
        PreprocessingError::InvalidConfig(e.to_string())
    }
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    missing_strategy: Option<MissingStrategy>,
    duplicate_mode: Option<DuplicateMode>,
    outlier_strategy: Option<OutlierStrategy>,
    outlier_threshold: Option<f64>,
}

impl CleaningConfigBuilder {
    /// Set the missing value strategy.
    pub fn missing_strategy(mut self, strategy: MissingStrategy) -> Self {
        self.missing_strategy = Some(strategy);
        self
    }

    /// Set the duplicate handling mode.
    pub fn duplicate_mode(mut self, mode: DuplicateMode) -> Self {
        self.duplicate_mode = Some(mode);
        self
    }

    /// Set the outlier strategy.
    pub fn outlier_strategy(mut self, strategy: OutlierStrategy) -> Self {
        self.outlier_strategy = Some(strategy);
        self
    }

    /// Set the Z-score threshold.
    ///
    /// # Arguments
    /// * `threshold` - finite value above 0 (e.g., 3.0)
    pub fn outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = Some(threshold);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            missing_strategy: self.missing_strategy.unwrap_or_default(),
            duplicate_mode: self.duplicate_mode.unwrap_or_default(),
            outlier_strategy: self.outlier_strategy.unwrap_or_default(),
            outlier_threshold: self
                .outlier_threshold
                .unwrap_or(DEFAULT_OUTLIER_THRESHOLD),
        };

        config.validate()?;
        Ok(config)
    }
}
