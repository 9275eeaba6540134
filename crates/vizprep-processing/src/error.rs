//! Custom error types for loading and cleaning datasets.
//!
//! This module provides the error hierarchy shared by the loader, the
//! cleaning handlers and the chart advisor, using `thiserror`.
//!
//! Errors are serializable as `{code, message}` so a UI layer can display
//! them without knowing the variant layout.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the vizprep library.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// File extension has no loader.
    #[error("Unsupported file format '{0}'. Please upload a CSV, Excel, JSON or PDF file")]
    UnsupportedFormat(String),

    /// A supported file could not be parsed.
    #[error("Failed to load {format} file: {reason}")]
    Load { format: String, reason: String },

    /// Strategy token did not match any known variant.
    #[error("Invalid {kind} strategy '{value}'")]
    InvalidStrategy { kind: &'static str, value: String },

    /// Column holds no values, so mean/median/mode is undefined.
    #[error("Column '{0}' has no values to compute a fill value from")]
    EmptyColumn(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// LLM client error.
    #[error("AI client error: {0}")]
    AiClientError(String),

    /// LLM request exceeded its deadline.
    #[error("AI request timed out after {0}s")]
    AiTimeout(u64),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error (for AI client, only with "ai" feature).
    #[cfg(feature = "ai")]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Build a [`PreprocessingError::Load`] from any displayable cause.
    pub fn load(format: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        PreprocessingError::Load {
            format: format.into(),
            reason: reason.to_string(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::Load { .. } => "LOAD_ERROR",
            Self::InvalidStrategy { .. } => "INVALID_STRATEGY",
            Self::EmptyColumn(_) => "EMPTY_COLUMN",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::AiClientError(_) => "AI_CLIENT_ERROR",
            Self::AiTimeout(_) => "AI_TIMEOUT",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(feature = "ai")]
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if the user can fix this by changing input or retrying.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::UnsupportedFormat(_)
            | Self::InvalidStrategy { .. }
            | Self::InvalidConfig(_)
            | Self::AiTimeout(_) => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for vizprep operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}
