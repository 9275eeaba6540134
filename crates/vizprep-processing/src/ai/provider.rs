//! LLM provider trait.
//!
//! [`LlmProvider`] hides the HTTP details of a hosted model behind a single
//! text-in, text-out call so the chart advisor can run against any backend,
//! or against a canned provider in tests.
//!
//! # Implementing a New Provider
//!
//! 1. Create a new file in `src/ai/` (e.g., `openai.rs`)
//! 2. Implement the [`LlmProvider`] trait for your provider struct
//! 3. Export the provider in `src/ai/mod.rs`

use crate::error::Result;

/// A hosted language model that answers a single prompt.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage across threads.
///
/// # Error Handling
///
/// Calls must be bounded in time. Running out of time is reported as
/// [`PreprocessingError::AiTimeout`](crate::error::PreprocessingError::AiTimeout);
/// every other failure as
/// [`PreprocessingError::AiClientError`](crate::error::PreprocessingError::AiClientError).
pub trait LlmProvider: Send + Sync {
    /// Send `prompt` as a single user message and return the reply text.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Get the provider name for logging and debugging.
    fn name(&self) -> &str;

    /// Get the model being used by this provider.
    ///
    /// Returns `None` if the provider doesn't expose model information.
    fn model(&self) -> Option<&str> {
        None
    }
}
