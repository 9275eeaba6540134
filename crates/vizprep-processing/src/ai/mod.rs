//! AI module for LLM-powered chart suggestions.
//!
//! This module provides a trait-based abstraction for LLM providers and the
//! [`ChartAdvisor`] built on top of it.
//!
//! # Feature Flag
//!
//! The concrete [`AnthropicProvider`] requires the `ai` feature flag. The
//! [`LlmProvider`] trait and the advisor are always available for custom
//! implementations.
//!
//! ```toml
//! # Enable AI support (default)
//! vizprep-processing = { version = "0.1", features = ["ai"] }
//!
//! # Disable AI support for smaller binary
//! vizprep-processing = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use vizprep_processing::ai::{AnthropicProvider, ChartAdvisor};
//! use std::sync::Arc;
//!
//! let advisor = ChartAdvisor::new(Arc::new(AnthropicProvider::new(api_key)?));
//! let suggestion = advisor.suggest(&session.advisor_context(), "sales per region")?;
//! println!("{}: {}", suggestion.visualization, suggestion.rationale);
//! ```

mod advisor;
mod provider;

pub use advisor::{ChartAdvisor, ChartSuggestion, extract_code_block};
pub use provider::LlmProvider;

#[cfg(feature = "ai")]
mod anthropic;

#[cfg(feature = "ai")]
pub use anthropic::{AnthropicConfig, AnthropicConfigBuilder, AnthropicProvider};
