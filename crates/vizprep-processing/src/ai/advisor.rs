//! Chart advisor.
//!
//! Turns a free-text visualization request into a chart suggestion by
//! asking an [`LlmProvider`] four questions in sequence: what the request is
//! about, which chart fits, why, and how to draw it.
//!
//! The plotting code in a [`ChartSuggestion`] comes straight from the model.
//! It is returned as text for display and is never executed here.

use super::LlmProvider;
use crate::error::{PreprocessingError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// First fenced code block, optionally tagged `python` or `py`.
static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:python|py)?[ \t]*\r?\n(.*?)\r?\n?```")
        .expect("Invalid regex pattern for CODE_BLOCK")
});

/// Model answers for one visualization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSuggestion {
    /// Summary of the data involved in the request.
    pub query_analysis: String,
    /// Name of the chosen chart type.
    pub visualization: String,
    /// Short explanation of the choice.
    pub rationale: String,
    /// Plotting code extracted from the model reply. Untrusted; never run it.
    pub code: String,
    /// The full model reply the code was extracted from.
    pub raw_code_response: String,
}

/// Asks an LLM for chart suggestions.
pub struct ChartAdvisor {
    provider: Arc<dyn LlmProvider>,
}

impl ChartAdvisor {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Issue the four requests in order and collect the answers.
    ///
    /// `dataset_context` describes the table (column names and types); see
    /// [`Session::advisor_context`](crate::session::Session::advisor_context).
    /// The first failing request aborts the suggestion.
    pub fn suggest(&self, dataset_context: &str, request: &str) -> Result<ChartSuggestion> {
        let request = request.trim();
        if request.is_empty() {
            return Err(PreprocessingError::InvalidConfig(
                "visualization request is empty".to_string(),
            ));
        }

        info!(
            "Asking {} ({}) for a chart suggestion",
            self.provider.name(),
            self.provider.model().unwrap_or("default model")
        );

        let query_analysis = self.provider.complete(&analysis_prompt(request))?;
        debug!("Query analysis received");

        let visualization = self
            .provider
            .complete(&selection_prompt(dataset_context, request))?
            .trim()
            .to_string();
        debug!("Selected visualization: {}", visualization);

        let rationale = self
            .provider
            .complete(&rationale_prompt(&visualization, request))?;

        let raw_code_response =
            self.provider
                .complete(&code_prompt(dataset_context, &visualization, request))?;
        let code = extract_code_block(&raw_code_response);

        Ok(ChartSuggestion {
            query_analysis,
            visualization,
            rationale,
            code,
            raw_code_response,
        })
    }
}

/// Pull the body of the first fenced code block out of `response`.
///
/// Replies without a fence are returned trimmed, as they usually are bare code.
pub fn extract_code_block(response: &str) -> String {
    match CODE_BLOCK.captures(response).and_then(|c| c.get(1)) {
        Some(code) => code.as_str().to_string(),
        None => response.trim().to_string(),
    }
}

fn analysis_prompt(request: &str) -> String {
    format!(
        "You are an expert assistant specializing in data visualization. \
        Summarize the following request: what type of data is involved \
        (numerical, categorical, time-series, etc.) and what kind of chart it calls for.\n\n\
        User Request:\n\"{}\"",
        request
    )
}

fn selection_prompt(dataset_context: &str, request: &str) -> String {
    format!(
        "You are an expert in data visualization. Based on the dataset and the request below, \
        suggest the single most appropriate visualization type. Do not write any code.\n\n\
        Dataset:\n{}\n\n\
        User Request:\n{}\n\n\
        Respond with only the name of the visualization.",
        dataset_context, request
    )
}

fn rationale_prompt(visualization: &str, request: &str) -> String {
    format!(
        "Explain in under 3 sentences why a {} is the best choice for this request.\n\n\
        User Request:\n{}",
        visualization, request
    )
}

fn code_prompt(dataset_context: &str, visualization: &str, request: &str) -> String {
    format!(
        "Write Python code using matplotlib, seaborn or plotly that draws a {} \
        for the request below.\n\n\
        Dataset Columns and Types:\n{}\n\n\
        User Request:\n{}\n\n\
        Assume the DataFrame is named `df`. Reply with the code only.",
        visualization, dataset_context, request
    )
}
