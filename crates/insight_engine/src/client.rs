use std::sync::Arc;

use insight_core::AnalysisResult;
use insight_logging::{insight_debug, insight_warn};

use crate::citations::collect_sources;
use crate::parse::parse_analysis;
use crate::Provider;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Provider or transport failure, carrying the provider's message as is.
    #[error("{0}")]
    Transport(String),
    #[error("Failed to parse the analysis result. The model output was not valid JSON.")]
    Parse,
    #[error("Invalid analysis result: field `{field}` {reason}")]
    Schema { field: &'static str, reason: String },
}

/// Turns a URL into a validated [`AnalysisResult`] with one provider call.
#[derive(Clone)]
pub struct AnalysisClient {
    provider: Arc<dyn Provider>,
}

impl AnalysisClient {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    pub async fn analyze(&self, url: &str) -> Result<AnalysisResult, AnalysisError> {
        let response = self
            .provider
            .generate(&analysis_prompt(url))
            .await
            .map_err(|err| {
                insight_warn!("Provider request for {} failed ({}): {}", url, err.kind, err.message);
                AnalysisError::Transport(err.message)
            })?;

        let text = response
            .text
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "{}".to_string());
        let mut result = parse_analysis(&text)?;
        result.sources = collect_sources(&response.citations);
        insight_debug!(
            "Analysis for {} parsed: title={:?} sources={}",
            url,
            result.title,
            result.sources.len()
        );
        Ok(result)
    }
}

pub fn analysis_prompt(url: &str) -> String {
    format!(
        r#"Perform a deep analysis of the following URL: {url}.
Act as a web scraper and content analyzer.
Use Google Search to find the most recent content associated with this URL to ensure accuracy.

You MUST return the result as a raw valid JSON object (no markdown formatting, no code blocks) with the following specific structure:
{{
  "title": "Page Title",
  "summary": "A concise summary (max 3 sentences).",
  "keywords": ["tag1", "tag2", "tag3", "tag4", "tag5"],
  "sentiment": "Positive" | "Neutral" | "Negative",
  "mainEntities": ["Entity1", "Entity2", "Entity3"],
  "estimatedReadingTimeMinutes": 5
}}

Ensure "sentiment" is exactly one of: "Positive", "Neutral", "Negative".
Ensure "estimatedReadingTimeMinutes" is a number.
"#
    )
}
