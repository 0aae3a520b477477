use insight_core::{AnalysisResult, Sentiment};
use insight_logging::insight_error;
use serde_json::{Map, Value};

use crate::AnalysisError;

/// Removes every "```json" and "```" marker and trims the rest.
///
/// Nothing else is repaired.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses and validates the model's free-text answer.
///
/// `sources` is left empty; citations come from grounding metadata.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let cleaned = strip_code_fences(text);
    let value: Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(err) => {
            insight_error!("Analysis output is not valid JSON ({}): {}", err, text);
            return Err(AnalysisError::Parse);
        }
    };
    let Value::Object(fields) = value else {
        insight_error!("Analysis output is not a JSON object: {}", text);
        return Err(AnalysisError::Parse);
    };

    let title = string_field(&fields, "title")?;
    if title.trim().is_empty() {
        return Err(schema("title", "must not be empty"));
    }

    let sentiment_raw = string_field(&fields, "sentiment")?;
    let sentiment = Sentiment::from_exact(&sentiment_raw).ok_or_else(|| {
        schema(
            "sentiment",
            format!("expected Positive, Neutral or Negative, got {sentiment_raw:?}"),
        )
    })?;

    Ok(AnalysisResult {
        title,
        summary: string_field(&fields, "summary")?,
        keywords: string_list(&fields, "keywords")?,
        sentiment,
        main_entities: string_list(&fields, "mainEntities")?,
        estimated_reading_time_minutes: reading_time(&fields)?,
        sources: Vec::new(),
    })
}

fn schema(field: &'static str, reason: impl Into<String>) -> AnalysisError {
    AnalysisError::Schema {
        field,
        reason: reason.into(),
    }
}

fn required<'a>(fields: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, AnalysisError> {
    fields.get(field).ok_or_else(|| schema(field, "missing"))
}

fn string_field(fields: &Map<String, Value>, field: &'static str) -> Result<String, AnalysisError> {
    required(fields, field)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| schema(field, "expected a string"))
}

fn string_list(fields: &Map<String, Value>, field: &'static str) -> Result<Vec<String>, AnalysisError> {
    let items = required(fields, field)?
        .as_array()
        .ok_or_else(|| schema(field, "expected an array of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| schema(field, "expected an array of strings"))
        })
        .collect()
}

fn reading_time(fields: &Map<String, Value>) -> Result<f64, AnalysisError> {
    const FIELD: &str = "estimatedReadingTimeMinutes";
    let minutes = required(fields, FIELD)?
        .as_f64()
        .ok_or_else(|| schema(FIELD, "expected a number"))?;
    if minutes < 0.0 {
        return Err(schema(FIELD, "must not be negative"));
    }
    Ok(minutes)
}
