use std::fmt;
use std::time::Duration;

use insight_logging::insight_debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    /// `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: String::new(),
            request_timeout: None,
        }
    }
}

/// A web reference from the provider's grounding metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebReference {
    pub title: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderResponse {
    /// Concatenated text parts of the first candidate, if any.
    pub text: Option<String>,
    pub citations: Vec<WebReference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    InvalidRequest,
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidResponse,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderFailure::InvalidRequest => write!(f, "invalid request"),
            ProviderFailure::HttpStatus(code) => write!(f, "http status {code}"),
            ProviderFailure::Timeout => write!(f, "timeout"),
            ProviderFailure::Network => write!(f, "network error"),
            ProviderFailure::InvalidResponse => write!(f, "invalid response"),
        }
    }
}

/// Provider failure; `message` is what the provider or transport reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    pub kind: ProviderFailure,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// One request to a grounded language model.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError>;
}

/// Gemini `generateContent` over REST with Google Search grounding enabled.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl GeminiProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ProviderError::new(ProviderFailure::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// The key travels in a header, never in the URL.
    fn endpoint(&self) -> Result<url::Url, ProviderError> {
        let raw = format!(
            "{}/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        );
        url::Url::parse(&raw)
            .map_err(|err| ProviderError::new(ProviderFailure::InvalidRequest, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Provider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        // Structured JSON output cannot be combined with the search tool, so
        // the shape is requested in the prompt and parsed from free text.
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart { text: prompt }],
            }],
            tools: vec![Tool {
                google_search: EmptyConfig {},
            }],
        };
        let body = serde_json::to_vec(&request)
            .map_err(|err| ProviderError::new(ProviderFailure::InvalidRequest, err.to_string()))?;

        insight_debug!(
            "generateContent model={} prompt_len={}",
            self.settings.model,
            prompt.len()
        );

        let response = self
            .client
            .post(self.endpoint()?)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.settings.api_key)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(ProviderError::new(
                ProviderFailure::HttpStatus(status.as_u16()),
                error_message(status, &text),
            ));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|err| ProviderError::new(ProviderFailure::InvalidResponse, err.to_string()))?;
        Ok(parsed.into_provider_response())
    }
}

/// Messages are stored with failed tasks, so the request URL is dropped.
fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    let err = err.without_url();
    if err.is_timeout() {
        return ProviderError::new(ProviderFailure::Timeout, err.to_string());
    }
    ProviderError::new(ProviderFailure::Network, err.to_string())
}

/// The provider's own `error.message`, else the raw body, else the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(wrapper) = serde_json::from_str::<ErrorWrapper>(body) {
        if let Some(message) = wrapper.error.message.filter(|m| !m.is_empty()) {
            return message;
        }
    }
    if body.trim().is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: EmptyConfig,
}

#[derive(Serialize)]
struct EmptyConfig {}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl GenerateContentResponse {
    fn into_provider_response(self) -> ProviderResponse {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return ProviderResponse::default();
        };

        let texts: Vec<String> = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();
        let text = if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        };

        let citations = candidate
            .grounding_metadata
            .map(|meta| {
                meta.grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| chunk.web)
                    .map(|web| WebReference {
                        title: web.title,
                        uri: web.uri,
                    })
                    .collect()
            })
            .unwrap_or_default();

        ProviderResponse { text, citations }
    }
}
