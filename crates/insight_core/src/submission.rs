use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("no url given")]
    Empty,
    #[error("invalid url: {0}")]
    Invalid(String),
    #[error("unsupported url scheme {0}, expected http or https")]
    UnsupportedScheme(String),
}

/// Trims a submitted URL and checks it is an absolute http(s) URL.
///
/// The trimmed input is returned as typed, not in normalized form, since the
/// task records what the user asked for.
pub fn parse_submission(raw: &str) -> Result<String, SubmissionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SubmissionError::Empty);
    }
    let parsed = Url::parse(trimmed).map_err(|err| SubmissionError::Invalid(err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(SubmissionError::UnsupportedScheme(other.to_string())),
    }
}
