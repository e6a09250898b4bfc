//! Error types for image stylization.

/// Maximum length of an upstream error message passed back to callers.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while stylizing an image.
#[derive(Debug, thiserror::Error)]
pub enum StylizeError {
    /// Missing or invalid caller input.
    #[error("{0}")]
    Validation(String),

    /// Provider credential not configured on the server.
    #[error("{0}")]
    Config(String),

    /// Uploaded bytes could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Provider call failed or returned a malformed response.
    #[error("{message}")]
    Upstream {
        /// HTTP status returned by the provider, if one was received.
        status: Option<u16>,
        /// Human-readable message, taken from the provider when available.
        message: String,
    },

    /// Provider call succeeded but omitted the expected image reference.
    #[error("{0}")]
    ContractViolation(String),

    /// Server-side fault unrelated to the caller's input or the provider.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StylizeError {
    /// Creates an upstream error from a provider status and response body.
    pub fn from_upstream(status: u16, body: &str) -> Self {
        Self::Upstream {
            status: Some(status),
            message: upstream_message(body)
                .unwrap_or_else(|| format!("provider request failed with status {status}")),
        }
    }

    /// Returns the HTTP status this error maps to.
    ///
    /// Upstream statuses are passed through when they are client or server
    /// errors; anything else collapses to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Decode(_) => 400,
            Self::Config(_) | Self::ContractViolation(_) | Self::Internal(_) => 500,
            Self::Upstream { status, .. } => match status {
                Some(s) if (400..600).contains(s) => *s,
                _ => 500,
            },
        }
    }
}

impl From<reqwest::Error> for StylizeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream {
            status: err.status().map(|s| s.as_u16()),
            message: sanitize_error_message(&err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for StylizeError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("background task failed: {err}"))
    }
}

impl From<::image::ImageError> for StylizeError {
    fn from(err: ::image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Extracts a message from an OpenAI-compatible error body.
///
/// Accepts `{"error": {"message": "..."}}`, `{"error": "..."}` and plain text.
pub(crate) fn upstream_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let message = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("error") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(err) => err
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string()),
            None => value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string()),
        },
        Err(_) => body.to_string(),
    };
    Some(sanitize_error_message(&message))
}

/// Collapses whitespace and caps the length of an error message.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return collapsed;
    }
    let mut capped: String = collapsed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    capped.push_str("...");
    capped
}

/// Result type alias for stylization operations.
pub type Result<T> = std::result::Result<T, StylizeError>;
