use thiserror::Error;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("backend request timed out")]
    Timeout,

    /// The response body could not be parsed as the expected JSON.
    #[error("failed to parse backend response: {0}")]
    Parse(String),

    /// The backend answered with a non-success status.
    ///
    /// `message` is the `error` field of the body when one was sent.
    #[error("backend returned {status}: {}", message.as_deref().unwrap_or("no error message"))]
    Backend { status: u16, message: Option<String> },
}

impl ApiError {
    /// Text to show the user: the backend's own error message when it sent
    /// one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Backend {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Parse(e.to_string())
        } else {
            ApiError::Request(e.to_string())
        }
    }
}
