use thiserror::Error;

/// Failure talking to the REST backend.
///
/// The `Display` output carries technical detail for logs; pages show the
/// localized messages from `LanguageStrings` instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend returned HTTP {status} for {url}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("unexpected response body from {url}: {detail}")]
    Parse { url: String, detail: String },

    #[error("backend rejected the request: {0}")]
    Rejected(String),

    #[error("missing or expired credentials")]
    Unauthorized,
}

impl ApiError {
    /// Transport failures and server errors may succeed on a later attempt;
    /// client errors and malformed bodies will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport { .. } => true,
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status reported by the backend, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }
}
