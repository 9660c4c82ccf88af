//! Gemini client error types.

use thiserror::Error;

pub type GeminiResult<T> = Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gemini API returned {status}: {body}")]
    Http { status: u16, body: String },

    /// Request URLs are stripped before wrapping.
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for GeminiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.without_url())
    }
}

impl GeminiError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// HTTP status of the failed call, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GeminiError::Http { status, .. } => Some(*status),
            GeminiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if error is transient and the call may be repeated.
    ///
    /// Server errors (5xx), rate limiting (429), timeouts and connection
    /// failures are transient. Other client errors, local I/O failures and
    /// malformed responses are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            GeminiError::Http { status, .. } => *status >= 500 || *status == 429,
            GeminiError::Network(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            GeminiError::Config(_)
            | GeminiError::InvalidResponse(_)
            | GeminiError::Io(_) => false,
        }
    }

    /// The remote resource does not exist (already deleted or expired).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
