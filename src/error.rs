use thiserror::Error;

#[derive(Debug, Error)]
pub enum CraiyonError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Rate limited by backend (HTTP 429): {body}")]
    RateLimited { body: String },
    #[error("Backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CraiyonError {
    /// HTTP status carried by the error, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            CraiyonError::RateLimited { .. } => Some(429),
            CraiyonError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CraiyonError::RateLimited { .. })
    }

    /// Transport failures and non-success statuses are worth another attempt.
    /// Anything else would fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CraiyonError::Transport(_)
                | CraiyonError::RateLimited { .. }
                | CraiyonError::Backend { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CraiyonError>;
