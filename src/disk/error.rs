use thiserror::Error;

/// Failure talking to the Disk REST API.
#[derive(Debug, Error)]
pub enum DiskError {
    /// Non-success status, with the API's `error`/`message` fields when present.
    #[error("Disk API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request to Disk failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cannot read staged file: {0}")]
    Io(#[from] std::io::Error),
}

impl DiskError {
    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            DiskError::Api { status, .. } => *status == 429 || *status >= 500,
            DiskError::Http(e) => !e.is_decode() && !e.is_builder(),
            DiskError::Io(_) => false,
        }
    }
}
