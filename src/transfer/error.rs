use thiserror::Error;

use crate::disk::DiskError;

/// Typed staging-download errors enabling retry classification.
///
/// `is_retryable()` separates transient failures (server errors, rate limits,
/// dropped connections) from permanent ones (missing photo, disk failures) so
/// the retry loop can give up early.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP error {status} downloading {file_name}")]
    HttpStatus { status: u16, file_name: String },

    #[error("HTTP error downloading {file_name}: {source}")]
    Http {
        file_name: String,
        source: reqwest::Error,
    },

    #[error("Disk error: {0}")]
    Disk(#[from] std::io::Error),
}

impl DownloadError {
    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            DownloadError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            DownloadError::Http { source, .. } => !source.is_builder(),
            DownloadError::Disk(_) => false,
        }
    }
}

/// The destination folder could not be created; nothing can be uploaded.
#[derive(Debug, Error)]
#[error("Failed to create destination folder '{folder}': {source}")]
pub struct FolderCreateFailed {
    pub folder: String,
    #[source]
    pub source: DiskError,
}
