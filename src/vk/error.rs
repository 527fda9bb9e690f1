use thiserror::Error;

/// VK error codes worth another attempt: "too many requests per second"
/// and "internal server error".
const TRANSIENT_API_CODES: &[i64] = &[6, 10];

/// Failure talking to the VK API.
#[derive(Debug, Error)]
pub enum VkError {
    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("HTTP error {status} from VK")]
    HttpStatus { status: u16 },

    #[error("Request to VK failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("VK response carries neither 'response' nor 'error'")]
    EmptyResponse,
}

impl VkError {
    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            VkError::Api { code, .. } => TRANSIENT_API_CODES.contains(code),
            VkError::HttpStatus { status } => *status == 429 || *status >= 500,
            VkError::Http(e) => !e.is_decode() && !e.is_builder(),
            VkError::EmptyResponse => false,
        }
    }
}

/// Fatal outcomes of the metadata fetch. Any of these ends the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Error fetching photos from VK: {0}")]
    SourceApi(#[from] VkError),

    #[error("VK user {owner_id} has no photos in album '{album}'")]
    NoPhotosAvailable { owner_id: i64, album: String },

    #[error("Only {available} photos can be fetched for VK user {owner_id}, {requested} requested")]
    RequestExceedsAvailable {
        owner_id: i64,
        requested: u64,
        available: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_api_code_retryable() {
        let e = VkError::Api {
            code: 6,
            message: "Too many requests per second".into(),
        };
        assert!(e.is_retryable());
    }

    #[test]
    fn test_access_denied_api_code_not_retryable() {
        let e = VkError::Api {
            code: 30,
            message: "This profile is private".into(),
        };
        assert!(!e.is_retryable());
    }

    #[test]
    fn test_http_status_classification() {
        assert!(VkError::HttpStatus { status: 502 }.is_retryable());
        assert!(VkError::HttpStatus { status: 429 }.is_retryable());
        assert!(!VkError::HttpStatus { status: 404 }.is_retryable());
        assert!(!VkError::EmptyResponse.is_retryable());
    }

    #[test]
    fn test_request_exceeds_message_names_available() {
        let e = FetchError::RequestExceedsAvailable {
            owner_id: 1,
            requested: 20,
            available: 7,
        };
        assert_eq!(
            e.to_string(),
            "Only 7 photos can be fetched for VK user 1, 20 requested"
        );
    }
}
