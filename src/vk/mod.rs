//! VK photo source: the `photos.get` client and the metadata fetcher built on
//! top of it.

pub mod error;
pub mod fetch;
pub mod responses;
pub mod sizes;

use reqwest::Client;

use crate::retry::{self, RetryAction, RetryConfig};
use crate::types::Album;

pub use error::{FetchError, VkError};
pub use fetch::MetadataFetcher;
pub use responses::{PhotosPage, RawPhoto, SizeVariant};
pub use sizes::{select_largest, MalformedSizeData, SizeKind};

pub const DEFAULT_API_URL: &str = "https://api.vk.com";
pub const API_VERSION: &str = "5.199";

/// One `photos.get` page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotosQuery {
    pub owner_id: i64,
    pub album: Album,
    pub offset: u64,
    pub count: u64,
}

/// Source of photo metadata. [`VkClient`] talks to the real API; tests plug
/// in canned pages.
#[async_trait::async_trait]
pub trait SourceService: Send + Sync {
    async fn photos(&self, query: &PhotosQuery) -> Result<PhotosPage, VkError>;
}

pub struct VkClient {
    client: Client,
    base_url: String,
    token: String,
    retry: RetryConfig,
}

impl VkClient {
    pub fn new(client: Client, base_url: &str, token: String, retry: RetryConfig) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            retry,
        }
    }

    async fn attempt_photos(&self, query: &PhotosQuery) -> Result<PhotosPage, VkError> {
        let url = format!("{}/method/photos.get", self.base_url);
        let owner_id = query.owner_id.to_string();
        let offset = query.offset.to_string();
        let count = query.count.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("owner_id", owner_id.as_str()),
                ("album_id", query.album.as_str()),
                ("extended", "1"),
                ("photo_sizes", "1"),
                ("offset", offset.as_str()),
                ("count", count.as_str()),
                ("access_token", self.token.as_str()),
                ("v", API_VERSION),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VkError::HttpStatus {
                status: response.status().as_u16(),
            });
        }

        let envelope: responses::Envelope = response.json().await?;
        match (envelope.response, envelope.error) {
            (_, Some(err)) => Err(VkError::Api {
                code: err.error_code,
                message: err.error_msg,
            }),
            (Some(page), None) => Ok(page),
            (None, None) => Err(VkError::EmptyResponse),
        }
    }
}

#[async_trait::async_trait]
impl SourceService for VkClient {
    async fn photos(&self, query: &PhotosQuery) -> Result<PhotosPage, VkError> {
        tracing::debug!(
            owner_id = query.owner_id,
            album = %query.album,
            offset = query.offset,
            count = query.count,
            "photos.get"
        );
        retry::retry_with_backoff(
            &self.retry,
            |e: &VkError| {
                if e.is_retryable() {
                    RetryAction::Retry
                } else {
                    RetryAction::Abort
                }
            },
            || self.attempt_photos(query),
        )
        .await
    }
}

impl std::fmt::Debug for VkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VkClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}
