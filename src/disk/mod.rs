//! Yandex Disk destination: folder creation, upload links, and uploads.

pub mod error;
pub mod responses;

use std::path::Path;

use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH};
use reqwest::{Client, Method, Response, StatusCode};
use tokio_util::io::ReaderStream;

use crate::retry::{self, RetryAction, RetryConfig};

pub use error::DiskError;
pub use responses::UploadLink;

pub const DEFAULT_API_URL: &str = "https://cloud-api.yandex.net";

/// Result of a create-folder request. Both variants count as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    Created,
    AlreadyExists,
}

/// Disk path of a folder in the root of the user's disk.
pub fn folder_path(folder: &str) -> String {
    format!("/{}", folder.trim_matches('/'))
}

/// Disk path of a file inside `folder`.
pub fn file_path(folder: &str, file_name: &str) -> String {
    format!("{}/{}", folder_path(folder), file_name)
}

/// Destination file store. [`YandexDisk`] is the real implementation.
#[async_trait::async_trait]
pub trait DestinationService: Send + Sync {
    async fn create_folder(&self, path: &str) -> Result<FolderStatus, DiskError>;

    async fn upload_link(&self, path: &str) -> Result<UploadLink, DiskError>;

    /// Push the bytes of a local file to a link from [`Self::upload_link`].
    async fn upload(&self, link: &UploadLink, file: &Path) -> Result<(), DiskError>;
}

pub struct YandexDisk {
    client: Client,
    base_url: String,
    token: String,
    overwrite: bool,
    retry: RetryConfig,
}

impl YandexDisk {
    pub fn new(
        client: Client,
        base_url: &str,
        token: String,
        overwrite: bool,
        retry: RetryConfig,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            overwrite,
            retry,
        }
    }

    fn auth_header(&self) -> String {
        format!("OAuth {}", self.token)
    }

    async fn with_retry<T, F, Fut>(&self, operation: F) -> Result<T, DiskError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, DiskError>>,
    {
        retry::retry_with_backoff(
            &self.retry,
            |e: &DiskError| {
                if e.is_retryable() {
                    RetryAction::Retry
                } else {
                    RetryAction::Abort
                }
            },
            operation,
        )
        .await
    }

    async fn attempt_create_folder(&self, path: &str) -> Result<FolderStatus, DiskError> {
        let response = self
            .client
            .put(format!("{}/v1/disk/resources", self.base_url))
            .query(&[("path", path)])
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        match response.status() {
            StatusCode::CONFLICT => Ok(FolderStatus::AlreadyExists),
            s if s.is_success() => Ok(FolderStatus::Created),
            _ => Err(api_error(response).await),
        }
    }

    async fn attempt_upload_link(&self, path: &str) -> Result<UploadLink, DiskError> {
        let overwrite = if self.overwrite { "true" } else { "false" };
        let response = self
            .client
            .get(format!("{}/v1/disk/resources/upload", self.base_url))
            .query(&[("path", path), ("overwrite", overwrite)])
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn attempt_upload(&self, link: &UploadLink, file: &Path) -> Result<(), DiskError> {
        let handle = tokio::fs::File::open(file).await?;
        let len = handle.metadata().await?.len();
        let method = Method::from_bytes(link.method.as_bytes()).unwrap_or(Method::PUT);
        let response = self
            .client
            .request(method, &link.href)
            .header(CONTENT_LENGTH, len)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(handle)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}

/// Turn a non-success response into [`DiskError::Api`], keeping whatever
/// explanation the body carries.
async fn api_error(response: Response) -> DiskError {
    let status = response.status().as_u16();
    let raw = response.text().await.unwrap_or_default();
    let body: responses::ErrorBody = serde_json::from_str(&raw).unwrap_or_default();
    DiskError::Api {
        status,
        message: body.summary(&raw),
    }
}

#[async_trait::async_trait]
impl DestinationService for YandexDisk {
    async fn create_folder(&self, path: &str) -> Result<FolderStatus, DiskError> {
        tracing::debug!(path, "create folder");
        self.with_retry(|| self.attempt_create_folder(path)).await
    }

    async fn upload_link(&self, path: &str) -> Result<UploadLink, DiskError> {
        tracing::debug!(path, overwrite = self.overwrite, "request upload link");
        self.with_retry(|| self.attempt_upload_link(path)).await
    }

    async fn upload(&self, link: &UploadLink, file: &Path) -> Result<(), DiskError> {
        tracing::debug!(file = %file.display(), "upload");
        self.with_retry(|| self.attempt_upload(link, file)).await
    }
}

impl std::fmt::Debug for YandexDisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YandexDisk")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("overwrite", &self.overwrite)
            .finish_non_exhaustive()
    }
}
