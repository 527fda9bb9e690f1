use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::error::DownloadError;
use crate::retry::{self, RetryAction, RetryConfig};

/// A photo downloaded into the staging directory, waiting for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub file_name: String,
    pub local_path: PathBuf,
}

/// Download `url` to `<staging_dir>/<file_name>`.
///
/// Bytes land in `<file_name>.part` first and are renamed on completion, so a
/// staged file is never half-written. File names are unique per run, which
/// keeps concurrent downloads apart. Transient failures are retried.
pub async fn stage_file(
    client: &Client,
    url: &str,
    staging_dir: &Path,
    file_name: &str,
    retry_config: &RetryConfig,
) -> Result<StagedFile, DownloadError> {
    fs::create_dir_all(staging_dir).await?;
    let local_path = staging_dir.join(file_name);
    let part_path = staging_dir.join(format!("{file_name}.part"));

    let result = retry::retry_with_backoff(
        retry_config,
        |e: &DownloadError| {
            if e.is_retryable() {
                RetryAction::Retry
            } else {
                RetryAction::Abort
            }
        },
        || async {
            let _ = fs::remove_file(&part_path).await;
            attempt_download(client, url, file_name, &part_path).await
        },
    )
    .await;

    let finished = match result {
        Ok(()) => fs::rename(&part_path, &local_path)
            .await
            .map_err(DownloadError::from),
        Err(e) => Err(e),
    };
    if let Err(e) = finished {
        let _ = fs::remove_file(&part_path).await;
        return Err(e);
    }
    Ok(StagedFile {
        file_name: file_name.to_string(),
        local_path,
    })
}

/// Single download attempt, streamed to disk chunk by chunk.
async fn attempt_download(
    client: &Client,
    url: &str,
    file_name: &str,
    part_path: &Path,
) -> Result<(), DownloadError> {
    let http_err = |source: reqwest::Error| DownloadError::Http {
        file_name: file_name.to_string(),
        source,
    };
    let response = client.get(url).send().await.map_err(http_err)?;

    if !response.status().is_success() {
        return Err(DownloadError::HttpStatus {
            status: response.status().as_u16(),
            file_name: file_name.to_string(),
        });
    }

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(part_path)
        .await?;

    let mut bytes_written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::warn!(
                "Body error for {} after {} bytes: {}",
                file_name,
                bytes_written,
                e
            );
            http_err(e)
        })?;
        file.write_all(&chunk).await?;
        bytes_written += chunk.len() as u64;
    }
    file.flush().await?;

    tracing::debug!(file_name, bytes_written, "staged");
    Ok(())
}
