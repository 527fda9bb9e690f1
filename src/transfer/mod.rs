//! Transfer engine: stage every export record locally, then push the staged
//! files to the destination folder.
//!
//! Both phases run on a bounded worker pool. Results land in slots addressed
//! by the record's position, so the outcome list lines up with the input no
//! matter which download or upload finishes first. A failing record never
//! cancels its siblings; only a failed folder creation stops the run.

pub mod error;
pub mod file;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;

use crate::disk::{self, DestinationService, DiskError, FolderStatus};
use crate::export::ExportRecord;
use crate::retry::RetryConfig;

pub use error::FolderCreateFailed;
pub use file::StagedFile;

/// Subset of application config consumed by the transfer engine.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    pub(crate) staging_dir: PathBuf,
    pub(crate) concurrency: usize,
    pub(crate) retry: RetryConfig,
    pub(crate) no_progress_bar: bool,
}

/// Final result for one export record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Uploaded,
    DownloadFailed(String),
    UploadFailed(String),
}

impl TransferOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, TransferOutcome::Uploaded)
    }
}

impl std::fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferOutcome::Uploaded => f.write_str("uploaded"),
            TransferOutcome::DownloadFailed(reason) => write!(f, "download failed: {reason}"),
            TransferOutcome::UploadFailed(reason) => write!(f, "upload failed: {reason}"),
        }
    }
}

/// Where a record stands between phases. The in-flight states
/// (downloading, uploading) only exist inside the worker futures.
#[derive(Debug)]
enum RecordState {
    Pending,
    Downloaded(StagedFile),
    DownloadFailed(String),
    Uploaded,
    UploadFailed(String),
}

impl From<RecordState> for TransferOutcome {
    fn from(state: RecordState) -> Self {
        match state {
            RecordState::Uploaded => TransferOutcome::Uploaded,
            RecordState::DownloadFailed(reason) => TransferOutcome::DownloadFailed(reason),
            RecordState::UploadFailed(reason) => TransferOutcome::UploadFailed(reason),
            RecordState::Pending => TransferOutcome::DownloadFailed("not attempted".into()),
            RecordState::Downloaded(_) => TransferOutcome::UploadFailed("not attempted".into()),
        }
    }
}

pub struct TransferEngine<'a> {
    http: &'a Client,
    destination: &'a dyn DestinationService,
    config: &'a TransferConfig,
}

impl<'a> TransferEngine<'a> {
    pub fn new(
        http: &'a Client,
        destination: &'a dyn DestinationService,
        config: &'a TransferConfig,
    ) -> Self {
        Self {
            http,
            destination,
            config,
        }
    }

    /// Create `folder`, download every record, upload every staged file.
    ///
    /// Returns one outcome per record, in input order.
    pub async fn transfer(
        &self,
        records: &[ExportRecord],
        folder: &str,
    ) -> Result<Vec<TransferOutcome>, FolderCreateFailed> {
        let started = Instant::now();
        self.ensure_folder(folder).await?;

        let mut states: Vec<RecordState> = records.iter().map(|_| RecordState::Pending).collect();
        self.download_phase(records, &mut states).await;
        self.upload_phase(folder, &mut states).await;

        let outcomes: Vec<TransferOutcome> =
            states.into_iter().map(TransferOutcome::from).collect();
        let uploaded = outcomes.iter().filter(|o| o.is_uploaded()).count();
        tracing::info!("── Transfer ──");
        tracing::info!(
            "  {} uploaded, {} failed, {} total",
            uploaded,
            outcomes.len() - uploaded,
            outcomes.len()
        );
        tracing::info!("  elapsed: {}", format_duration(started.elapsed()));
        Ok(outcomes)
    }

    async fn ensure_folder(&self, folder: &str) -> Result<(), FolderCreateFailed> {
        let path = disk::folder_path(folder);
        match self.destination.create_folder(&path).await {
            Ok(FolderStatus::Created) => tracing::info!("Created folder {}", path),
            Ok(FolderStatus::AlreadyExists) => tracing::info!("Folder {} already exists", path),
            Err(source) => return Err(FolderCreateFailed { folder: path, source }),
        }
        Ok(())
    }

    async fn download_phase(&self, records: &[ExportRecord], states: &mut [RecordState]) {
        let pb = create_progress_bar(self.config.no_progress_bar, records.len() as u64);
        pb.set_prefix("download");

        let downloads = stream::iter(records.iter().enumerate())
            .map(|(index, record)| async move {
                let result = file::stage_file(
                    self.http,
                    record.source_url(),
                    &self.config.staging_dir,
                    record.file_name(),
                    &self.config.retry,
                )
                .await;
                (index, result)
            })
            .buffer_unordered(self.config.concurrency.max(1));
        tokio::pin!(downloads);

        while let Some((index, result)) = downloads.next().await {
            let file_name = records[index].file_name();
            pb.set_message(file_name.to_string());
            states[index] = match result {
                Ok(staged) => RecordState::Downloaded(staged),
                Err(e) => {
                    pb.suspend(|| tracing::error!("Download failed: {}: {}", file_name, e));
                    RecordState::DownloadFailed(e.to_string())
                }
            };
            pb.inc(1);
        }
        pb.finish_and_clear();
    }

    async fn upload_phase(&self, folder: &str, states: &mut [RecordState]) {
        let jobs: Vec<(usize, StagedFile)> = states
            .iter()
            .enumerate()
            .filter_map(|(index, state)| match state {
                RecordState::Downloaded(staged) => Some((index, staged.clone())),
                _ => None,
            })
            .collect();
        if jobs.is_empty() {
            return;
        }

        let pb = create_progress_bar(self.config.no_progress_bar, jobs.len() as u64);
        pb.set_prefix("upload");

        let uploads = stream::iter(jobs)
            .map(|(index, staged)| async move {
                let result = self.upload_one(folder, &staged).await;
                discard_staged(&staged).await;
                (index, staged.file_name, result)
            })
            .buffer_unordered(self.config.concurrency.max(1));
        tokio::pin!(uploads);

        while let Some((index, file_name, result)) = uploads.next().await {
            pb.set_message(file_name.clone());
            states[index] = match result {
                Ok(()) => {
                    tracing::debug!("Uploaded {}", disk::file_path(folder, &file_name));
                    RecordState::Uploaded
                }
                Err(e) => {
                    pb.suspend(|| tracing::error!("Upload failed: {}: {}", file_name, e));
                    RecordState::UploadFailed(e.to_string())
                }
            };
            pb.inc(1);
        }
        pb.finish_and_clear();
    }

    async fn upload_one(&self, folder: &str, staged: &StagedFile) -> Result<(), DiskError> {
        let path = disk::file_path(folder, &staged.file_name);
        let link = self.destination.upload_link(&path).await?;
        self.destination.upload(&link, &staged.local_path).await
    }
}

/// Staged copies only live for the run.
async fn discard_staged(staged: &StagedFile) {
    if let Err(e) = tokio::fs::remove_file(&staged.local_path).await {
        tracing::warn!(
            "Could not remove staged file {}: {}",
            staged.local_path.display(),
            e
        );
    }
}

/// Per-phase bar; hidden with `--no-progress-bar` or when stdout is piped.
fn create_progress_bar(no_progress_bar: bool, total: u64) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "{prefix:>8} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .expect("valid template")
        .progress_chars("=> "),
    );
    pb
}

/// Compact elapsed time: `42s`, `12m 34s`, `1h 23m 45s`.
fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    match (secs / 3600, secs % 3600 / 60, secs % 60) {
        (0, 0, s) => format!("{s}s"),
        (0, m, s) => format!("{m}m {s:02}s"),
        (h, m, s) => format!("{h}h {m:02}m {s:02}s"),
    }
}
