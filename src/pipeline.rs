//! Run driver: fetch metadata, name the photos, record the snapshot, then
//! move the files.

use std::path::PathBuf;

use reqwest::Client;
use thiserror::Error;

use crate::disk::DestinationService;
use crate::export::{self, ExportRecord, MalformedRecord, SizeDataError};
use crate::transfer::{FolderCreateFailed, TransferConfig, TransferEngine, TransferOutcome};
use crate::types::Album;
use crate::vk::{FetchError, MetadataFetcher, SourceService};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub owner_id: i64,
    pub album: Album,
    pub count: u64,
    pub folder: String,
    pub snapshot_path: PathBuf,
    pub page_size: u64,
    pub transfer: TransferConfig,
}

/// Errors that end a run before every record has an outcome.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    SizeData(#[from] SizeDataError),

    #[error(transparent)]
    FolderCreate(#[from] FolderCreateFailed),

    #[error("Failed to write snapshot {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Everything a completed run produced. `outcomes[i]` belongs to `records[i]`.
#[derive(Debug)]
pub struct RunReport {
    pub malformed: Vec<MalformedRecord>,
    pub records: Vec<ExportRecord>,
    pub outcomes: Vec<TransferOutcome>,
}

impl RunReport {
    pub fn uploaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_uploaded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.uploaded()
    }

    /// Record/outcome pairs in input order.
    pub fn entries(&self) -> impl Iterator<Item = (&ExportRecord, &TransferOutcome)> {
        self.records.iter().zip(self.outcomes.iter())
    }
}

pub async fn run(
    source: &dyn SourceService,
    destination: &dyn DestinationService,
    http: &Client,
    config: &PipelineConfig,
) -> Result<RunReport, PipelineError> {
    tracing::info!(
        "Fetching {} photo(s) of VK user {} from album '{}'",
        config.count,
        config.owner_id,
        config.album
    );
    let raws = MetadataFetcher::new(source, config.page_size)
        .fetch(config.owner_id, config.album, config.count)
        .await?;

    let mut records = Vec::with_capacity(raws.len());
    let mut malformed = Vec::new();
    for named in export::assign_names(&raws)? {
        match named {
            Ok(record) => records.push(record),
            Err(bad) => malformed.push(bad),
        }
    }

    export::write_snapshot(&config.snapshot_path, &records)
        .await
        .map_err(|source| PipelineError::Snapshot {
            path: config.snapshot_path.clone(),
            source,
        })?;
    tracing::info!(
        "Wrote {} record(s) to {}",
        records.len(),
        config.snapshot_path.display()
    );

    let outcomes = TransferEngine::new(http, destination, &config.transfer)
        .transfer(&records, &config.folder)
        .await?;

    Ok(RunReport {
        malformed,
        records,
        outcomes,
    })
}
