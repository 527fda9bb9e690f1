//! Export records: the named, size-resolved form of a photo that the transfer
//! stage consumes and the snapshot file records.

pub mod naming;
pub mod snapshot;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::vk::SizeKind;

pub use naming::{assign_names, SizeDataError};
pub use snapshot::write_snapshot;

/// A photo ready for transfer. The file name is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    file_name: String,
    #[serde(rename = "type")]
    size_kind: SizeKind,
    #[serde(rename = "likes")]
    like_count: u64,
    captured_at: DateTime<Utc>,
    #[serde(skip)]
    source_url: String,
}

impl ExportRecord {
    pub(crate) fn new(
        file_name: String,
        size_kind: SizeKind,
        like_count: u64,
        captured_at: DateTime<Utc>,
        source_url: String,
    ) -> Self {
        Self {
            file_name,
            size_kind,
            like_count,
            captured_at,
            source_url,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size_kind(&self) -> SizeKind {
        self.size_kind
    }

    pub fn like_count(&self) -> u64 {
        self.like_count
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("like count is missing or not a number")]
    MissingLikes,
    #[error("capture date is missing or not a unix timestamp")]
    MissingDate,
    #[error("capture date {0} is out of range")]
    DateOutOfRange(i64),
}

/// A photo that could not be turned into an [`ExportRecord`]. Skipped, not fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("photo #{index} (id {}): {reason}", .photo_id.map_or_else(|| "unknown".to_string(), |id| id.to_string()))]
pub struct MalformedRecord {
    pub index: usize,
    pub photo_id: Option<i64>,
    pub reason: MalformedReason,
}
