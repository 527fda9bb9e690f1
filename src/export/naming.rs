use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use super::{ExportRecord, MalformedReason, MalformedRecord};
use crate::vk::{select_largest, MalformedSizeData, RawPhoto};

/// Capture-time suffix used to tell apart photos with equal like counts.
const DATE_SUFFIX_FORMAT: &str = "%d-%m-%Y-%H_%M_%S";

/// A photo in the batch has no usable size variant; the whole batch is rejected.
#[derive(Debug, Error)]
#[error("photo #{index} (id {photo_id:?}): {source}")]
pub struct SizeDataError {
    pub index: usize,
    pub photo_id: Option<i64>,
    #[source]
    pub source: MalformedSizeData,
}

/// Per-photo naming result, index-aligned with the input batch.
pub type Named = Result<ExportRecord, MalformedRecord>;

/// Names handed out so far in one batch.
#[derive(Debug, Default)]
struct Ledger {
    seen_likes: HashSet<u64>,
    taken: HashSet<String>,
}

impl Ledger {
    /// Reserve `candidate`, or the first free `candidate_N` (N ≥ 2) when two
    /// photos share both like count and capture second.
    fn reserve(&mut self, candidate: String) -> String {
        if self.taken.insert(candidate.clone()) {
            return candidate;
        }
        let mut n = 2u64;
        loop {
            let name = format!("{candidate}_{n}");
            if self.taken.insert(name.clone()) {
                return name;
            }
            n += 1;
        }
    }
}

/// Resolve sizes and assign file names in a single left-to-right pass.
///
/// The first photo with a given like count is named after the count alone;
/// later ones get the UTC capture time appended. Photos with missing or
/// out-of-range fields come back as [`MalformedRecord`] in their slot and do
/// not consume a name.
pub fn assign_names(raws: &[RawPhoto]) -> Result<Vec<Named>, SizeDataError> {
    let (_, named) = raws.iter().enumerate().try_fold(
        (Ledger::default(), Vec::with_capacity(raws.len())),
        |(mut ledger, mut named), (index, raw)| {
            let (url, kind) = select_largest(&raw.sizes).map_err(|source| SizeDataError {
                index,
                photo_id: raw.id,
                source,
            })?;

            let record = validate(raw).map(|(likes, captured_at)| {
                let base = if ledger.seen_likes.insert(likes) {
                    likes.to_string()
                } else {
                    format!("{likes}_{}", captured_at.format(DATE_SUFFIX_FORMAT))
                };
                let file_name = ledger.reserve(base);
                ExportRecord::new(file_name, kind, likes, captured_at, url.to_string())
            });

            named.push(record.map_err(|reason| {
                tracing::warn!(index, photo_id = ?raw.id, "Skipping photo: {}", reason);
                MalformedRecord {
                    index,
                    photo_id: raw.id,
                    reason,
                }
            }));
            Ok::<_, SizeDataError>((ledger, named))
        },
    )?;
    Ok(named)
}

fn validate(raw: &RawPhoto) -> Result<(u64, DateTime<Utc>), MalformedReason> {
    let likes = raw.like_count().ok_or(MalformedReason::MissingLikes)?;
    let ts = raw.date.ok_or(MalformedReason::MissingDate)?;
    let captured_at = Utc
        .timestamp_opt(ts, 0)
        .single()
        .ok_or(MalformedReason::DateOutOfRange(ts))?;
    Ok((likes, captured_at))
}
