//! Wire types for `photos.get`.
//!
//! Per-photo fields are optional and shape-tolerant: a field of the wrong type
//! reads as absent, so one odd item is reported on its own instead of failing
//! the whole page.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top-level envelope: VK answers with exactly one of `response` or `error`.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub response: Option<PhotosPage>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error_code: i64,
    #[serde(default)]
    pub error_msg: String,
}

/// One page of an album listing. `count` is the album total, not the page size.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotosPage {
    pub count: u64,
    #[serde(default, deserialize_with = "self::lenient_items")]
    pub items: Vec<RawPhoto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Likes {
    pub count: u64,
}

/// A photo as returned by the source service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawPhoto {
    #[serde(default, deserialize_with = "self::lenient")]
    pub id: Option<i64>,
    /// Capture time, unix seconds.
    #[serde(default, deserialize_with = "self::lenient")]
    pub date: Option<i64>,
    #[serde(default, deserialize_with = "self::lenient")]
    pub likes: Option<Likes>,
    #[serde(default, deserialize_with = "self::lenient_sizes")]
    pub sizes: Vec<SizeVariant>,
}

impl RawPhoto {
    pub fn like_count(&self) -> Option<u64> {
        self.likes.as_ref().map(|l| l.count)
    }
}

/// One stored copy of a photo. `kind` is VK's size type letter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SizeVariant {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// `Some(T)` when the value has the expected shape, `None` otherwise.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// An item that is not even an object becomes an empty photo, keeping the
/// positions of the rest.
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<RawPhoto>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| RawPhoto::deserialize(item).unwrap_or_default())
        .collect())
}

/// Keep the well-formed variants; anything else in the list is dropped.
fn lenient_sizes<'de, D>(deserializer: D) -> Result<Vec<SizeVariant>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| SizeVariant::deserialize(item).ok())
        .collect())
}
