use serde::Serialize;
use thiserror::Error;

use super::responses::SizeVariant;

/// The ten VK size types that carry a proportional copy of the photo,
/// declared largest first, so `Ord` ranks the biggest copy lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeKind {
    W,
    Z,
    Y,
    X,
    R,
    Q,
    P,
    O,
    M,
    S,
}

/// Selection order, largest to smallest.
pub const PRIORITY: [SizeKind; 10] = [
    SizeKind::W,
    SizeKind::Z,
    SizeKind::Y,
    SizeKind::X,
    SizeKind::R,
    SizeKind::Q,
    SizeKind::P,
    SizeKind::O,
    SizeKind::M,
    SizeKind::S,
];

impl SizeKind {
    pub fn code(&self) -> &'static str {
        match self {
            SizeKind::W => "w",
            SizeKind::Z => "z",
            SizeKind::Y => "y",
            SizeKind::X => "x",
            SizeKind::R => "r",
            SizeKind::Q => "q",
            SizeKind::P => "p",
            SizeKind::O => "o",
            SizeKind::M => "m",
            SizeKind::S => "s",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        PRIORITY.into_iter().find(|k| k.code() == code)
    }
}

impl std::fmt::Display for SizeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.code())
    }
}

/// None of a photo's variants has a known size type. Points at an upstream
/// schema change, so callers treat it as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no size variant of a known type (available: [{}])", .available.join(", "))]
pub struct MalformedSizeData {
    pub available: Vec<String>,
}

/// Pick the URL of the largest variant by [`PRIORITY`], ignoring input order.
pub fn select_largest(sizes: &[SizeVariant]) -> Result<(&str, SizeKind), MalformedSizeData> {
    sizes
        .iter()
        .filter_map(|v| SizeKind::from_code(&v.kind).map(|kind| (v.url.as_str(), kind)))
        .min_by_key(|&(_, kind)| kind)
        .ok_or_else(|| MalformedSizeData {
            available: sizes.iter().map(|v| v.kind.clone()).collect(),
        })
}
