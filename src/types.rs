//! Shared record types consumed by every stage of the gallery.
//!
//! These mirror the records the external data service hands us. They are
//! immutable from the gallery's point of view: layout, viewer and generation
//! only ever read them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Aspect ratio used when a photo's intrinsic dimensions are unknown.
pub const FALLBACK_ASPECT_RATIO: f64 = 1.5;

/// Opaque, comparable record identifier.
///
/// The data service emits ids as JSON numbers or strings depending on the
/// table; both normalize to the same textual form so `7` and `"7"` compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct RecordId(String);

pub type PhotoId = RecordId;
pub type CategoryId = RecordId;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl From<RawId> for RecordId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        }
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A photo record.
///
/// `width` and `height` are the intrinsic pixel dimensions when known. The
/// catalog boundary turns non-positive or unparseable values into `None`, but
/// [`Photo::aspect_ratio`] still guards against zeros so hand-built records
/// degrade the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    /// Display name; empty when the photographer never set one.
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(
        default,
        alias = "categoryId",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<CategoryId>,
}

impl Photo {
    /// Width divided by height, or [`FALLBACK_ASPECT_RATIO`] when either
    /// dimension is missing or zero.
    pub fn aspect_ratio(&self) -> f64 {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => w as f64 / h as f64,
            _ => FALLBACK_ASPECT_RATIO,
        }
    }

    /// Whether both intrinsic dimensions are known and positive.
    pub fn has_dimensions(&self) -> bool {
        matches!((self.width, self.height), (Some(w), Some(h)) if w > 0 && h > 0)
    }

    /// Alt text for rendering: the display name, or a generic label.
    pub fn alt_text(&self) -> &str {
        if self.name.trim().is_empty() {
            "Photo"
        } else {
            &self.name
        }
    }
}

/// A photo category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
