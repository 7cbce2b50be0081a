//! Normalized domain types shared across the scraper, ingest, and db crates.
//!
//! Raw scraped items are mapped into these structs exactly once, at the
//! scraper boundary; everything downstream works with explicit fields and
//! defaults rather than loose JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical post kind.
///
/// The wire/database codes keep the upstream source's vocabulary
/// (`Sidecar` for a multi-item gallery, `Sidecar_video` for a gallery that
/// contains at least one video child). `MixedGallery` is only ever reached
/// by upgrading a `Gallery` during classification; stored records are never
/// downgraded in place — only a full overwrite with new children can change
/// the kind back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    Image,
    Video,
    Gallery,
    MixedGallery,
}

impl PostKind {
    #[must_use]
    pub fn as_code(self) -> &'static str {
        match self {
            PostKind::Image => "Image",
            PostKind::Video => "Video",
            PostKind::Gallery => "Sidecar",
            PostKind::MixedGallery => "Sidecar_video",
        }
    }

    /// Parse a wire/database code. Unknown codes map to `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Image" => Some(PostKind::Image),
            "Video" => Some(PostKind::Video),
            "Sidecar" => Some(PostKind::Gallery),
            "Sidecar_video" => Some(PostKind::MixedGallery),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

/// The declared type of one child item inside a composite post.
///
/// Unknown types keep their position slot in the order-tracking list but are
/// excluded from both the image and video media sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChildKind {
    Image,
    Video,
    Unknown(String),
}

impl From<String> for ChildKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Image" => ChildKind::Image,
            "Video" => ChildKind::Video,
            _ => ChildKind::Unknown(s),
        }
    }
}

impl From<ChildKind> for String {
    fn from(kind: ChildKind) -> Self {
        match kind {
            ChildKind::Image => "Image".to_string(),
            ChildKind::Video => "Video".to_string(),
            ChildKind::Unknown(s) => s,
        }
    }
}

/// An inline media payload: base64-encoded bytes, or a placeholder when the
/// fetch failed or was rejected (oversize, non-2xx, network error).
///
/// Serializes as the base64 string or `null`, matching the persisted JSON
/// arrays where a failed child download occupies its slot as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum MediaBlob {
    Available(String),
    Unavailable,
}

impl MediaBlob {
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, MediaBlob::Available(_))
    }

    #[must_use]
    pub fn as_base64(&self) -> Option<&str> {
        match self {
            MediaBlob::Available(b64) => Some(b64),
            MediaBlob::Unavailable => None,
        }
    }
}

impl From<Option<String>> for MediaBlob {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(b64) => MediaBlob::Available(b64),
            None => MediaBlob::Unavailable,
        }
    }
}

impl From<MediaBlob> for Option<String> {
    fn from(blob: MediaBlob) -> Self {
        match blob {
            MediaBlob::Available(b64) => Some(b64),
            MediaBlob::Unavailable => None,
        }
    }
}

/// Order-tracking entry for one child of a composite post.
///
/// `index` is the child's original scrape position and must never shift,
/// even when its media download fails — downstream consumers address
/// children positionally. `media_ref` is a positional offset into the
/// parent's image or video blob array (depending on `kind`); it is a
/// back-reference, not ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSlot {
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: ChildKind,
    #[serde(rename = "ref")]
    pub media_ref: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_view_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_duration: Option<f64>,
}

/// Materialized media for a composite post, with the order-tracking list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedChildren {
    /// Image blobs in child order; failed downloads hold `Unavailable`.
    pub images: Vec<MediaBlob>,
    /// Video blobs in child order; failed downloads hold `Unavailable`.
    pub videos: Vec<MediaBlob>,
    /// Source URLs of the video children, parallel to `videos`.
    pub video_urls: Vec<String>,
    /// One slot per raw child, in original scrape order.
    pub order: Vec<ChildSlot>,
}

/// A fully normalized, materialized post ready for persistence.
///
/// Every optional upstream field has an explicit default here; the raw
/// scraped item is never carried past the scraper boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPost {
    pub external_id: String,
    pub kind: PostKind,
    pub short_code: Option<String>,
    pub url: Option<String>,
    pub input_url: Option<String>,
    pub caption: String,
    pub alt: Option<String>,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub comments_count: i64,
    pub likes_count: i64,
    pub video_view_count: i64,
    pub video_play_count: i64,
    pub video_duration: Option<f64>,
    pub first_comment: Option<String>,
    pub dimensions_height: Option<i64>,
    pub dimensions_width: Option<i64>,
    pub display_url: Option<String>,
    /// Cover image, materialized.
    pub display_media: MediaBlob,
    pub video_url: Option<String>,
    /// Single-video payload, materialized (Video kind only).
    pub video_media: MediaBlob,
    pub children: NormalizedChildren,
    pub owner_id: Option<String>,
    pub owner_username: Option<String>,
    pub owner_full_name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub is_pinned: bool,
    pub is_sponsored: bool,
    pub product_type: Option<String>,
}

/// Where a post came from. Exactly one origin is set per record; the
/// store enforces the exclusivity at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrigin {
    Competitor { competitor_id: i64 },
    Search { search_id: i64 },
}

impl PostOrigin {
    #[must_use]
    pub fn competitor_id(self) -> Option<i64> {
        match self {
            PostOrigin::Competitor { competitor_id } => Some(competitor_id),
            PostOrigin::Search { .. } => None,
        }
    }

    #[must_use]
    pub fn search_id(self) -> Option<i64> {
        match self {
            PostOrigin::Search { search_id } => Some(search_id),
            PostOrigin::Competitor { .. } => None,
        }
    }
}
