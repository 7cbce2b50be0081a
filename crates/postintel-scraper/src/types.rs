//! Collector dataset item types.
//!
//! ## Observed shape from live collector runs
//!
//! Every field is optional or defaulted: dataset items come from a
//! third-party actor scraping a hostile upstream, and fields routinely go
//! missing or change type between runs. Nothing here is trusted past
//! deserialization; `normalize` maps items into explicit domain types.
//!
//! ### `type`
//! `"Image"`, `"Video"`, or `"Sidecar"` for multi-item posts. Children carry
//! their own `type` with the same vocabulary. Unrecognized values have been
//! observed and must not fail the run.
//!
//! ### `latestComments`
//! Usually a list of `{ "text": ... }` objects, but plain strings appear in
//! older dataset snapshots. Modeled as an untagged enum.
//!
//! ### `externalUrls`
//! A list of link objects whose shape varies by account type; passed through
//! verbatim as JSON.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One post item from a collector dataset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPost {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub short_code: Option<String>,
    pub url: Option<String>,
    pub input_url: Option<String>,
    pub caption: Option<String>,
    pub alt: Option<String>,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub comments_count: i64,
    pub likes_count: i64,
    pub video_view_count: i64,
    pub video_play_count: i64,
    pub video_duration: Option<f64>,
    pub first_comment: Option<String>,
    pub latest_comments: Vec<RawComment>,
    pub dimensions_height: Option<i64>,
    pub dimensions_width: Option<i64>,
    pub display_url: Option<String>,
    pub video_url: Option<String>,
    pub child_posts: Vec<RawChild>,
    pub owner_id: Option<String>,
    pub owner_username: Option<String>,
    pub owner_full_name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub is_pinned: bool,
    pub is_sponsored: bool,
    pub product_type: Option<String>,
}

/// One child item inside a composite (`Sidecar`) post.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawChild {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub short_code: Option<String>,
    pub display_url: Option<String>,
    pub video_url: Option<String>,
    pub video_view_count: Option<i64>,
    pub video_duration: Option<f64>,
}

/// A comment entry; either a bare string or an object with a `text` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawComment {
    Text(String),
    Detailed { text: Option<String> },
}

impl RawComment {
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            RawComment::Text(s) => Some(s),
            RawComment::Detailed { text } => text.as_deref(),
        }
    }
}

/// An account-details item from a collector dataset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawProfile {
    pub id: Option<String>,
    pub username: Option<String>,
    pub url: Option<String>,
    pub input_url: Option<String>,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub profile_pic_url: Option<String>,
    pub external_urls: Vec<serde_json::Value>,
    pub followers_count: i64,
    pub follows_count: i64,
    pub posts_count: i64,
    pub highlight_reel_count: i64,
    pub has_channel: bool,
}

/// A URL-only item from the keyword discovery pass.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawUrlItem {
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_post_tolerates_empty_object() {
        let post: RawPost = serde_json::from_str("{}").unwrap();
        assert!(post.id.is_none());
        assert!(post.child_posts.is_empty());
        assert_eq!(post.likes_count, 0);
        assert!(!post.is_pinned);
    }

    #[test]
    fn raw_post_reads_camel_case_fields() {
        let post: RawPost = serde_json::from_str(
            r#"{
                "id": "333",
                "type": "Sidecar",
                "shortCode": "AbC",
                "likesCount": 7,
                "childPosts": [{"type": "Video", "videoUrl": "https://v/1.mp4"}]
            }"#,
        )
        .unwrap();
        assert_eq!(post.id.as_deref(), Some("333"));
        assert_eq!(post.item_type.as_deref(), Some("Sidecar"));
        assert_eq!(post.short_code.as_deref(), Some("AbC"));
        assert_eq!(post.likes_count, 7);
        assert_eq!(post.child_posts.len(), 1);
        assert_eq!(
            post.child_posts[0].video_url.as_deref(),
            Some("https://v/1.mp4")
        );
    }

    #[test]
    fn latest_comments_accept_both_shapes() {
        let post: RawPost = serde_json::from_str(
            r#"{"latestComments": ["plain", {"text": "detailed"}, {"ownerUsername": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(post.latest_comments[0].text(), Some("plain"));
        assert_eq!(post.latest_comments[1].text(), Some("detailed"));
        assert_eq!(post.latest_comments[2].text(), None);
    }
}
