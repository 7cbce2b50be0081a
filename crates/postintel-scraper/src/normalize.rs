//! Raw item to domain mapping.
//!
//! `normalize_post` is the only place a raw scraped item crosses into the
//! domain model. The mapping is total over optional fields: everything the
//! upstream may omit gets an explicit default here, so downstream code never
//! sees loose JSON or re-defaults anything.

use postintel_core::{MediaBlob, NormalizedChildren, NormalizedPost, PostKind};

use crate::error::ScraperError;
use crate::types::{RawPost, RawProfile};

/// Profile fields mapped out of a raw details item.
#[derive(Debug, Clone)]
pub struct NormalizedProfile {
    pub external_id: Option<String>,
    pub username: Option<String>,
    pub url: Option<String>,
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

/// Maps a raw details item into a [`NormalizedProfile`].
#[must_use]
pub fn normalize_profile(raw: RawProfile) -> NormalizedProfile {
    NormalizedProfile {
        external_id: raw.id,
        username: raw.username,
        url: raw.url,
        full_name: raw.full_name,
        biography: raw.biography,
        profile_pic_url: raw.profile_pic_url,
        external_urls: raw.external_urls,
        followers_count: raw.followers_count,
        follows_count: raw.follows_count,
        posts_count: raw.posts_count,
        highlight_reel_count: raw.highlight_reel_count,
        has_channel: raw.has_channel,
    }
}

/// Maps a raw item plus its materialized media into a [`NormalizedPost`].
///
/// `kind` comes from classification and `children` from the child fetch
/// pass; both are produced from the same raw item by the caller.
///
/// The first comment prefers the item's own `firstComment` field, falling
/// back to the first entry of `latestComments`.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] when the item has no `id`; a
/// record without a stable external id cannot be deduplicated or stored.
pub fn normalize_post(
    raw: RawPost,
    kind: PostKind,
    display_media: MediaBlob,
    video_media: MediaBlob,
    children: NormalizedChildren,
) -> Result<NormalizedPost, ScraperError> {
    let external_id = raw.id.ok_or_else(|| ScraperError::Normalization {
        reason: "dataset item has no id".to_owned(),
    })?;

    let first_comment = raw.first_comment.or_else(|| {
        raw.latest_comments
            .first()
            .and_then(|comment| comment.text().map(str::to_owned))
    });

    Ok(NormalizedPost {
        external_id,
        kind,
        short_code: raw.short_code,
        url: raw.url,
        input_url: raw.input_url,
        caption: raw.caption.unwrap_or_default(),
        alt: raw.alt,
        hashtags: raw.hashtags,
        mentions: raw.mentions,
        comments_count: raw.comments_count,
        likes_count: raw.likes_count,
        video_view_count: raw.video_view_count,
        video_play_count: raw.video_play_count,
        video_duration: raw.video_duration,
        first_comment,
        dimensions_height: raw.dimensions_height,
        dimensions_width: raw.dimensions_width,
        display_url: raw.display_url,
        display_media,
        video_url: raw.video_url,
        video_media,
        children,
        owner_id: raw.owner_id,
        owner_username: raw.owner_username,
        owner_full_name: raw.owner_full_name,
        timestamp: raw.timestamp,
        is_pinned: raw.is_pinned,
        is_sponsored: raw.is_sponsored,
        product_type: raw.product_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawComment;

    #[test]
    fn missing_id_is_a_normalization_error() {
        let result = normalize_post(
            RawPost::default(),
            PostKind::Image,
            MediaBlob::Unavailable,
            MediaBlob::Unavailable,
            NormalizedChildren::default(),
        );
        assert!(matches!(result, Err(ScraperError::Normalization { .. })));
    }

    #[test]
    fn optional_fields_default_instead_of_failing() {
        let raw = RawPost {
            id: Some("p1".to_owned()),
            ..RawPost::default()
        };
        let post = normalize_post(
            raw,
            PostKind::Image,
            MediaBlob::Unavailable,
            MediaBlob::Unavailable,
            NormalizedChildren::default(),
        )
        .unwrap();

        assert_eq!(post.external_id, "p1");
        assert_eq!(post.caption, "");
        assert!(post.hashtags.is_empty());
        assert_eq!(post.likes_count, 0);
        assert!(!post.is_pinned);
        assert_eq!(post.first_comment, None);
    }

    #[test]
    fn first_comment_prefers_explicit_field() {
        let raw = RawPost {
            id: Some("p1".to_owned()),
            first_comment: Some("pinned comment".to_owned()),
            latest_comments: vec![RawComment::Text("newer comment".to_owned())],
            ..RawPost::default()
        };
        let post = normalize_post(
            raw,
            PostKind::Image,
            MediaBlob::Unavailable,
            MediaBlob::Unavailable,
            NormalizedChildren::default(),
        )
        .unwrap();
        assert_eq!(post.first_comment.as_deref(), Some("pinned comment"));
    }

    #[test]
    fn first_comment_falls_back_to_latest_comments() {
        let raw = RawPost {
            id: Some("p1".to_owned()),
            latest_comments: vec![RawComment::Detailed {
                text: Some("from the feed".to_owned()),
            }],
            ..RawPost::default()
        };
        let post = normalize_post(
            raw,
            PostKind::Image,
            MediaBlob::Unavailable,
            MediaBlob::Unavailable,
            NormalizedChildren::default(),
        )
        .unwrap();
        assert_eq!(post.first_comment.as_deref(), Some("from the feed"));
    }
}
