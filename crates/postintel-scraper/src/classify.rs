//! Post classification and child media planning.
//!
//! Classification is pure: it reads one raw item and produces the post kind,
//! the order-tracking slot list, and the media URLs to fetch. The actual
//! downloads happen later; a failed download fills its reserved array
//! position with a placeholder and never disturbs the slots planned here.

use postintel_core::{ChildKind, ChildSlot, PostKind};

use crate::types::RawPost;

/// Output of classifying one raw item.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: PostKind,
    /// One slot per raw child, in original scrape order. Empty for
    /// single-media posts.
    pub slots: Vec<ChildSlot>,
    /// Image URLs to fetch, in child order; `slots[i].media_ref` indexes
    /// into the resulting image array.
    pub image_urls: Vec<String>,
    /// Video URLs to fetch, in child order; `slots[i].media_ref` indexes
    /// into the resulting video array.
    pub video_urls: Vec<String>,
}

impl Classification {
    fn single(kind: PostKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            image_urls: Vec::new(),
            video_urls: Vec::new(),
        }
    }
}

/// Classifies a raw item and plans its child media fetches.
///
/// The upstream label decides the base kind; anything unrecognized is
/// treated as a plain image post (cover only). A `Sidecar` scans its
/// children in order: the presence of any video child upgrades the whole
/// post to the mixed-gallery kind, whether or not that child carries a
/// fetchable URL. Children of unknown type keep their positional slot but
/// join neither media sequence.
///
/// Never fails; hostile input degrades, it does not error.
#[must_use]
pub fn classify(raw: &RawPost) -> Classification {
    match raw.item_type.as_deref() {
        Some("Video") => Classification::single(PostKind::Video),
        Some("Sidecar") => classify_gallery(raw),
        _ => Classification::single(PostKind::Image),
    }
}

fn classify_gallery(raw: &RawPost) -> Classification {
    let mut out = Classification::single(PostKind::Gallery);

    for (index, child) in raw.child_posts.iter().enumerate() {
        match child.item_type.as_deref() {
            Some("Video") => {
                out.kind = PostKind::MixedGallery;
                let media_ref = child.video_url.as_ref().map(|url| {
                    out.video_urls.push(url.clone());
                    out.video_urls.len() - 1
                });
                out.slots.push(ChildSlot {
                    index,
                    kind: ChildKind::Video,
                    media_ref,
                    short_code: child.short_code.clone(),
                    video_view_count: child.video_view_count,
                    video_duration: child.video_duration,
                });
            }
            Some("Image") => {
                let media_ref = child.display_url.as_ref().map(|url| {
                    out.image_urls.push(url.clone());
                    out.image_urls.len() - 1
                });
                out.slots.push(ChildSlot {
                    index,
                    kind: ChildKind::Image,
                    media_ref,
                    short_code: child.short_code.clone(),
                    video_view_count: None,
                    video_duration: None,
                });
            }
            other => {
                out.slots.push(ChildSlot {
                    index,
                    kind: ChildKind::Unknown(other.unwrap_or("").to_owned()),
                    media_ref: None,
                    short_code: child.short_code.clone(),
                    video_view_count: None,
                    video_duration: None,
                });
            }
        }
    }

    out
}
