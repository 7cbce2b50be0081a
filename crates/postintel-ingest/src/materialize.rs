//! Full materialization of one raw unit into a [`NormalizedPost`].
//!
//! This is the shared ingestion path for both refresh and keyword-search
//! runs: classify, download media, normalize. Child downloads within one
//! post run through a small bounded pool; `buffered` yields results in
//! submission order, so array positions always line up with the slot list's
//! `media_ref` back-references.

use futures::stream::{self, StreamExt};
use postintel_core::{MediaBlob, NormalizedChildren, NormalizedPost, PostKind};
use postintel_scraper::{classify, normalize_post, MediaKind, MediaMaterializer, RawPost, ScraperError};

/// Classifies `raw`, downloads its media, and maps it into the domain.
///
/// Media failures degrade to placeholders inside the materializer; the only
/// error path here is a unit without an external id.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] when the unit has no id.
pub async fn materialize_post(
    materializer: &MediaMaterializer,
    raw: RawPost,
    child_fetch_concurrency: usize,
) -> Result<NormalizedPost, ScraperError> {
    let classification = classify(&raw);

    let display_media = match raw.display_url.as_deref() {
        Some(url) => materializer.materialize(url, MediaKind::Image).await,
        None => MediaBlob::Unavailable,
    };

    let video_media = match (classification.kind, raw.video_url.as_deref()) {
        (PostKind::Video, Some(url)) => materializer.materialize(url, MediaKind::Video).await,
        _ => MediaBlob::Unavailable,
    };

    let images = fetch_all(
        materializer,
        &classification.image_urls,
        MediaKind::Image,
        child_fetch_concurrency,
    )
    .await;
    let videos = fetch_all(
        materializer,
        &classification.video_urls,
        MediaKind::Video,
        child_fetch_concurrency,
    )
    .await;

    let children = NormalizedChildren {
        images,
        videos,
        video_urls: classification.video_urls,
        order: classification.slots,
    };

    normalize_post(raw, classification.kind, display_media, video_media, children)
}

async fn fetch_all(
    materializer: &MediaMaterializer,
    urls: &[String],
    kind: MediaKind,
    concurrency: usize,
) -> Vec<MediaBlob> {
    stream::iter(urls.to_vec())
        .map(|url| async move { materializer.materialize(&url, kind).await })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

#[cfg(test)]
#[path = "materialize_test.rs"]
mod tests;
