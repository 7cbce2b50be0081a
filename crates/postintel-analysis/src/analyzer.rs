//! End-to-end analysis of one stored post.

use sqlx::PgPool;

use postintel_core::{ApiKeys, AppConfig, PostKind};
use postintel_db::{get_post_by_external_id, upsert_extraction, NewExtraction, PostRow};

use crate::llm::{CompletionClient, MediaAttachment};
use crate::parse::parse;
use crate::templates::{build_prompt, TemplateKind};
use crate::AnalysisError;

/// What one analysis run produced.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub extraction_id: i64,
    pub external_id: String,
    pub kind: PostKind,
    pub template: TemplateKind,
}

/// Runs a stored post through the completion endpoint and persists the
/// parsed extraction.
#[derive(Debug)]
pub struct Analyzer {
    pool: PgPool,
    client: CompletionClient,
}

impl Analyzer {
    #[must_use]
    pub fn new(pool: PgPool, client: CompletionClient) -> Self {
        Self { pool, client }
    }

    /// Builds the analyzer from configuration and a key snapshot.
    #[must_use]
    pub fn from_config(pool: PgPool, config: &AppConfig, keys: &ApiKeys) -> Self {
        let client = CompletionClient::new(
            &config.llm_base_url,
            &keys.analysis_api_key,
            &config.analysis_model,
            config.analysis_request_timeout_secs,
        );
        Self::new(pool, client)
    }

    /// Analyzes the post with the given upstream id for one user.
    ///
    /// Loads the stored post and its media blobs, renders the template
    /// matching the post's kind, runs the completion, parses the response,
    /// and upserts the extraction keyed on `(user_id, external_id)`.
    /// Re-running replaces the previous extraction.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownPost`] when no post matches,
    /// [`AnalysisError::UnsupportedKind`] for mixed galleries and unknown
    /// stored kinds, [`AnalysisError::MissingMedia`] when the post carries
    /// no usable media payload, and completion or database errors
    /// otherwise.
    pub async fn analyze_post(
        &self,
        user_id: i64,
        external_id: &str,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let post = get_post_by_external_id(&self.pool, external_id)
            .await?
            .ok_or_else(|| AnalysisError::UnknownPost {
                external_id: external_id.to_owned(),
            })?;

        let kind =
            PostKind::from_code(&post.kind).ok_or_else(|| AnalysisError::UnsupportedKind {
                kind: post.kind.clone(),
            })?;
        let template = TemplateKind::for_post(kind)?;
        let media = collect_media(&post, kind)?;

        tracing::info!(
            external_id,
            kind = %kind,
            attachments = media.len(),
            "running post analysis"
        );

        let prompt = build_prompt(template, &post.caption);
        let response = self.client.complete(&prompt, &media).await?;
        let fields = parse(template, &response);

        let record = NewExtraction {
            user_id,
            external_id: post.external_id.clone(),
            kind: post.kind.clone(),
            summary: fields.summary,
            success_factors: fields.success_factors,
            strategy_note: fields.strategy_note,
            copy_text: fields.copy_text,
            prompt: fields.prompt,
            prompt_sequence: fields.prompt_sequence,
        };
        let extraction_id = upsert_extraction(&self.pool, &record).await?;

        Ok(AnalysisOutcome {
            extraction_id,
            external_id: post.external_id,
            kind,
            template,
        })
    }
}

/// Assembles the media attachments for a stored post.
///
/// Image posts attach the cover blob; galleries attach the cover first and
/// then every child image in stored order, skipping failed downloads;
/// video posts attach the video blob.
fn collect_media(post: &PostRow, kind: PostKind) -> Result<Vec<MediaAttachment>, AnalysisError> {
    let missing = || AnalysisError::MissingMedia {
        external_id: post.external_id.clone(),
    };

    match kind {
        PostKind::Image => {
            let blob = post.display_blob.clone().ok_or_else(missing)?;
            Ok(vec![MediaAttachment::image(blob)])
        }
        PostKind::Gallery => {
            let mut media = Vec::new();
            if let Some(blob) = post.display_blob.clone() {
                media.push(MediaAttachment::image(blob));
            }
            if let Some(serde_json::Value::Array(blobs)) = &post.image_blobs {
                for entry in blobs {
                    if let serde_json::Value::String(blob) = entry {
                        media.push(MediaAttachment::image(blob.clone()));
                    }
                }
            }
            if media.is_empty() {
                return Err(missing());
            }
            Ok(media)
        }
        PostKind::Video => {
            let blob = post.video_blob.clone().ok_or_else(missing)?;
            Ok(vec![MediaAttachment::video(blob)])
        }
        // Rejected earlier by template selection.
        PostKind::MixedGallery => Err(AnalysisError::UnsupportedKind {
            kind: kind.as_code().to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn post_row(kind: &str) -> PostRow {
        PostRow {
            id: 1,
            external_id: "3519".to_owned(),
            kind: kind.to_owned(),
            short_code: None,
            url: None,
            input_url: None,
            caption: "caption".to_owned(),
            alt: None,
            hashtags: json!([]),
            mentions: json!([]),
            comments_count: 0,
            likes_count: 0,
            video_view_count: 0,
            video_play_count: 0,
            video_duration: None,
            first_comment: None,
            dimensions_height: None,
            dimensions_width: None,
            display_url: None,
            display_blob: None,
            video_url: None,
            video_blob: None,
            image_blobs: None,
            child_video_urls: None,
            child_video_blobs: None,
            child_order: None,
            owner_id: None,
            owner_username: None,
            owner_full_name: None,
            caption_translated: None,
            alt_translated: None,
            owner_full_name_translated: None,
            hashtags_translated: None,
            first_comment_translated: None,
            posted_at: None,
            is_pinned: false,
            is_sponsored: false,
            product_type: None,
            competitor_id: None,
            search_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn image_post_attaches_the_cover() {
        let mut post = post_row("Image");
        post.display_blob = Some("Y292ZXI=".to_owned());
        let media = collect_media(&post, PostKind::Image).unwrap();
        assert_eq!(media.len(), 1);
        assert_eq!(media[0].mime_type, "image/jpeg");
        assert_eq!(media[0].data_base64, "Y292ZXI=");
    }

    #[test]
    fn image_post_without_cover_is_missing_media() {
        let post = post_row("Image");
        let err = collect_media(&post, PostKind::Image).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingMedia { .. }));
    }

    #[test]
    fn gallery_attaches_cover_then_children_skipping_failures() {
        let mut post = post_row("Sidecar");
        post.display_blob = Some("Y292ZXI=".to_owned());
        post.image_blobs = Some(json!(["YQ==", null, "Yg=="]));
        let media = collect_media(&post, PostKind::Gallery).unwrap();
        let blobs: Vec<&str> = media.iter().map(|m| m.data_base64.as_str()).collect();
        assert_eq!(blobs, ["Y292ZXI=", "YQ==", "Yg=="]);
    }

    #[test]
    fn gallery_with_no_usable_images_is_missing_media() {
        let mut post = post_row("Sidecar");
        post.image_blobs = Some(json!([null, null]));
        let err = collect_media(&post, PostKind::Gallery).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingMedia { .. }));
    }

    #[test]
    fn video_post_attaches_the_video_blob() {
        let mut post = post_row("Video");
        post.video_blob = Some("dmlkZW8=".to_owned());
        let media = collect_media(&post, PostKind::Video).unwrap();
        assert_eq!(media.len(), 1);
        assert_eq!(media[0].mime_type, "video/mp4");
    }
}
