use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::RequestId;
use crate::state::AppState;

use super::{map_db_error, ApiError, ApiResponse, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct CompetitorItem {
    id: i64,
    external_id: Option<String>,
    username: String,
    url: Option<String>,
    full_name: Option<String>,
    full_name_translated: Option<String>,
    biography: Option<String>,
    biography_translated: Option<String>,
    profile_pic_url: Option<String>,
    has_avatar: bool,
    external_urls: serde_json::Value,
    followers_count: i64,
    follows_count: i64,
    posts_count: i64,
    highlight_reel_count: i64,
    has_channel: bool,
    updated_at: DateTime<Utc>,
}

impl From<postintel_db::CompetitorRow> for CompetitorItem {
    fn from(row: postintel_db::CompetitorRow) -> Self {
        Self {
            id: row.id,
            external_id: row.external_id,
            username: row.username,
            url: row.url,
            full_name: row.full_name,
            full_name_translated: row.full_name_translated,
            biography: row.biography,
            biography_translated: row.biography_translated,
            profile_pic_url: row.profile_pic_url,
            has_avatar: row.profile_pic_blob.is_some(),
            external_urls: row.external_urls,
            followers_count: row.followers_count,
            follows_count: row.follows_count,
            posts_count: row.posts_count,
            highlight_reel_count: row.highlight_reel_count,
            has_channel: row.has_channel,
            updated_at: row.updated_at,
        }
    }
}

/// Stored-post summary for list endpoints. Media blobs stay out of list
/// responses; presence flags tell the client what was materialized.
#[derive(Debug, Serialize)]
pub(super) struct PostItem {
    id: i64,
    external_id: String,
    kind: String,
    short_code: Option<String>,
    url: Option<String>,
    caption: String,
    caption_translated: Option<String>,
    hashtags: serde_json::Value,
    hashtags_translated: Option<serde_json::Value>,
    mentions: serde_json::Value,
    comments_count: i64,
    likes_count: i64,
    video_view_count: i64,
    video_play_count: i64,
    video_duration: Option<f64>,
    first_comment: Option<String>,
    first_comment_translated: Option<String>,
    display_url: Option<String>,
    has_display_media: bool,
    video_url: Option<String>,
    has_video_media: bool,
    child_count: usize,
    owner_username: Option<String>,
    posted_at: Option<DateTime<Utc>>,
    is_pinned: bool,
    is_sponsored: bool,
    competitor_id: Option<i64>,
    search_id: Option<i64>,
    updated_at: DateTime<Utc>,
}

impl From<postintel_db::PostRow> for PostItem {
    fn from(row: postintel_db::PostRow) -> Self {
        let child_count = row
            .child_order
            .as_ref()
            .and_then(serde_json::Value::as_array)
            .map_or(0, Vec::len);
        Self {
            id: row.id,
            external_id: row.external_id,
            kind: row.kind,
            short_code: row.short_code,
            url: row.url,
            caption: row.caption,
            caption_translated: row.caption_translated,
            hashtags: row.hashtags,
            hashtags_translated: row.hashtags_translated,
            mentions: row.mentions,
            comments_count: row.comments_count,
            likes_count: row.likes_count,
            video_view_count: row.video_view_count,
            video_play_count: row.video_play_count,
            video_duration: row.video_duration,
            first_comment: row.first_comment,
            first_comment_translated: row.first_comment_translated,
            display_url: row.display_url,
            has_display_media: row.display_blob.is_some(),
            video_url: row.video_url,
            has_video_media: row.video_blob.is_some(),
            child_count,
            owner_username: row.owner_username,
            posted_at: row.posted_at,
            is_pinned: row.is_pinned,
            is_sponsored: row.is_sponsored,
            competitor_id: row.competitor_id,
            search_id: row.search_id,
            updated_at: row.updated_at,
        }
    }
}

pub(super) async fn list_competitors(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<CompetitorItem>>>, ApiError> {
    let rows = postintel_db::list_competitors(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(CompetitorItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_competitor_posts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<PostItem>>>, ApiError> {
    let competitor = postintel_db::get_competitor(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    if competitor.is_none() {
        return Err(ApiError::new(req_id.0, "not_found", "unknown competitor"));
    }

    let rows = postintel_db::list_posts_for_competitor(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(PostItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
