//! Database operations for the `posts` table.
//!
//! `external_id` is the dedup key. Re-ingesting a known id is an intentional
//! full overwrite: every mutable column is replaced by the incoming record in
//! a single atomic statement. Last write wins.

use chrono::{DateTime, Utc};
use postintel_core::{NormalizedPost, PostOrigin};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `posts` table.
///
/// The four `JSONB` child columns are `NULL` for single-media posts; for
/// composite posts they hold parallel arrays where a failed download keeps
/// its slot as JSON `null`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub external_id: String,
    /// Wire code: `Image`, `Video`, `Sidecar`, or `Sidecar_video`.
    pub kind: String,
    pub short_code: Option<String>,
    pub url: Option<String>,
    pub input_url: Option<String>,
    pub caption: String,
    pub alt: Option<String>,
    pub hashtags: serde_json::Value,
    pub mentions: serde_json::Value,
    pub comments_count: i64,
    pub likes_count: i64,
    pub video_view_count: i64,
    pub video_play_count: i64,
    pub video_duration: Option<f64>,
    pub first_comment: Option<String>,
    pub dimensions_height: Option<i64>,
    pub dimensions_width: Option<i64>,
    pub display_url: Option<String>,
    pub display_blob: Option<String>,
    pub video_url: Option<String>,
    pub video_blob: Option<String>,
    pub image_blobs: Option<serde_json::Value>,
    pub child_video_urls: Option<serde_json::Value>,
    pub child_video_blobs: Option<serde_json::Value>,
    pub child_order: Option<serde_json::Value>,
    pub owner_id: Option<String>,
    pub owner_username: Option<String>,
    pub owner_full_name: Option<String>,
    pub caption_translated: Option<String>,
    pub alt_translated: Option<String>,
    pub owner_full_name_translated: Option<String>,
    /// Translated hashtags, parallel to `hashtags`.
    pub hashtags_translated: Option<serde_json::Value>,
    pub first_comment_translated: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub is_pinned: bool,
    pub is_sponsored: bool,
    pub product_type: Option<String>,
    pub competitor_id: Option<i64>,
    pub search_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Translated copies of a post's user-facing text, written in a second pass
/// after the upsert. `None` fields preserve whatever the column holds.
#[derive(Debug, Clone, Default)]
pub struct PostTranslations {
    pub caption: Option<String>,
    pub alt: Option<String>,
    pub owner_full_name: Option<String>,
    /// One entry per hashtag, in `hashtags` order.
    pub hashtags: Option<Vec<String>>,
    pub first_comment: Option<String>,
}

const POST_COLUMNS: &str = "id, external_id, kind, short_code, url, input_url, caption, alt, \
     hashtags, mentions, comments_count, likes_count, video_view_count, video_play_count, \
     video_duration, first_comment, dimensions_height, dimensions_width, display_url, \
     display_blob, video_url, video_blob, image_blobs, child_video_urls, child_video_blobs, \
     child_order, owner_id, owner_username, owner_full_name, caption_translated, \
     alt_translated, owner_full_name_translated, hashtags_translated, \
     first_comment_translated, posted_at, is_pinned, is_sponsored, product_type, \
     competitor_id, search_id, created_at, updated_at";

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Upserts a post keyed on `external_id`.
///
/// Conflicts overwrite every mutable column, including the origin columns, so
/// a record re-ingested under a different origin moves to it. The table's
/// check constraint guarantees exactly one of `competitor_id` / `search_id`
/// is set.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Json`] if a child column cannot be serialized, or
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_post(
    pool: &PgPool,
    origin: PostOrigin,
    post: &NormalizedPost,
) -> Result<i64, DbError> {
    let hashtags = serde_json::to_value(&post.hashtags)?;
    let mentions = serde_json::to_value(&post.mentions)?;

    // Single-media posts carry no child arrays at all; composite posts
    // persist all four, even when some entries are null placeholders.
    let has_children = !post.children.order.is_empty();
    let image_blobs = has_children
        .then(|| serde_json::to_value(&post.children.images))
        .transpose()?;
    let child_video_urls = has_children
        .then(|| serde_json::to_value(&post.children.video_urls))
        .transpose()?;
    let child_video_blobs = has_children
        .then(|| serde_json::to_value(&post.children.videos))
        .transpose()?;
    let child_order = has_children
        .then(|| serde_json::to_value(&post.children.order))
        .transpose()?;

    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO posts \
             (external_id, kind, short_code, url, input_url, caption, alt, hashtags, mentions, \
              comments_count, likes_count, video_view_count, video_play_count, video_duration, \
              first_comment, dimensions_height, dimensions_width, display_url, display_blob, \
              video_url, video_blob, image_blobs, child_video_urls, child_video_blobs, \
              child_order, owner_id, owner_username, owner_full_name, posted_at, is_pinned, \
              is_sponsored, product_type, competitor_id, search_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, \
                 $10, $11, $12, $13, $14, \
                 $15, $16, $17, $18, $19, \
                 $20, $21, $22, $23, $24, \
                 $25, $26, $27, $28, $29, $30, \
                 $31, $32, $33, $34) \
         ON CONFLICT (external_id) DO UPDATE SET \
             kind              = EXCLUDED.kind, \
             short_code        = EXCLUDED.short_code, \
             url               = EXCLUDED.url, \
             input_url         = EXCLUDED.input_url, \
             caption           = EXCLUDED.caption, \
             alt               = EXCLUDED.alt, \
             hashtags          = EXCLUDED.hashtags, \
             mentions          = EXCLUDED.mentions, \
             comments_count    = EXCLUDED.comments_count, \
             likes_count       = EXCLUDED.likes_count, \
             video_view_count  = EXCLUDED.video_view_count, \
             video_play_count  = EXCLUDED.video_play_count, \
             video_duration    = EXCLUDED.video_duration, \
             first_comment     = EXCLUDED.first_comment, \
             dimensions_height = EXCLUDED.dimensions_height, \
             dimensions_width  = EXCLUDED.dimensions_width, \
             display_url       = EXCLUDED.display_url, \
             display_blob      = EXCLUDED.display_blob, \
             video_url         = EXCLUDED.video_url, \
             video_blob        = EXCLUDED.video_blob, \
             image_blobs       = EXCLUDED.image_blobs, \
             child_video_urls  = EXCLUDED.child_video_urls, \
             child_video_blobs = EXCLUDED.child_video_blobs, \
             child_order       = EXCLUDED.child_order, \
             owner_id          = EXCLUDED.owner_id, \
             owner_username    = EXCLUDED.owner_username, \
             owner_full_name   = EXCLUDED.owner_full_name, \
             posted_at         = EXCLUDED.posted_at, \
             is_pinned         = EXCLUDED.is_pinned, \
             is_sponsored      = EXCLUDED.is_sponsored, \
             product_type      = EXCLUDED.product_type, \
             competitor_id     = EXCLUDED.competitor_id, \
             search_id         = EXCLUDED.search_id, \
             updated_at        = NOW() \
         RETURNING id",
    )
    .bind(&post.external_id)
    .bind(post.kind.as_code())
    .bind(&post.short_code)
    .bind(&post.url)
    .bind(&post.input_url)
    .bind(&post.caption)
    .bind(&post.alt)
    .bind(hashtags)
    .bind(mentions)
    .bind(post.comments_count)
    .bind(post.likes_count)
    .bind(post.video_view_count)
    .bind(post.video_play_count)
    .bind(post.video_duration)
    .bind(&post.first_comment)
    .bind(post.dimensions_height)
    .bind(post.dimensions_width)
    .bind(&post.display_url)
    .bind(post.display_media.as_base64())
    .bind(&post.video_url)
    .bind(post.video_media.as_base64())
    .bind(image_blobs)
    .bind(child_video_urls)
    .bind(child_video_blobs)
    .bind(child_order)
    .bind(&post.owner_id)
    .bind(&post.owner_username)
    .bind(&post.owner_full_name)
    .bind(post.timestamp)
    .bind(post.is_pinned)
    .bind(post.is_sponsored)
    .bind(&post.product_type)
    .bind(origin.competitor_id())
    .bind(origin.search_id())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Stores translated post text alongside the originals.
///
/// `None` preserves the existing column value rather than clearing it, so a
/// degraded translation pass never erases a previous good one.
///
/// # Errors
///
/// Returns [`DbError::Json`] if the hashtag list cannot be serialized, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_post_translations(
    pool: &PgPool,
    post_id: i64,
    translations: &PostTranslations,
) -> Result<(), DbError> {
    let hashtags = translations
        .hashtags
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;

    sqlx::query(
        "UPDATE posts \
         SET caption_translated         = COALESCE($2, caption_translated), \
             alt_translated             = COALESCE($3, alt_translated), \
             owner_full_name_translated = COALESCE($4, owner_full_name_translated), \
             hashtags_translated        = COALESCE($5, hashtags_translated), \
             first_comment_translated   = COALESCE($6, first_comment_translated), \
             updated_at                 = NOW() \
         WHERE id = $1",
    )
    .bind(post_id)
    .bind(translations.caption.as_deref())
    .bind(translations.alt.as_deref())
    .bind(translations.owner_full_name.as_deref())
    .bind(hashtags)
    .bind(translations.first_comment.as_deref())
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns `true` if a post with this `external_id` has already been stored.
///
/// This is the incremental fetcher's dedup probe; it runs once per fetched
/// record, so it stays a bare `EXISTS` rather than pulling the row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn post_exists(pool: &PgPool, external_id: &str) -> Result<bool, DbError> {
    let exists: bool =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM posts WHERE external_id = $1)")
            .bind(external_id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Returns a post by its upstream id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_post_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<PostRow>, DbError> {
    let row = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE external_id = $1"
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all posts for a competitor, newest first.
///
/// Posts without a timestamp sort last; ties break on `id` so pagination
/// stays stable.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_posts_for_competitor(
    pool: &PgPool,
    competitor_id: i64,
) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM posts \
         WHERE competitor_id = $1 \
         ORDER BY posted_at DESC NULLS LAST, id DESC"
    ))
    .bind(competitor_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns all posts collected under a search term, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_posts_for_search(pool: &PgPool, search_id: i64) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM posts \
         WHERE search_id = $1 \
         ORDER BY posted_at DESC NULLS LAST, id DESC"
    ))
    .bind(search_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
