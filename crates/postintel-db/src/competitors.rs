//! Database operations for the `competitors` table.

use chrono::{DateTime, Utc};
use postintel_core::MediaBlob;
use sqlx::PgPool;

use crate::{is_unique_violation, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `competitors` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompetitorRow {
    pub id: i64,
    /// Upstream account id; populated on the first profile refresh.
    pub external_id: Option<String>,
    pub username: String,
    pub url: Option<String>,
    pub input_url: Option<String>,
    pub full_name: Option<String>,
    pub full_name_translated: Option<String>,
    pub biography: Option<String>,
    pub biography_translated: Option<String>,
    pub profile_pic_url: Option<String>,
    /// Base64 avatar payload, or `NULL` when the fetch failed.
    pub profile_pic_blob: Option<String>,
    pub external_urls: serde_json::Value,
    pub followers_count: i64,
    pub follows_count: i64,
    pub posts_count: i64,
    pub highlight_reel_count: i64,
    pub has_channel: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload for a new competitor. Profile detail comes later,
/// from the first refresh.
#[derive(Debug, Clone)]
pub struct NewCompetitor {
    pub username: String,
    pub input_url: Option<String>,
}

/// Profile fields written back on every refresh. Overwrites in place;
/// translated columns are left untouched.
#[derive(Debug, Clone)]
pub struct CompetitorProfileUpdate {
    pub external_id: Option<String>,
    pub url: Option<String>,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub profile_pic_url: Option<String>,
    pub profile_pic_blob: MediaBlob,
    /// Raw external-link entries as scraped; stored verbatim as `JSONB`.
    pub external_urls: Vec<serde_json::Value>,
    pub followers_count: i64,
    pub follows_count: i64,
    pub posts_count: i64,
    pub highlight_reel_count: i64,
    pub has_channel: bool,
}

const COMPETITOR_COLUMNS: &str = "id, external_id, username, url, input_url, full_name, \
     full_name_translated, biography, biography_translated, profile_pic_url, profile_pic_blob, \
     external_urls, followers_count, follows_count, posts_count, highlight_reel_count, \
     has_channel, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Registers a new competitor and returns the full inserted row.
///
/// # Errors
///
/// Returns [`DbError::Conflict`] if the username is already registered, or
/// [`DbError::Sqlx`] for any other failure.
pub async fn insert_competitor(
    pool: &PgPool,
    competitor: &NewCompetitor,
) -> Result<CompetitorRow, DbError> {
    let row = sqlx::query_as::<_, CompetitorRow>(&format!(
        "INSERT INTO competitors (username, input_url) \
         VALUES ($1, $2) \
         RETURNING {COMPETITOR_COLUMNS}"
    ))
    .bind(&competitor.username)
    .bind(&competitor.input_url)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            DbError::Conflict {
                entity: "competitor",
                key: competitor.username.clone(),
            }
        } else {
            DbError::Sqlx(err)
        }
    })?;

    Ok(row)
}

/// Returns a competitor by internal id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_competitor(pool: &PgPool, id: i64) -> Result<Option<CompetitorRow>, DbError> {
    let row = sqlx::query_as::<_, CompetitorRow>(&format!(
        "SELECT {COMPETITOR_COLUMNS} FROM competitors WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns a competitor by username, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_competitor_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<CompetitorRow>, DbError> {
    let row = sqlx::query_as::<_, CompetitorRow>(&format!(
        "SELECT {COMPETITOR_COLUMNS} FROM competitors WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all competitors, ordered by username.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_competitors(pool: &PgPool) -> Result<Vec<CompetitorRow>, DbError> {
    let rows = sqlx::query_as::<_, CompetitorRow>(&format!(
        "SELECT {COMPETITOR_COLUMNS} FROM competitors ORDER BY username"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Overwrites a competitor's profile fields from a fresh profile scrape.
///
/// # Errors
///
/// Returns [`DbError::Json`] if `external_urls` cannot be serialized, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_competitor_profile(
    pool: &PgPool,
    competitor_id: i64,
    profile: &CompetitorProfileUpdate,
) -> Result<(), DbError> {
    let external_urls = serde_json::to_value(&profile.external_urls)?;

    sqlx::query(
        "UPDATE competitors \
         SET external_id          = $2, \
             url                  = $3, \
             full_name            = $4, \
             biography            = $5, \
             profile_pic_url      = $6, \
             profile_pic_blob     = COALESCE($7, profile_pic_blob), \
             external_urls        = $8, \
             followers_count      = $9, \
             follows_count        = $10, \
             posts_count          = $11, \
             highlight_reel_count = $12, \
             has_channel          = $13, \
             updated_at           = NOW() \
         WHERE id = $1",
    )
    .bind(competitor_id)
    .bind(&profile.external_id)
    .bind(&profile.url)
    .bind(&profile.full_name)
    .bind(&profile.biography)
    .bind(&profile.profile_pic_url)
    .bind(profile.profile_pic_blob.as_base64())
    .bind(external_urls)
    .bind(profile.followers_count)
    .bind(profile.follows_count)
    .bind(profile.posts_count)
    .bind(profile.highlight_reel_count)
    .bind(profile.has_channel)
    .execute(pool)
    .await?;
    Ok(())
}

/// Stores translated profile text alongside the originals.
///
/// `None` preserves the existing translation rather than clearing it, so a
/// degraded translation pass never erases a previous good one.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn set_competitor_translations(
    pool: &PgPool,
    competitor_id: i64,
    full_name_translated: Option<&str>,
    biography_translated: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE competitors \
         SET full_name_translated = COALESCE($2, full_name_translated), \
             biography_translated = COALESCE($3, biography_translated), \
             updated_at           = NOW() \
         WHERE id = $1",
    )
    .bind(competitor_id)
    .bind(full_name_translated)
    .bind(biography_translated)
    .execute(pool)
    .await?;
    Ok(())
}
