//! Database operations for the `search_terms` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `search_terms` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchTermRow {
    pub id: i64,
    pub keyword: String,
    pub keyword_translated: Option<String>,
    /// How many times this keyword has been searched, including the insert.
    pub search_count: i64,
    /// Recomputed after each run by [`recount_search_posts`].
    pub total_posts: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SEARCH_COLUMNS: &str =
    "id, keyword, keyword_translated, search_count, total_posts, created_at, updated_at";

/// Registers a keyword, or bumps its search counter if already known.
///
/// Returns the full row, so the caller sees the post-bump counter.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn bump_search_term(pool: &PgPool, keyword: &str) -> Result<SearchTermRow, DbError> {
    let row = sqlx::query_as::<_, SearchTermRow>(&format!(
        "INSERT INTO search_terms (keyword) \
         VALUES ($1) \
         ON CONFLICT (keyword) DO UPDATE SET \
             search_count = search_terms.search_count + 1, \
             updated_at   = NOW() \
         RETURNING {SEARCH_COLUMNS}"
    ))
    .bind(keyword)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns a search term by internal id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_search_term(pool: &PgPool, id: i64) -> Result<Option<SearchTermRow>, DbError> {
    let row = sqlx::query_as::<_, SearchTermRow>(&format!(
        "SELECT {SEARCH_COLUMNS} FROM search_terms WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns a search term by keyword, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_search_term_by_keyword(
    pool: &PgPool,
    keyword: &str,
) -> Result<Option<SearchTermRow>, DbError> {
    let row = sqlx::query_as::<_, SearchTermRow>(&format!(
        "SELECT {SEARCH_COLUMNS} FROM search_terms WHERE keyword = $1"
    ))
    .bind(keyword)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all search terms, most recently searched first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_search_terms(pool: &PgPool) -> Result<Vec<SearchTermRow>, DbError> {
    let rows = sqlx::query_as::<_, SearchTermRow>(&format!(
        "SELECT {SEARCH_COLUMNS} FROM search_terms ORDER BY updated_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Recomputes `total_posts` from the posts table and returns the new count.
///
/// Derived rather than incremented: the upsert path makes per-run insert
/// counts unreliable, while a `COUNT` is always right.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the search term does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn recount_search_posts(pool: &PgPool, search_id: i64) -> Result<i64, DbError> {
    let total: Option<i64> = sqlx::query_scalar::<_, i64>(
        "UPDATE search_terms \
         SET total_posts = (SELECT COUNT(*) FROM posts WHERE search_id = $1), \
             updated_at  = NOW() \
         WHERE id = $1 \
         RETURNING total_posts",
    )
    .bind(search_id)
    .fetch_optional(pool)
    .await?;

    total.ok_or(DbError::NotFound)
}

/// Stores the translated keyword alongside the original.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn set_search_keyword_translation(
    pool: &PgPool,
    search_id: i64,
    keyword_translated: &str,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE search_terms \
         SET keyword_translated = $2, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(search_id)
    .bind(keyword_translated)
    .execute(pool)
    .await?;
    Ok(())
}
