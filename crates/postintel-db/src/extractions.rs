//! Database operations for the `extractions` table.
//!
//! One row per `(user_id, external_id)` pair: re-running analysis for the
//! same user and post replaces the previous extraction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `extractions` table.
///
/// Exactly one of `prompt` / `prompt_sequence` is populated, matching the
/// analysis template that produced the row: single-image analysis yields a
/// `prompt`, gallery analysis yields a `prompt_sequence` JSON array.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExtractionRow {
    pub id: i64,
    pub user_id: i64,
    pub external_id: String,
    pub kind: String,
    pub summary: String,
    pub success_factors: String,
    pub strategy_note: String,
    pub copy_text: String,
    pub prompt: Option<String>,
    pub prompt_sequence: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload for one extraction. The caller guarantees the
/// prompt / prompt-sequence exclusivity; the store writes whichever is set
/// and nulls the other.
#[derive(Debug, Clone)]
pub struct NewExtraction {
    pub user_id: i64,
    pub external_id: String,
    pub kind: String,
    pub summary: String,
    pub success_factors: String,
    pub strategy_note: String,
    pub copy_text: String,
    pub prompt: Option<String>,
    pub prompt_sequence: Option<Vec<String>>,
}

const EXTRACTION_COLUMNS: &str = "id, user_id, external_id, kind, summary, success_factors, \
     strategy_note, copy_text, prompt, prompt_sequence, created_at, updated_at";

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Upserts an extraction keyed on `(user_id, external_id)`.
///
/// Conflicts overwrite every extracted field. Both prompt columns are always
/// bound, so the column matching the previous template is cleared when the
/// post's kind has changed since the last analysis.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Json`] if the prompt sequence cannot be serialized, or
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_extraction(pool: &PgPool, record: &NewExtraction) -> Result<i64, DbError> {
    let prompt_sequence = record
        .prompt_sequence
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;

    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO extractions \
             (user_id, external_id, kind, summary, success_factors, strategy_note, \
              copy_text, prompt, prompt_sequence) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (user_id, external_id) DO UPDATE SET \
             kind            = EXCLUDED.kind, \
             summary         = EXCLUDED.summary, \
             success_factors = EXCLUDED.success_factors, \
             strategy_note   = EXCLUDED.strategy_note, \
             copy_text       = EXCLUDED.copy_text, \
             prompt          = EXCLUDED.prompt, \
             prompt_sequence = EXCLUDED.prompt_sequence, \
             updated_at      = NOW() \
         RETURNING id",
    )
    .bind(record.user_id)
    .bind(&record.external_id)
    .bind(&record.kind)
    .bind(&record.summary)
    .bind(&record.success_factors)
    .bind(&record.strategy_note)
    .bind(&record.copy_text)
    .bind(&record.prompt)
    .bind(prompt_sequence)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns one user's extraction for a post, or `None` if not analyzed yet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_extraction(
    pool: &PgPool,
    user_id: i64,
    external_id: &str,
) -> Result<Option<ExtractionRow>, DbError> {
    let row = sqlx::query_as::<_, ExtractionRow>(&format!(
        "SELECT {EXTRACTION_COLUMNS} FROM extractions \
         WHERE user_id = $1 AND external_id = $2"
    ))
    .bind(user_id)
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all of a user's extractions, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_extractions_for_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<ExtractionRow>, DbError> {
    let rows = sqlx::query_as::<_, ExtractionRow>(&format!(
        "SELECT {EXTRACTION_COLUMNS} FROM extractions \
         WHERE user_id = $1 \
         ORDER BY updated_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
