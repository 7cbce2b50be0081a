//! Database operations for the `api_keys` table.
//!
//! Rows here override environment-provided credentials when the key store
//! rebuilds its snapshot.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use postintel_core::{ApiKeys, KeyStore};

use crate::DbError;

/// A row from the `api_keys` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKeyRow {
    pub key_name: String,
    pub key_value: String,
    pub updated_at: DateTime<Utc>,
}

/// Returns every stored key, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_api_keys(pool: &PgPool) -> Result<Vec<ApiKeyRow>, DbError> {
    let rows = sqlx::query_as::<_, ApiKeyRow>(
        "SELECT key_name, key_value, updated_at \
         FROM api_keys \
         ORDER BY key_name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts or replaces a key value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_api_key(pool: &PgPool, key_name: &str, key_value: &str) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO api_keys (key_name, key_value) \
         VALUES ($1, $2) \
         ON CONFLICT (key_name) DO UPDATE SET \
             key_value  = EXCLUDED.key_value, \
             updated_at = NOW()",
    )
    .bind(key_name)
    .bind(key_value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Rebuilds the key snapshot from the environment plus stored rows and
/// installs it in the store.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the rows cannot be read.
pub async fn reload_keys(pool: &PgPool, store: &KeyStore) -> Result<(), DbError> {
    let rows = list_api_keys(pool).await?;
    let snapshot =
        ApiKeys::from_env_with_overrides(rows.into_iter().map(|row| (row.key_name, row.key_value)));
    store.swap(snapshot);
    Ok(())
}

/// Persists one key value, then rebuilds and installs the snapshot.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert or the reload fails.
pub async fn update_key(
    pool: &PgPool,
    store: &KeyStore,
    key_name: &str,
    key_value: &str,
) -> Result<(), DbError> {
    upsert_api_key(pool, key_name, key_value).await?;
    reload_keys(pool, store).await
}
