use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::RequestId;
use crate::state::AppState;

use super::competitors::PostItem;
use super::{map_db_error, ApiError, ApiResponse, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SearchTermItem {
    id: i64,
    keyword: String,
    keyword_translated: Option<String>,
    search_count: i64,
    total_posts: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<postintel_db::SearchTermRow> for SearchTermItem {
    fn from(row: postintel_db::SearchTermRow) -> Self {
        Self {
            id: row.id,
            keyword: row.keyword,
            keyword_translated: row.keyword_translated,
            search_count: row.search_count,
            total_posts: row.total_posts,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(super) async fn list_search_terms(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<SearchTermItem>>>, ApiError> {
    let rows = postintel_db::list_search_terms(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(SearchTermItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_search_posts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<PostItem>>>, ApiError> {
    let term = postintel_db::get_search_term(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    if term.is_none() {
        return Err(ApiError::new(req_id.0, "not_found", "unknown search term"));
    }

    let rows = postintel_db::list_posts_for_search(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(PostItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
