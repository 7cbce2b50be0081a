use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;
use crate::state::AppState;

use super::{map_db_error, ApiError, ApiResponse, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ExtractionQuery {
    user_id: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct ExtractionItem {
    id: i64,
    user_id: i64,
    external_id: String,
    kind: String,
    summary: String,
    success_factors: String,
    strategy_note: String,
    copy_text: String,
    prompt: Option<String>,
    prompt_sequence: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<postintel_db::ExtractionRow> for ExtractionItem {
    fn from(row: postintel_db::ExtractionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            external_id: row.external_id,
            kind: row.kind,
            summary: row.summary,
            success_factors: row.success_factors,
            strategy_note: row.strategy_note,
            copy_text: row.copy_text,
            prompt: row.prompt,
            prompt_sequence: row.prompt_sequence,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(super) async fn list_extractions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ExtractionQuery>,
) -> Result<Json<ApiResponse<Vec<ExtractionItem>>>, ApiError> {
    let rows = postintel_db::list_extractions_for_user(&state.pool, query.user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ExtractionItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
