//! Runtime API-key configuration. GET reports which keys are set; key
//! material never leaves the server. PUT persists a value and swaps the
//! snapshot so later jobs pick it up.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use postintel_core::KNOWN_KEYS;

use crate::middleware::RequestId;
use crate::state::AppState;

use super::{map_db_error, ApiError, ApiResponse, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct KeyStatus {
    source_api_token: bool,
    analysis_api_key: bool,
    translation_api_key: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct KeyUpdateRequest {
    key_name: String,
    key_value: String,
}

fn current_status(state: &AppState) -> KeyStatus {
    let keys = state.keys.current();
    KeyStatus {
        source_api_token: !keys.source_api_token.is_empty(),
        analysis_api_key: !keys.analysis_api_key.is_empty(),
        translation_api_key: !keys.translation_api_key.is_empty(),
    }
}

pub(super) async fn get_key_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<KeyStatus>> {
    Json(ApiResponse {
        data: current_status(&state),
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn put_key(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<KeyUpdateRequest>,
) -> Result<Json<ApiResponse<KeyStatus>>, ApiError> {
    if !KNOWN_KEYS.contains(&body.key_name.as_str()) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("unknown key name; expected one of {KNOWN_KEYS:?}"),
        ));
    }

    postintel_db::update_key(&state.pool, &state.keys, &body.key_name, &body.key_value)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(key_name = %body.key_name, "api key updated");
    Ok(Json(ApiResponse {
        data: current_status(&state),
        meta: ResponseMeta::new(req_id.0),
    }))
}
