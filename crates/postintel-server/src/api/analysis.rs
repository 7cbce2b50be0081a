//! Analysis trigger. Runs synchronously: the caller gets the extraction id
//! (or the error) in the response rather than polling for a result.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use postintel_analysis::{AnalysisError, TemplateKind};

use crate::middleware::RequestId;
use crate::state::AppState;

use super::{map_db_error, ApiError, ApiResponse, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AnalysisRequest {
    external_id: String,
    user_id: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalysisResult {
    extraction_id: i64,
    external_id: String,
    kind: String,
    template: &'static str,
}

pub(super) async fn run_analysis(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalysisRequest>,
) -> Result<Json<ApiResponse<AnalysisResult>>, ApiError> {
    let external_id = body.external_id.trim();
    if external_id.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "external_id must not be empty",
        ));
    }

    let analyzer = state.build_analyzer();
    let outcome = analyzer
        .analyze_post(body.user_id, external_id)
        .await
        .map_err(|err| map_analysis_error(req_id.0.clone(), &err))?;

    Ok(Json(ApiResponse {
        data: AnalysisResult {
            extraction_id: outcome.extraction_id,
            external_id: outcome.external_id,
            kind: outcome.kind.as_code().to_owned(),
            template: match outcome.template {
                TemplateKind::StrategyScript => "strategy_script",
                TemplateKind::AnalysisOnly => "analysis_only",
            },
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_analysis_error(request_id: String, error: &AnalysisError) -> ApiError {
    match error {
        AnalysisError::UnknownPost { external_id } => ApiError::new(
            request_id,
            "not_found",
            format!("no stored post with external id {external_id}"),
        ),
        AnalysisError::MissingMedia { external_id } => ApiError::new(
            request_id,
            "not_found",
            format!("post {external_id} has no stored media"),
        ),
        AnalysisError::UnsupportedKind { kind } => ApiError::new(
            request_id,
            "bad_request",
            format!("post kind {kind} is not supported for analysis"),
        ),
        AnalysisError::Db(db) => map_db_error(request_id, db),
        AnalysisError::Http(_) | AnalysisError::Api { .. } | AnalysisError::MalformedResponse { .. } => {
            tracing::error!(error = %error, "analysis completion failed");
            ApiError::new(request_id, "upstream_error", "analysis completion failed")
        }
    }
}
