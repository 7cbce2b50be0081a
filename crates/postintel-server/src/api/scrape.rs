//! Scrape triggers. Both endpoints validate, spawn the job, and return an
//! accepted body immediately; job progress goes to the logs.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;
use crate::state::AppState;

use super::{ApiError, ApiResponse, ResponseMeta};

const DEFAULT_COUNT: u32 = 10;
const MAX_COUNT: u32 = 100;

#[derive(Debug, Deserialize)]
pub(super) struct CompetitorScrapeRequest {
    username: String,
    count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct KeywordSearchRequest {
    keyword: String,
    count: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(super) struct AcceptedJob {
    job: &'static str,
    target: String,
    count: u32,
}

pub(super) async fn trigger_competitor_scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CompetitorScrapeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AcceptedJob>>), ApiError> {
    let username = body.username.trim().to_owned();
    if username.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "username must not be empty",
        ));
    }
    let count = body.count.unwrap_or(DEFAULT_COUNT).clamp(1, MAX_COUNT);

    let pipeline = state.build_pipeline().map_err(|err| {
        tracing::error!(error = %err, "failed to build scrape pipeline");
        ApiError::new(req_id.0.clone(), "internal_error", "failed to start job")
    })?;

    let target = username.clone();
    tokio::spawn(async move {
        if let Err(err) = pipeline.scrape_competitor(&target, count).await {
            tracing::error!(username = %target, error = %err, "competitor scrape job failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: AcceptedJob {
                job: "competitor_scrape",
                target: username,
                count,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn trigger_keyword_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<KeywordSearchRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AcceptedJob>>), ApiError> {
    let keyword = body.keyword.trim().to_owned();
    if keyword.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "keyword must not be empty",
        ));
    }
    let count = body.count.unwrap_or(DEFAULT_COUNT).clamp(1, MAX_COUNT);

    let pipeline = state.build_pipeline().map_err(|err| {
        tracing::error!(error = %err, "failed to build scrape pipeline");
        ApiError::new(req_id.0.clone(), "internal_error", "failed to start job")
    })?;

    let target = keyword.clone();
    tokio::spawn(async move {
        if let Err(err) = pipeline.run_keyword_search(&target, count).await {
            tracing::error!(keyword = %target, error = %err, "keyword search job failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: AcceptedJob {
                job: "keyword_search",
                target: keyword,
                count,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
