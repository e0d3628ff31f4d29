use std::sync::Arc;

use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use git_context_engine::{
    diff::DiffFetcher,
    formatter::{DiffContext, format_diff_context},
    git_providers::DiffSummary,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    core::{
        app_state::AppState,
        http::{bearer::BearerCredential, response_envelope::ApiResponse},
    },
    error_handler::{AppError, AppResult},
    routes::github::custom_diff_request::CustomDiffRequest,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomDiffResponse {
    diff_summary: DiffSummary,
    diff_context: DiffContext,
    used_diff: bool,
}

/// POST /github/custom-diff
///
/// Compares two user-chosen branches (`target...source`).
#[instrument(name = "custom_diff_route", skip_all)]
pub async fn custom_diff_route(
    State(state): State<Arc<AppState>>,
    BearerCredential(credential): BearerCredential,
    payload: Result<Json<CustomDiffRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;
    let missing = body.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::MissingFields(missing));
    }

    let summary = DiffFetcher::new(&state.github)
        .compare_custom(
            &credential,
            body.repository.trim(),
            body.source_branch.trim(),
            body.target_branch.trim(),
        )
        .await?;
    let context = format_diff_context(&summary, state.config.format);

    Ok(ApiResponse::success(CustomDiffResponse {
        used_diff: context.used_diff,
        diff_summary: summary,
        diff_context: context,
    })
    .into_response_with_status(StatusCode::OK))
}
