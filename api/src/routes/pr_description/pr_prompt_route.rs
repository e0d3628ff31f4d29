use axum::{
    extract::{Json, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use git_context_engine::prompt::build_pr_description_prompt;
use tracing::{debug, instrument};

use crate::{
    core::http::response_envelope::ApiResponse,
    error_handler::{AppError, AppResult},
    routes::pr_description::pr_prompt_request::PrPromptRequest,
};

/// POST /pr-description/prompt
///
/// Builds the system/user prompt pair for a PR description. Calling a model
/// with it is left to the client.
#[instrument(name = "pr_prompt_route", skip_all)]
pub async fn pr_prompt_route(
    payload: Result<Json<PrPromptRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;
    if body.issue.identifier.trim().is_empty() {
        return Err(AppError::BadRequest("issue.identifier is required".into()));
    }

    let prompt = build_pr_description_prompt(
        &body.issue,
        body.diff_context.as_ref(),
        body.custom_instructions.as_deref(),
    );
    debug!(
        issue = %body.issue.identifier,
        with_diff = body.diff_context.as_ref().is_some_and(|d| d.used_diff),
        "pr prompt built"
    );
    Ok(ApiResponse::success(prompt).into_response_with_status(StatusCode::OK))
}
