use std::sync::Arc;

use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use git_context_engine::{context::ProjectContextStore, prompt::build_issue_prompt};
use tracing::{debug, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::issue::issue_prompt_request::IssuePromptRequest,
};

/// POST /issue/prompt
///
/// Builds the issue-drafting prompt pair, enriched with a project-context
/// document when one is given or cached.
#[instrument(name = "issue_prompt_route", skip_all)]
pub async fn issue_prompt_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IssuePromptRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;
    if body.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("Prompt is required".into()));
    }

    let project_context = match (body.project_context, body.github_url) {
        (Some(context), _) => Some(context),
        (None, Some(url)) => state
            .contexts
            .get(url.trim())
            .await?
            .map(|record| record.project_context),
        (None, None) => None,
    };

    let prompt = build_issue_prompt(&body.prompt, project_context.as_deref());
    debug!(with_context = project_context.is_some(), "issue prompt built");
    Ok(ApiResponse::success(prompt).into_response_with_status(StatusCode::OK))
}
