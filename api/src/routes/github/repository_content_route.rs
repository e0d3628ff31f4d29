use std::sync::Arc;

use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use git_context_engine::tree::ContentTreeFetcher;
use tracing::instrument;

use crate::{
    core::{
        app_state::AppState,
        http::{bearer::BearerCredential, response_envelope::ApiResponse},
    },
    error_handler::{AppError, AppResult},
    routes::github::repository_content_request::RepositoryContentRequest,
};

/// POST /github/repository-content
///
/// Directory listing (optionally expanded recursively) or a single decoded file.
#[instrument(name = "repository_content_route", skip_all)]
pub async fn repository_content_route(
    State(state): State<Arc<AppState>>,
    BearerCredential(credential): BearerCredential,
    payload: Result<Json<RepositoryContentRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;
    let repository = body.repository.trim();
    if repository.is_empty() {
        return Err(AppError::BadRequest("repository is required".into()));
    }

    let tree = ContentTreeFetcher::new(&state.github, state.config.tree_concurrency)
        .fetch_tree(&credential, repository, body.path.trim(), body.recursive)
        .await?;

    Ok(ApiResponse::success(tree).into_response_with_status(StatusCode::OK))
}
