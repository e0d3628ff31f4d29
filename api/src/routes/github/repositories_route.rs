use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use git_context_engine::scanner::RepositoryScanner;
use tracing::{info, instrument};

use crate::{
    core::{
        app_state::AppState,
        http::{bearer::BearerCredential, response_envelope::ApiResponse},
    },
    error_handler::AppResult,
};

/// GET /github/repositories
///
/// Every repository the caller's GitHub account can access.
#[instrument(name = "repositories_route", skip_all)]
pub async fn repositories_route(
    State(state): State<Arc<AppState>>,
    BearerCredential(credential): BearerCredential,
) -> AppResult<Response> {
    let repositories = RepositoryScanner::new(&state.github)
        .list_repositories(&credential)
        .await?;

    info!(count = repositories.len(), "repositories listed");
    Ok(ApiResponse::success(repositories).into_response_with_status(StatusCode::OK))
}
