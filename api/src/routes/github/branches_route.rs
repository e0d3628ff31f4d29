use std::sync::Arc;

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::Response,
};
use git_context_engine::scanner::RepositoryScanner;
use tracing::{debug, instrument};

use crate::{
    core::{
        app_state::AppState,
        http::{bearer::BearerCredential, response_envelope::ApiResponse},
    },
    error_handler::{AppError, AppResult},
    routes::github::branches_request::BranchesRequest,
};

/// GET /github/branches?repository=owner/name
///
/// Branches with `isDefault` flags, default branch first.
#[instrument(name = "branches_route", skip_all)]
pub async fn branches_route(
    State(state): State<Arc<AppState>>,
    BearerCredential(credential): BearerCredential,
    query: Result<Query<BranchesRequest>, QueryRejection>,
) -> AppResult<Response> {
    let Query(q) = query?;
    let repository = q
        .repository
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::BadRequest("repository is required".into()))?;

    let branches = RepositoryScanner::new(&state.github)
        .list_branches_by_name(&credential, &repository)
        .await?;

    debug!(%repository, count = branches.len(), "branches listed");
    Ok(ApiResponse::success(branches).into_response_with_status(StatusCode::OK))
}
