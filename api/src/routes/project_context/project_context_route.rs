use std::sync::Arc;

use axum::{
    extract::{Json, Query, State, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
    response::Response,
};
use git_context_engine::context::{ProjectContextRecord, ProjectContextStore};
use tracing::{info, instrument};

use crate::{
    core::{
        app_state::AppState,
        http::{bearer::BearerCredential, response_envelope::ApiResponse},
    },
    error_handler::{AppError, AppResult},
    routes::project_context::{
        project_context_request::{ProjectContextQuery, ProjectContextRequest},
        project_context_response::ProjectContextResponse,
    },
};

fn with_freshness(state: &AppState, record: ProjectContextRecord) -> ProjectContextResponse {
    ProjectContextResponse {
        is_fresh: state.assembler().is_fresh(&record),
        record,
    }
}

fn required(value: Option<String>) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest("githubUrl is required".into()))
}

/// GET /project-context?githubUrl=owner/name
///
/// Cached document only; never triggers a build.
#[instrument(name = "get_project_context_route", skip_all)]
pub async fn get_project_context_route(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProjectContextQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(q) = query?;
    let repository = required(q.github_url)?;

    let record = state.assembler().get_cached(&repository).await?;
    Ok(ApiResponse::success(with_freshness(&state, record)).into_response_with_status(StatusCode::OK))
}

/// POST /project-context
///
/// Returns the cached document while fresh, otherwise builds and stores a new one.
#[instrument(name = "build_project_context_route", skip_all)]
pub async fn build_project_context_route(
    State(state): State<Arc<AppState>>,
    BearerCredential(credential): BearerCredential,
    payload: Result<Json<ProjectContextRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;
    let repository = required(Some(body.github_url))?;

    let record = state
        .assembler()
        .get_or_build(&credential, &repository, body.force_refresh)
        .await?;

    info!(
        %repository,
        force_refresh = body.force_refresh,
        updated_at = %record.updated_at,
        "project context served"
    );
    Ok(ApiResponse::success(with_freshness(&state, record)).into_response_with_status(StatusCode::OK))
}

/// GET /project-context/list
///
/// Every cached document, most recently updated first.
#[instrument(name = "list_project_contexts_route", skip_all)]
pub async fn list_project_contexts_route(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let records = state.contexts.list().await?;
    let items: Vec<ProjectContextResponse> = records
        .into_iter()
        .map(|r| with_freshness(&state, r))
        .collect();
    Ok(ApiResponse::success(items).into_response_with_status(StatusCode::OK))
}
