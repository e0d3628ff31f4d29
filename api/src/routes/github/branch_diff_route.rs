use std::sync::Arc;

use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use git_context_engine::{IssueDiffOutcome, resolve_issue_diff};
use tracing::{info, instrument};

use crate::{
    core::{
        app_state::AppState,
        http::{bearer::BearerCredential, response_envelope::ApiResponse},
    },
    error_handler::{AppError, AppResult},
    routes::github::{
        branch_diff_request::BranchDiffRequest, branch_diff_response::BranchDiffResponse,
    },
};

/// POST /github/branch-diff
///
/// Finds the branch holding the work for an issue and summarizes its diff
/// against the repository's default branch. An unmatched issue answers 404
/// with the candidate branch names and the repositories that were scanned.
#[instrument(name = "branch_diff_route", skip_all)]
pub async fn branch_diff_route(
    State(state): State<Arc<AppState>>,
    BearerCredential(credential): BearerCredential,
    payload: Result<Json<BranchDiffRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;
    if body.issue_identifier.trim().is_empty() {
        return Err(AppError::BadRequest("issueIdentifier is required".into()));
    }
    let issue = body.into_issue();

    let outcome =
        resolve_issue_diff(&state.github, &credential, &issue, state.config.format).await?;

    match outcome {
        IssueDiffOutcome::Resolved(diff) => {
            info!(
                issue = %issue.identifier,
                repository = %diff.matched.repository.full_name,
                branch = %diff.matched.branch.name,
                "branch diff ready"
            );
            let used_diff = diff.context.used_diff;
            Ok(ApiResponse::success(BranchDiffResponse {
                repository: diff.matched.repository,
                branch: diff.matched.branch,
                diff_summary: diff.summary,
                diff_context: diff.context,
                used_diff,
            })
            .into_response_with_status(StatusCode::OK))
        }
        IssueDiffOutcome::NoMatch(no_match) => Ok(ApiResponse::failure(
            "BRANCH_NOT_FOUND",
            format!("No branch found for issue {}", issue.identifier),
            no_match,
        )
        .into_response_with_status(StatusCode::NOT_FOUND)),
    }
}
