use std::{env, sync::Arc};

mod core;
mod error_handler;
mod routes;

pub use crate::core::app_state::{AppState, ContextStore};
pub use crate::error_handler::{AppError, AppResult};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

use crate::routes::{
    github::{
        branch_diff_route::branch_diff_route, branches_route::branches_route,
        custom_diff_route::custom_diff_route, repositories_route::repositories_route,
        repository_content_route::repository_content_route,
    },
    issue::issue_prompt_route::issue_prompt_route,
    pr_description::pr_prompt_route::pr_prompt_route,
    project_context::project_context_route::{
        build_project_context_route, get_project_context_route, list_project_contexts_route,
    },
};

pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8080";

/// All HTTP routes over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/github/repositories", get(repositories_route))
        .route("/github/branches", get(branches_route))
        .route("/github/branch-diff", post(branch_diff_route))
        .route("/github/custom-diff", post(custom_diff_route))
        .route("/github/repository-content", post(repository_content_route))
        .route(
            "/project-context",
            get(get_project_context_route).post(build_project_context_route),
        )
        .route("/project-context/list", get(list_project_contexts_route))
        .route("/pr-description/prompt", post(pr_prompt_route))
        .route("/issue/prompt", post(issue_prompt_route))
        .with_state(state)
}

pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.to_string());
    let state = Arc::new(AppState::from_env().map_err(AppError::Config)?);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, github = %state.config.github_api_base, "api listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
