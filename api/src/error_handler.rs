use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use git_context_engine::errors::{GitContextEngineError, GitContextEngineProviderError};
use thiserror::Error;
use tracing::{error, warn};

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("invalid configuration: {0}")]
    Config(#[source] GitContextEngineError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("{0}")]
    BadRequest(String),

    /// Request fields that were absent or blank, reported one detail each.
    #[error("missing required parameters: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    NotFound(String),

    /// Error mapped from the engine with a specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::MissingFields(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Http { status, .. } => *status,
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) | AppError::MissingFields(_) => "BAD_REQUEST",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Http { code, .. } => code,
        }
    }

    pub fn details(&self) -> Vec<ApiErrorDetail> {
        match self {
            AppError::MissingFields(fields) => fields
                .iter()
                .map(|field| ApiErrorDetail {
                    path: Some((*field).to_string()),
                    hint: Some("required".into()),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        ApiResponse::<()>::error(self.error_code(), self.to_string(), self.details())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<axum::extract::rejection::QueryRejection> for AppError {
    fn from(err: axum::extract::rejection::QueryRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

/// Maps engine failures to HTTP: auth → 401 so the client reconnects the
/// account, upstream failures keep the upstream status.
impl From<GitContextEngineError> for AppError {
    fn from(err: GitContextEngineError) -> Self {
        match err {
            GitContextEngineError::Validation(msg) => AppError::BadRequest(msg),
            GitContextEngineError::NotFound(msg) => AppError::NotFound(msg),
            GitContextEngineError::Provider(GitContextEngineProviderError::Auth) => {
                AppError::Http {
                    status: StatusCode::UNAUTHORIZED,
                    code: "RECONNECT_REQUIRED",
                    message: "GitHub authentication failed, reconnect your GitHub account."
                        .into(),
                }
            }
            GitContextEngineError::Provider(GitContextEngineProviderError::Upstream {
                status,
                message,
            }) => {
                warn!(status, %message, "upstream request failed");
                AppError::Http {
                    status: StatusCode::from_u16(status)
                        .ok()
                        .filter(|s| s.is_client_error() || s.is_server_error())
                        .unwrap_or(StatusCode::BAD_GATEWAY),
                    code: "UPSTREAM_ERROR",
                    message: format!("GitHub request failed: {message}"),
                }
            }
            other => AppError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "INTERNAL_ERROR",
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(e: GitContextEngineProviderError) -> AppError {
        GitContextEngineError::from(e).into()
    }

    #[test]
    fn auth_requires_reconnect() {
        let err = provider(GitContextEngineProviderError::Auth);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.error_code(), "RECONNECT_REQUIRED");
    }

    #[test]
    fn upstream_keeps_status() {
        let err = provider(GitContextEngineProviderError::from_status(422, "No common ancestor"));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
        assert!(err.to_string().contains("No common ancestor"));
    }

    #[test]
    fn odd_upstream_status_becomes_bad_gateway() {
        let err = provider(GitContextEngineProviderError::Upstream {
            status: 302,
            message: "Found".into(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_and_absence_map_to_4xx() {
        let bad: AppError = GitContextEngineError::Validation("x".into()).into();
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);
        let missing: AppError = GitContextEngineError::NotFound("x".into()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_fields_carry_one_detail_each() {
        let err = AppError::MissingFields(vec!["sourceBranch", "targetBranch"]);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "missing required parameters: sourceBranch, targetBranch"
        );
        let paths: Vec<_> = err.details().into_iter().filter_map(|d| d.path).collect();
        assert_eq!(paths, ["sourceBranch", "targetBranch"]);
        assert!(AppError::BadRequest("x".into()).details().is_empty());
    }

    #[test]
    fn transport_failures_are_internal() {
        let err = provider(GitContextEngineProviderError::Timeout);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
