use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use git_context_engine::git_providers::Credential;

use crate::error_handler::AppError;

/// Caller's GitHub credential taken from `Authorization: Bearer <token>`.
#[derive(Debug)]
pub struct BearerCredential(pub Credential);

impl<S> FromRequestParts<S> for BearerCredential
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized("missing Authorization header"))?;

        let token = parse_bearer(header).ok_or(AppError::Unauthorized(
            "Authorization header must be `Bearer <token>`",
        ))?;

        Ok(Self(Credential::bearer(token)))
    }
}

fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
