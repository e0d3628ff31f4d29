//! Upstream source-control contract.
//!
//! `SourceControlApi` is the seam every engine component talks through. The
//! methods are plain `async` (return-position `impl Future + Send`), so no
//! `async-trait` and no heap trait objects are needed; components are generic
//! over the implementation. [`github::GitHubClient`] is the production
//! implementation; tests plug in in-memory doubles.

pub mod types;
pub use types::*;

pub mod github;

use std::future::Future;
use std::sync::Arc;

use crate::errors::{GitContextEngineError, GitContextEngineResult};

/// Page size requested from paginated listing endpoints.
pub const PAGE_SIZE: u32 = 100;

/// Thin transport contract over a source-control REST API.
///
/// Every call receives the caller's credential explicitly. Implementations
/// return `AuthError` for a missing/rejected credential and `UpstreamError`
/// (with status) for any other non-2xx response; they never retry.
pub trait SourceControlApi: Send + Sync {
    /// One page (1-based) of repositories accessible to the account.
    fn list_repositories_page(
        &self,
        credential: &Credential,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = GitContextEngineResult<Vec<Repository>>> + Send;

    /// Repository details for `owner/name`.
    fn get_repository(
        &self,
        credential: &Credential,
        full_name: &str,
    ) -> impl Future<Output = GitContextEngineResult<Repository>> + Send;

    /// One page (1-based) of branch names of a repository.
    fn list_branch_names_page(
        &self,
        credential: &Credential,
        full_name: &str,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = GitContextEngineResult<Vec<String>>> + Send;

    /// Single comparison call `base...head`.
    fn compare(
        &self,
        credential: &Credential,
        full_name: &str,
        base: &str,
        head: &str,
    ) -> impl Future<Output = GitContextEngineResult<Comparison>> + Send;

    /// Immediate listing at `path` (empty path is the repository root).
    fn get_contents(
        &self,
        credential: &Credential,
        full_name: &str,
        path: &str,
    ) -> impl Future<Output = GitContextEngineResult<ContentListing>> + Send;
}

impl<T: SourceControlApi> SourceControlApi for Arc<T> {
    fn list_repositories_page(
        &self,
        credential: &Credential,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = GitContextEngineResult<Vec<Repository>>> + Send {
        (**self).list_repositories_page(credential, page, per_page)
    }

    fn get_repository(
        &self,
        credential: &Credential,
        full_name: &str,
    ) -> impl Future<Output = GitContextEngineResult<Repository>> + Send {
        (**self).get_repository(credential, full_name)
    }

    fn list_branch_names_page(
        &self,
        credential: &Credential,
        full_name: &str,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = GitContextEngineResult<Vec<String>>> + Send {
        (**self).list_branch_names_page(credential, full_name, page, per_page)
    }

    fn compare(
        &self,
        credential: &Credential,
        full_name: &str,
        base: &str,
        head: &str,
    ) -> impl Future<Output = GitContextEngineResult<Comparison>> + Send {
        (**self).compare(credential, full_name, base, head)
    }

    fn get_contents(
        &self,
        credential: &Credential,
        full_name: &str,
        path: &str,
    ) -> impl Future<Output = GitContextEngineResult<ContentListing>> + Send {
        (**self).get_contents(credential, full_name, path)
    }
}

/// Splits "owner/repo" into components or returns a validation error.
pub fn split_owner_repo(project: &str) -> GitContextEngineResult<(String, String)> {
    let mut parts = project.split('/');
    let owner = parts.next().unwrap_or("").trim();
    let repo = parts.next().unwrap_or("").trim();

    if owner.is_empty() || repo.is_empty() || parts.next().is_some() {
        return Err(GitContextEngineError::Validation(format!(
            "invalid repository '{}', expected 'owner/repo'",
            project
        )));
    }

    Ok((owner.to_string(), repo.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_owner_repo_accepts_full_names() {
        let (owner, repo) = split_owner_repo("org/app").unwrap();
        assert_eq!(owner, "org");
        assert_eq!(repo, "app");
    }

    #[test]
    fn split_owner_repo_rejects_malformed_names() {
        for bad in ["", "org", "org/", "/app", "org/app/extra"] {
            assert!(matches!(
                split_owner_repo(bad),
                Err(GitContextEngineError::Validation(_))
            ));
        }
    }
}
